use crate::commands::{self, Session};
use crate::lifecycle::StartupOutcome;
use colored::Colorize;

pub async fn handle(session: &Session, env_name: &str, force: bool) -> anyhow::Result<()> {
    session.log_source();
    let env = session.environment(env_name)?;
    let controller = session.controller()?;
    let mut gate = commands::gate(force);

    match controller.startup(env, gate.as_mut()).await? {
        StartupOutcome::Aborted(decision) => {
            tracing::debug!(?decision, "Startup not confirmed");
        }
        StartupOutcome::Provisioned(verify) => {
            println!();
            if verify.is_confirmed() {
                println!(
                    "{}",
                    format!("✓ Environment '{}' is running", env.name)
                        .green()
                        .bold()
                );
            } else {
                println!(
                    "{}",
                    format!("Environment '{}' was provisioned but is not yet complete", env.name)
                        .yellow()
                );
            }
            println!(
                "  Now costing {} ({})",
                env.cost.hourly_display().yellow(),
                env.cost.monthly_display()
            );
            println!("  Run {} when you are done.", format!("envctl shutdown {}", env.name).cyan());
        }
    }

    Ok(())
}
