use crate::commands::{self, Session};
use crate::lifecycle::{ShutdownOutcome, TeardownOutcome};
use colored::Colorize;
use envctl_cloud::VerifyOutcome;

pub async fn handle(session: &Session, env_name: &str, force: bool) -> anyhow::Result<()> {
    session.log_source();
    let env = session.environment(env_name)?;
    let controller = session.controller()?;
    let mut gate = commands::gate(force);

    let outcome = match controller.shutdown(env, gate.as_mut()).await? {
        ShutdownOutcome::Aborted(decision) => {
            tracing::debug!(?decision, "Shutdown not confirmed");
            return Ok(());
        }
        ShutdownOutcome::Finished(outcome) => outcome,
    };

    match outcome {
        TeardownOutcome::AlreadyAbsent => {}
        TeardownOutcome::Completed { report, verify } => {
            if !report.group_deleted() {
                anyhow::bail!(
                    "Resource group {} was not deleted: {}",
                    report.resource_group,
                    report.group_error.as_deref().unwrap_or("unknown error")
                );
            }
            println!();
            match verify {
                Some(VerifyOutcome::Confirmed { .. }) => println!(
                    "{}",
                    format!(
                        "✓ Environment '{}' is shut down, saving {}",
                        env.name,
                        env.cost.hourly_display()
                    )
                    .green()
                    .bold()
                ),
                _ => println!(
                    "{}",
                    format!("Environment '{}' deletion was accepted by Azure", env.name).yellow()
                ),
            }
        }
    }

    Ok(())
}
