use crate::commands::{self, Session};
use crate::lifecycle::{EmergencyOutcome, TeardownOutcome};
use colored::Colorize;

pub async fn handle(session: &Session, force: bool) -> anyhow::Result<()> {
    session.log_source();
    let manifest = &session.manifest;
    let controller = session.controller()?;
    let mut gate = commands::gate(force);

    let outcome = controller
        .emergency_shutdown(&manifest.environments, &manifest.emergency, gate.as_mut())
        .await?;

    let failures = outcome.failures();
    let results = match outcome {
        EmergencyOutcome::Aborted(decision) => {
            tracing::debug!(?decision, "Emergency shutdown not confirmed");
            return Ok(());
        }
        EmergencyOutcome::Finished(results) => results,
    };

    println!();
    println!("{}", "Emergency shutdown summary:".bold());
    for result in &results {
        let line = match &result.outcome {
            Ok(Ok(TeardownOutcome::AlreadyAbsent)) => "already absent".dimmed(),
            Ok(Ok(outcome)) if outcome.succeeded() => "deleted".green(),
            Ok(Ok(_)) => "resource group NOT deleted".red().bold(),
            Ok(Err(e)) => format!("failed: {}", e).red().bold(),
            Err(e) => format!("aborted: {}", e).red().bold(),
        };
        println!("  {} {}", format!("{:<8}", result.label).cyan(), line);
    }

    if !failures.is_empty() {
        anyhow::bail!("Emergency shutdown incomplete for: {}", failures.join(", "));
    }
    Ok(())
}
