use colored::Colorize;
use envctl_cloud::{
    CloudResource, Expectation, Observation, TeardownEvent, TeardownPlan, TeardownReport,
    Verifier, VerifyOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner for long provider calls (azd provision)
pub struct Spinner {
    progress_bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Self { progress_bar: pb }
    }

    pub fn finish_success(&self, message: &str) {
        self.progress_bar
            .finish_with_message(format!("{} ✓", message));
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .finish_with_message(format!("Failed: {}", error));
    }
}

/// `[it] ` in the emergency fan-out, nothing otherwise
fn tag(prefix: Option<&str>) -> String {
    match prefix {
        Some(p) => format!("{} ", format!("[{}]", p).cyan()),
        None => String::new(),
    }
}

pub fn print_resources(resources: &[CloudResource]) {
    if resources.is_empty() {
        println!("  (no resources)");
        return;
    }
    let width = resources.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for resource in resources {
        println!(
            "  • {}  {}",
            format!("{:<width$}", resource.name, width = width).cyan(),
            resource.resource_type.dimmed()
        );
    }
}

pub fn print_plan(plan: &TeardownPlan) {
    println!(
        "{}",
        format!(
            "Teardown plan for {} ({} resources):",
            plan.resource_group,
            plan.resource_count()
        )
        .bold()
    );
    if plan.is_empty() {
        println!("  (group is empty, only the resource group will be deleted)");
    }
    for (i, step) in plan.steps.iter().enumerate() {
        let purge = if step.purge {
            format!(" {}", "+ purge".yellow())
        } else {
            String::new()
        };
        println!(
            "  {:>2}. {} [{}] ×{}{}",
            i + 1,
            step.resource_type,
            step.tier,
            step.resources.len(),
            purge
        );
    }
    println!(
        "  {:>2}. {} {}",
        plan.steps.len() + 1,
        "resource group".bold(),
        plan.resource_group.cyan()
    );
}

pub fn print_teardown_event(prefix: Option<&str>, event: &TeardownEvent<'_>) {
    let tag = tag(prefix);
    match event {
        TeardownEvent::StepStarted(step) => {
            println!();
            println!(
                "{}{}",
                tag,
                format!("{} ({})", step.resource_type, step.resources.len()).blue()
            );
        }
        TeardownEvent::Deleted(r) => println!("{}  ✓ Deleted {}", tag, r.name),
        TeardownEvent::DeleteFailed(r, e) => {
            println!("{}  {} {}: {}", tag, "⚠ Delete failed".yellow(), r.name, e)
        }
        TeardownEvent::Purged(r) => println!("{}  ✓ Purged {}", tag, r.name),
        TeardownEvent::PurgeFailed(r, e) => {
            println!("{}  {} {}: {}", tag, "⚠ Purge failed".yellow(), r.name, e)
        }
        TeardownEvent::GroupDeleting(g) => {
            println!();
            println!("{}{}", tag, format!("Deleting resource group {}...", g).blue());
        }
        TeardownEvent::GroupDeleted(g) => println!("{}  ✓ Resource group {} deleted", tag, g),
        TeardownEvent::GroupDeleteFailed(g, e) => println!(
            "{}  {} {}: {}",
            tag,
            "✗ Resource group deletion failed".red().bold(),
            g,
            e
        ),
    }
}

pub fn print_report(prefix: Option<&str>, report: &TeardownReport) {
    let tag = tag(prefix);
    println!();
    println!(
        "{}Deleted {} resources, purged {} in {:.1}s",
        tag,
        report.deleted(),
        report.purged(),
        report.result.duration_ms as f64 / 1000.0
    );
    if !report.result.failed.is_empty() {
        println!(
            "{}{}",
            tag,
            format!("{} actions failed:", report.result.failed.len()).yellow()
        );
        for failure in &report.result.failed {
            println!(
                "{}  ⚠ {} {}: {}",
                tag,
                failure.action_type,
                failure.target,
                failure.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// "up to 290s, checking every 10s"
fn wait_window(verifier: &Verifier) -> String {
    format!(
        "up to {}s, checking every {}s",
        verifier.budget().as_secs(),
        verifier.interval().as_secs()
    )
}

pub fn print_wait_start(prefix: Option<&str>, group: &str, expectation: Expectation, verifier: &Verifier) {
    println!(
        "{}Waiting for {} to be {} ({})",
        tag(prefix),
        group,
        expectation,
        wait_window(verifier)
    );
}

pub fn print_poll(prefix: Option<&str>, attempt: u32, max_attempts: u32, observation: &Observation) {
    println!(
        "{}  … check {}/{}: resource group {}",
        tag(prefix),
        attempt,
        max_attempts,
        observation
    );
}

pub fn print_verify_outcome(
    prefix: Option<&str>,
    group: &str,
    expectation: Expectation,
    outcome: &VerifyOutcome,
) {
    let tag = tag(prefix);
    match outcome {
        VerifyOutcome::Confirmed { attempts, .. } => println!(
            "{}{}",
            tag,
            format!(
                "✓ Verified: {} is {} (after {} checks)",
                group, expectation, attempts
            )
            .green()
        ),
        VerifyOutcome::TimedOut { attempts, last } => {
            let seen = last
                .as_ref()
                .map(|o| o.to_string())
                .unwrap_or_else(|| "could not be checked".to_string());
            println!(
                "{}{}",
                tag,
                format!(
                    "⚠ {} not yet {} after {} checks (last seen: {})",
                    group, expectation, attempts, seen
                )
                .yellow()
            );
            println!(
                "{}  Check the Azure portal to confirm the final state.",
                tag
            );
        }
    }
}
