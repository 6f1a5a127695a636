use crate::commands::Session;
use colored::Colorize;
use envctl_core::markdown_cost_table;

pub fn handle(session: &Session, markdown: bool) -> anyhow::Result<()> {
    let manifest = &session.manifest;
    if markdown {
        print!("{}", markdown_cost_table(&manifest.environments));
        return Ok(());
    }

    println!("{}", "Estimated costs while running:".bold());
    for env in &manifest.environments {
        let over = if env.cost.exceeds_budget() {
            format!("  {}", "over budget".yellow())
        } else {
            String::new()
        };
        println!(
            "  {} {} {}  budget {}{}",
            format!("{:<8}", env.name).bold(),
            format!("{:>14}", env.cost.hourly_display()).yellow(),
            format!("{:>18}", env.cost.monthly_display()),
            env.cost.budget_display(),
            over
        );
    }

    let total = manifest.total_cost();
    println!();
    println!(
        "  {} {} {}",
        format!("{:<8}", "all").bold(),
        format!("{:>14}", total.hourly_display()).yellow().bold(),
        format!("{:>18}", total.monthly_display())
    );
    Ok(())
}
