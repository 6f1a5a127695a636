use crate::commands::Session;
use crate::utils;
use colored::Colorize;
use envctl_cloud::Verifier;
use envctl_core::{CostEstimate, Environment};

pub async fn handle(session: &Session, env_name: Option<&str>) -> anyhow::Result<()> {
    session.log_source();
    let single = env_name.is_some();
    let environments: Vec<&Environment> = match env_name {
        Some(name) => vec![session.environment(name)?],
        None => session.manifest.environments.iter().collect(),
    };
    let controller = session.controller()?;
    controller.authenticate().await?;

    println!();
    let mut running = Vec::new();
    for env in environments {
        let observation = Verifier::observe(controller.provider(), &env.resource_group).await?;
        let state = if observation.exists {
            running.push(&env.cost);
            format!("running ({} resources)", observation.resources).green()
        } else {
            "stopped".dimmed()
        };
        println!(
            "  {} {} {}",
            format!("{:<8}", env.name).bold(),
            format!("{:<28}", env.resource_group).cyan(),
            state
        );
        if observation.exists
            && let Some(expected) = env.expected_resources
            && observation.resources < expected
        {
            println!(
                "    {}",
                format!("expected {} resources, found {}", expected, observation.resources)
                    .yellow()
            );
        }
        if single && observation.exists {
            let resources = controller
                .provider()
                .list_resources(&env.resource_group)
                .await?;
            utils::print_resources(&resources);
        }
    }

    let burn = CostEstimate::combined(running);
    println!();
    println!(
        "Current spend: {} ({})",
        burn.hourly_display().yellow().bold(),
        burn.monthly_display()
    );
    Ok(())
}
