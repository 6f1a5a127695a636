use crate::commands::Session;
use crate::lifecycle::teardown_graph;
use crate::utils;
use colored::Colorize;
use envctl_cloud_azure::AzureProvider;

/// Show teardown order
///
/// Offline by default: prints the order resource types would be deleted in.
/// `--live` enumerates the environment's group and prints the real plan.
pub async fn handle(session: &Session, env_name: &str, live: bool) -> anyhow::Result<()> {
    session.log_source();
    let env = session.environment(env_name)?;

    if live {
        let controller = session.controller()?;
        controller.authenticate().await?;
        match controller.plan(env).await? {
            Some(plan) => {
                println!();
                utils::print_plan(&plan);
            }
            None => println!(
                "Resource group {} does not exist, nothing to tear down",
                env.resource_group.cyan()
            ),
        }
        return Ok(());
    }

    let provider = AzureProvider::new(session.subscription.clone(), &session.manifest.location);
    let graph = teardown_graph(&provider, &session.manifest)?;
    let order = graph.order()?;

    println!(
        "{}",
        format!(
            "Teardown order for '{}' ({}):",
            env.name, env.resource_group
        )
        .bold()
    );
    for (i, kind) in order.iter().enumerate() {
        let purge = if kind.soft_delete {
            format!(" {}", "+ purge".yellow())
        } else {
            String::new()
        };
        println!("  {:>2}. {} [{}]{}", i + 1, kind.resource_type, kind.tier, purge);
        let blocks: Vec<&str> = graph
            .successors(&kind.resource_type)
            .iter()
            .map(|k| k.resource_type.as_str())
            .collect();
        if !blocks.is_empty() {
            println!("      {} {}", "before".dimmed(), blocks.join(", ").dimmed());
        }
    }
    println!("      any other type, then {}", "the resource group".bold());
    println!();
    println!("Run {} to see what is actually deployed.", format!("envctl plan {} --live", env.name).cyan());
    Ok(())
}
