use crate::commands::Session;
use colored::Colorize;

pub fn handle(session: &Session) -> anyhow::Result<()> {
    let manifest = &session.manifest;
    match &session.config_path {
        Some(path) => println!("Config: {}", path.display().to_string().cyan()),
        None => println!("Config: {}", "built-in defaults".dimmed()),
    }
    println!("Project: {} ({})", manifest.project.bold(), manifest.location);
    println!();

    for env in &manifest.environments {
        let marker = if env.protected {
            format!(" {}", "[protected]".red())
        } else {
            String::new()
        };
        println!("{}{}", env.name.cyan().bold(), marker);
        println!("  resource group: {}", env.resource_group);
        println!("  location:       {}", manifest.location_for(env));
        println!("  cost:           {}", env.cost.hourly_display());
        let countdown = if env.shutdown.countdown_secs > 0 {
            format!(", {}s countdown", env.shutdown.countdown_secs)
        } else {
            String::new()
        };
        println!(
            "  shutdown gate:  {} phrase(s){}",
            env.shutdown.phrases.len(),
            countdown
        );
    }
    Ok(())
}
