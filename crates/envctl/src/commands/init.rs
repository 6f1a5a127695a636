use colored::Colorize;
use envctl_config::{CONFIG_FILE_NAME, get_config_dir, write_new_config};
use envctl_core::starter_config;

/// Write a starter `envctl.kdl` to the current directory, or the user
/// config directory with `--global`. Never overwrites.
pub fn handle(project: &str, global: bool) -> anyhow::Result<()> {
    let dir = if global {
        get_config_dir()?
    } else {
        std::env::current_dir()?
    };
    let path = dir.join(CONFIG_FILE_NAME);

    write_new_config(&path, &starter_config(project))?;

    println!("{}", "✓ Config file created".green());
    println!("  {}", path.display().to_string().cyan());
    println!();
    println!("Edit the costs and resource groups, then run:");
    println!("  {}", "envctl environments".cyan());
    Ok(())
}
