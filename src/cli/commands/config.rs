use anyhow::Result;
use clap::Subcommand;

use crate::models::{Config, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Show the effective configuration (secrets masked)")]
    Show,
    #[command(about = "Show configuration file paths")]
    Path,
}

pub async fn handle_config(cmd: ConfigCommand, config: Config, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommand::Show => handle_show(&config, format),
        ConfigCommand::Path => handle_path(),
    }
}

fn handle_show(config: &Config, format: OutputFormat) -> Result<()> {
    let redacted = config.redacted();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
        return Ok(());
    }

    if let Some(path) = Config::config_path().filter(|p| p.exists()) {
        println!("# Config file: {}", path.display());
        println!();
    }
    print!("{}", toml::to_string_pretty(&redacted)?);

    if let Err(e) = config.validate() {
        eprintln!();
        eprintln!("Warning: {e}");
    }
    Ok(())
}

fn handle_path() -> Result<()> {
    match Config::config_path() {
        Some(path) if path.exists() => println!("Config file (active): {}", path.display()),
        Some(path) => println!("Config file (would be): {}", path.display()),
        None => println!("Config file: could not determine config directory"),
    }

    if let Ok(cwd) = std::env::current_dir() {
        let env_path = cwd.join(".env");
        if env_path.exists() {
            println!(".env file (active): {}", env_path.display());
        } else {
            println!(".env file (would be): {}", env_path.display());
        }
    }

    if let Some(dir) = Config::models_dir() {
        println!("Models directory: {}", dir.display());
    }

    Ok(())
}
