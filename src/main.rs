use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use respeak::cli::{Cli, Commands, ModelsAction};
use respeak::config::Config;
use respeak::models::catalog::list_models;
use respeak::models::download::{download_model, format_model_info, list_installed_models};
use respeak::pipeline::run_batch_command;
use respeak::workspace::Workspace;
use std::collections::HashSet;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY and RESPEAK_* overrides from a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        None => {
            let Some(file) = cli.file else {
                eprintln!("No input file given.");
                eprintln!("Run `respeak --help` for usage.");
                std::process::exit(1);
            };
            let config = load_config(cli.config.as_deref(), cli.workspace)?;
            if let Err(e) = run_batch_command(
                config,
                file,
                cli.model,
                cli.voice,
                cli.poll_period,
                cli.quiet,
                cli.verbose,
                cli.no_download,
            )
            .await
            {
                eprintln!("{}", format!("respeak: {e}").red());
                std::process::exit(1);
            }
        }
        Some(Commands::Models { action }) => {
            let config = load_config(cli.config.as_deref(), cli.workspace)?;
            handle_models_command(action, &config).await?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "respeak", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/respeak/config.toml)
/// 3. Built-in defaults
///
/// Environment overrides apply after loading, and `--workspace` wins over
/// both the file and the environment.
fn load_config(
    custom_path: Option<&std::path::Path>,
    workspace_override: Option<PathBuf>,
) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        // Load from custom path
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    // Apply environment variable overrides
    let mut config = config.with_env_overrides();
    if let Some(root) = workspace_override {
        config.workspace.root = Some(root);
    }
    Ok(config)
}

/// Handle models subcommands.
async fn handle_models_command(action: ModelsAction, config: &Config) -> Result<()> {
    let workspace = Workspace::new(
        config
            .workspace
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(".")),
    );
    let models_dir = workspace.models_dir();

    match action {
        ModelsAction::List => {
            println!("Available models:");
            for model in list_models() {
                println!("  {}", format_model_info(&models_dir, model));
            }

            // Files dropped into models/ by hand (deduplicated against the
            // static catalog).
            let catalog_names: HashSet<&str> = list_models().iter().map(|m| m.name).collect();
            let extras: Vec<String> = list_installed_models(&models_dir)
                .into_iter()
                .filter(|name| !catalog_names.contains(name.as_str()))
                .collect();
            if !extras.is_empty() {
                println!();
                println!("Other installed models:");
                for name in extras {
                    println!("  {name}");
                }
            }
        }
        ModelsAction::Install { name } => {
            let path = download_model(&models_dir, &name, true).await?;
            println!("Model '{}' installed successfully", name);
            println!("Location: {}", path.display());
        }
    }
    Ok(())
}
