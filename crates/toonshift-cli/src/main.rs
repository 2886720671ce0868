//! Toonshift CLI - photo to cartoon style transfer

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tracing::info;

use toonshift_core::config::Config;
use toonshift_core::session::{Session, SessionState, DOWNLOAD_FILE_NAME};
use toonshift_core::stylize::{GenerationClient, StyleStrength};

#[derive(Parser)]
#[command(name = "toonshift")]
#[command(author, version, about = "Photo to cartoon style transfer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stylize a photo
    Stylize {
        /// Input photo path
        input: PathBuf,

        /// Output path (defaults to rick-and-morty-style.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Style strength (balanced or strong)
        #[arg(short, long)]
        strength: Option<String>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Use a timestamped output filename instead of the fixed one
        #[arg(long)]
        timestamp: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("toonshift=info".parse()?)
                .add_directive("toonshift_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stylize {
            input,
            output,
            strength,
            model,
            timestamp,
        } => {
            cmd_stylize(
                &input,
                output,
                strength.as_deref(),
                model,
                timestamp,
                cli.quiet,
            )
            .await
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),
    }
}

async fn cmd_stylize(
    input: &Path,
    output: Option<PathBuf>,
    strength: Option<&str>,
    model: Option<String>,
    timestamp: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let api_key = config
        .api
        .resolved_api_key()?
        .ok_or_else(|| anyhow!("No API key set. Export TOONSHIFT_API_KEY and try again."))?;

    let strength = match strength {
        Some(s) => StyleStrength::parse(s)
            .ok_or_else(|| anyhow!("Invalid strength: {}. Valid options: balanced, strong", s))?,
        None => config.default_strength(),
    };

    let client = GenerationClient::builder()
        .api_key(api_key)
        .model(model.unwrap_or_else(|| config.api.model.clone()))
        .timeout_secs(config.api.timeout_secs)
        .build()?;

    let mut session = Session::new();
    session.set_strength(strength);

    let Some(ticket) = session.select_file(input) else {
        let message = session
            .error_message()
            .unwrap_or("Upload could not start")
            .to_string();
        return Err(anyhow!(message));
    };

    if !quiet {
        println!(
            "Stylizing {} ({} strength, model {})...",
            input.display(),
            strength,
            client.model()
        );
    }

    let original = session
        .original()
        .cloned()
        .ok_or_else(|| anyhow!("No photo stored for the upload"))?;

    match client.stylize(&original, session.strength()).await {
        Ok(image) => session.complete_generation(ticket, image),
        Err(e) => session.fail_generation(ticket, &e),
    }

    match session.state() {
        SessionState::Complete => {
            let path = output.unwrap_or_else(|| {
                if timestamp {
                    timestamped_output_path(Path::new("."))
                } else {
                    PathBuf::from(DOWNLOAD_FILE_NAME)
                }
            });

            let bytes = session
                .download()
                .ok_or_else(|| anyhow!("Generated image could not be materialized"))?;
            std::fs::write(&path, bytes)?;

            info!(path = %path.display(), "stylized image saved");
            if !quiet {
                println!("Saved {}", path.display());
            }
            Ok(())
        }
        _ => {
            let message = session
                .error_message()
                .unwrap_or("Generation failed")
                .to_string();
            Err(anyhow!(message))
        }
    }
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("{} = {}", key, value);
            }
            Ok(())
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
            Ok(())
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults");
            }
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
            Ok(())
        }
    }
}

/// Default output name when the caller wants unique filenames
fn timestamped_output_path(base_dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    base_dir.join(format!("toonshift_{}.png", timestamp))
}
