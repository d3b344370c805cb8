use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use longform::cli::LlmOverrides;
use longform::cli::commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "longform")]
#[command(version, about = "Outline-driven long-form report generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive report writing session
    Chat {
        #[arg(long, help = "LLM provider (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, short, help = "Output directory for exported reports")]
        output: Option<PathBuf>,
    },

    /// Generate and export a report in one run
    Generate {
        #[arg(long, short, help = "Report title")]
        topic: String,
        #[arg(long, short, help = "Total target length in characters")]
        words: u32,
        #[arg(long, short, help = "Report summary (generated when omitted)")]
        summary: Option<String>,
        #[arg(long, short, help = "Output directory for exported reports")]
        output: Option<PathBuf>,
        #[arg(long, help = "LLM provider (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
    },

    /// Request and print an outline only
    Outline {
        #[arg(help = "Report title")]
        topic: String,
        #[arg(help = "Total target length in characters")]
        words: u32,
        #[arg(long, short, help = "Report summary (generated when omitted)")]
        summary: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, help = "LLM provider (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mlongform encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Chat {
            provider,
            model,
            output,
        } => {
            longform::cli::commands::chat::run(LlmOverrides {
                provider,
                model,
                output,
            })?;
        }
        Commands::Generate {
            topic,
            words,
            summary,
            output,
            provider,
            model,
        } => {
            longform::cli::commands::generate::run(GenerateOptions {
                topic,
                words,
                summary,
                overrides: LlmOverrides {
                    provider,
                    model,
                    output,
                },
            })?;
        }
        Commands::Outline {
            topic,
            words,
            summary,
            format,
            provider,
            model,
        } => {
            longform::cli::commands::outline::run(
                &topic,
                words,
                summary,
                &format,
                LlmOverrides {
                    provider,
                    model,
                    output: None,
                },
            )?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                longform::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                longform::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    longform::cli::commands::config::init_global(force)?;
                } else {
                    longform::cli::commands::config::init_project()?;
                }
            }
        },
    }

    Ok(())
}
