use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use draftsmith::ProviderKind;
use draftsmith::cli::commands;
use draftsmith::cli::{ConfigOverrides, OutputFormat, RequestOptions};
use draftsmith::config::Strategy;
use draftsmith::types::Tone;

#[derive(Parser)]
#[command(name = "draftsmith")]
#[command(
    version,
    about = "Multi-stage AI content pipeline: generate, review and gate articles for publishing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Explicit config file (skips the global/project chain)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

/// Flags that describe the content to write
#[derive(Args)]
struct RequestArgs {
    #[arg(long = "content-type", short = 't', help = "tutorial, guide, article, case-study or a configured type")]
    content_type: Option<String>,
    #[arg(long, help = "Category, also used as an SEO keyword")]
    category: Option<String>,
    #[arg(long, short = 'w', help = "Target word count")]
    words: Option<u32>,
    #[arg(long = "keyword", short = 'k', help = "SEO keyword (repeatable)")]
    keywords: Vec<String>,
    #[arg(long, help = "Audience: beginner, intermediate, advanced")]
    tone: Option<Tone>,
    #[arg(long = "min-words", help = "Lower publish bound (with --max-words)")]
    min_words: Option<u32>,
    #[arg(long = "max-words", help = "Upper publish bound (with --min-words)")]
    max_words: Option<u32>,
}

impl RequestArgs {
    fn into_options(self, topic: String) -> RequestOptions {
        RequestOptions {
            topic,
            content_type: self.content_type,
            category: self.category,
            words: self.words,
            keywords: self.keywords,
            tone: self.tone,
            min_words: self.min_words,
            max_words: self.max_words,
        }
    }
}

/// Flags that override configuration for one run
#[derive(Args)]
struct PipelineArgs {
    #[arg(long, short = 's', help = "fast or thorough")]
    strategy: Option<Strategy>,
    #[arg(long, help = "LLM provider (openai, ollama)")]
    provider: Option<ProviderKind>,
    #[arg(long, help = "Model to use")]
    model: Option<String>,
    #[arg(long = "min-score", help = "Approval threshold (1-10)")]
    min_score: Option<f32>,
    #[arg(long = "max-iterations", help = "Review rounds before giving up")]
    max_iterations: Option<usize>,
    #[arg(long, help = "Sections generated concurrently")]
    concurrency: Option<usize>,
}

/// Where and how results are written
#[derive(Args)]
struct OutputArgs {
    #[arg(long, short, help = "Write output to this file instead of stdout")]
    output: Option<PathBuf>,
    #[arg(long, short = 'f', default_value = "markdown", help = "Output format: markdown, json")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a draft without review
    Generate {
        topic: String,
        #[command(flatten)]
        request: RequestArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, help = "Single-pass draft regardless of strategy")]
        quick: bool,
    },

    /// Review an existing Markdown file
    Review {
        input: PathBuf,
        #[arg(long, help = "Topic (defaults to the file name)")]
        topic: Option<String>,
        #[command(flatten)]
        request: RequestArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate, review and gate for publishing
    Publish {
        topic: String,
        #[command(flatten)]
        request: RequestArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, help = "Exit with an error when not publish-ready")]
        strict: bool,
    },

    /// Show the section plan for a content type
    Plan {
        content_type: Option<String>,
        #[arg(long, short = 'w', help = "Scale the plan to this word count")]
        words: Option<u32>,
        #[arg(long, help = "List known content types")]
        list: bool,
        #[arg(long, short = 'f', default_value = "markdown", help = "Output format: markdown, json")]
        format: OutputFormat,
    },

    /// Check that the configured provider is reachable
    Check {
        #[command(flatten)]
        pipeline: PipelineArgs,
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
        #[arg(short = 'f', long, default_value = "markdown", help = "Output format: markdown (TOML), json")]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

fn overrides(config: Option<PathBuf>, pipeline: Option<PipelineArgs>) -> ConfigOverrides {
    let mut overrides = ConfigOverrides {
        config_path: config,
        ..Default::default()
    };
    if let Some(args) = pipeline {
        overrides.strategy = args.strategy;
        overrides.provider = args.provider;
        overrides.model = args.model;
        overrides.min_score = args.min_score;
        overrides.max_iterations = args.max_iterations;
        overrides.concurrency = args.concurrency;
    }
    overrides
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", console::style("Error:").red().bold(), e);
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
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let show_progress = !cli.quiet;

    match cli.command {
        Commands::Generate {
            topic,
            request,
            pipeline,
            output,
            quick,
        } => {
            commands::generate::run(commands::generate::GenerateOptions {
                request: request.into_options(topic),
                overrides: overrides(cli.config, Some(pipeline)),
                output: output.output,
                format: output.format,
                quick,
                show_progress,
            })?;
        }
        Commands::Review {
            input,
            topic,
            request,
            pipeline,
            output,
        } => {
            commands::review::run(commands::review::ReviewOptions {
                input,
                request: request.into_options(topic.unwrap_or_default()),
                overrides: overrides(cli.config, Some(pipeline)),
                output: output.output,
                format: output.format,
                show_progress,
            })?;
        }
        Commands::Publish {
            topic,
            request,
            pipeline,
            output,
            strict,
        } => {
            commands::publish::run(commands::publish::PublishOptions {
                request: request.into_options(topic),
                overrides: overrides(cli.config, Some(pipeline)),
                output: output.output,
                format: output.format,
                strict,
                show_progress,
            })?;
        }
        Commands::Plan {
            content_type,
            words,
            list,
            format,
        } => {
            commands::plan::run(commands::plan::PlanOptions {
                content_type,
                words,
                list,
                format,
                overrides: overrides(cli.config, None),
            })?;
        }
        Commands::Check { pipeline } => {
            commands::check::run(&overrides(cli.config, Some(pipeline)))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&overrides(cli.config, None), format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
