//! docdown CLI - convert documents to Markdown

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docdown::{ConversionConfig, ConversionResult, convert_file};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "docdown", version, about = "Convert documents to Markdown with inline images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a document and print the result
    Convert {
        /// Document to convert (.docx, .pptx, .ppt, .xlsx, .xls, .xlsm, .pdf, .md)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Configuration file (TOML, YAML or JSON). Discovered from the working directory when omitted
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API server
    #[cfg(feature = "api")]
    Serve {
        /// Address to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// The Markdown document only
    Markdown,
    /// The full result: filename, file_type, parsed_md_content, processing_time
    Json,
}

fn load_config(path: Option<&Path>) -> Result<ConversionConfig> {
    let config = match path {
        Some(path) => ConversionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConversionConfig::discover()
            .context("Failed to load discovered config")?
            .unwrap_or_default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn render_output(result: &ConversionResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(result.markdown.clone()),
        OutputFormat::Json => serde_json::to_string_pretty(result).context("Failed to serialize result"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            input,
            config,
            format,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let result = convert_file(&input, &config)
                .await
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            let rendered = render_output(&result, format)?;

            match output {
                Some(path) => tokio::fs::write(&path, rendered)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", rendered),
            }
        }
        #[cfg(feature = "api")]
        Commands::Serve { host, port, config } => {
            let config = load_config(config.as_deref())?;
            docdown::api::serve_with_config(host, port, config)
                .await
                .context("API server failed")?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
