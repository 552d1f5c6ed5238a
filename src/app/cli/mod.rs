//! CLI Adapter.

use std::io::{ErrorKind, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Error as DialoguerError, Input};
use serde_json::{Value, json};

use crate::app::api::{self, ApiResponse};
use crate::app::{logging, server};
use crate::domain::{AppError, Keyword, MediaforgeConfig, Phase};

#[derive(Parser)]
#[command(name = "mediaforge")]
#[command(version)]
#[command(
    about = "Generate SEO articles and quality-checked images from a keyword",
    long_about = None
)]
struct Cli {
    /// Path to mediaforge.toml
    #[arg(long, global = true, env = "MEDIAFORGE_CONFIG")]
    config: Option<PathBuf>,
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one prompt for a keyword
    #[clap(visible_alias = "t")]
    Text {
        keyword: Option<String>,
        /// Prompt template name
        #[arg(short, long)]
        prompt_name: String,
    },
    /// Research, outline, write, and render an article
    #[clap(visible_alias = "tm")]
    TextMedia { keyword: Option<String> },
    /// Describe, generate, and quality-check an image
    #[clap(visible_alias = "im")]
    ImageMedia {
        keyword: Option<String>,
        /// Requested image count (reported back)
        #[arg(long)]
        count: Option<u32>,
        /// Save the image and debug side files
        #[arg(long)]
        debug: bool,
    },
    /// Run a single article phase against existing artifacts
    Phase {
        #[arg(value_enum)]
        phase: PhaseArg,
        keyword: Option<String>,
    },
    /// Start the HTTP server
    Serve {
        /// Overrides config and PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List available prompt names
    Prompts,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PhaseArg {
    Terms,
    Outline,
    Merge,
    Sections,
    Render,
}

impl From<PhaseArg> for Phase {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::Terms => Phase::ResearchTerms,
            PhaseArg::Outline => Phase::GenerateOutline,
            PhaseArg::Merge => Phase::MergeOutlineWithTerms,
            PhaseArg::Sections => Phase::GenerateSectionContent,
            PhaseArg::Render => Phase::RenderFinal,
        }
    }
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code_for(&e));
        }
    }
}

fn execute(cli: Cli) -> Result<i32, AppError> {
    let config = MediaforgeConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Prompts => {
            for name in api::prompt_names(&config) {
                println!("{}", name);
            }
            Ok(0)
        }
        Commands::Serve { port } => {
            let port = match port {
                Some(port) => port,
                None => port_from_env()?.unwrap_or(config.server.port),
            };
            let ctx = api::context_from_config(&config)?;
            server::serve(ctx, &config.server.host, port)?;
            Ok(0)
        }
        Commands::Text { keyword, prompt_name } => {
            let body = keyword_body(keyword)?;
            let ctx = api::context_from_config(&config)?;
            Ok(emit(api::text(&ctx, Some(&prompt_name), &body)))
        }
        Commands::TextMedia { keyword } => {
            let body = keyword_body(keyword)?;
            let ctx = api::context_from_config(&config)?;
            Ok(emit(api::text_media(&ctx, &body)))
        }
        Commands::ImageMedia { keyword, count, debug } => {
            let mut body = keyword_body(keyword)?;
            if let Some(count) = count {
                body["count"] = json!(count);
            }
            let ctx = api::context_from_config(&config)?;
            Ok(emit(api::image_media(&ctx, &body, debug)))
        }
        Commands::Phase { phase, keyword } => {
            let keyword = resolve_keyword(keyword)?
                .ok_or_else(|| AppError::validation("keyword is required"))?;
            let keyword = Keyword::new(&keyword)?;
            let ctx = api::context_from_config(&config)?;
            let result = api::phase(&ctx, phase.into(), &keyword)?;
            print_json(&result);
            Ok(0)
        }
    }
}

/// Print the response body; 4xx maps to exit code 2, 5xx to 1.
fn emit(response: ApiResponse) -> i32 {
    print_json(&response.body);
    match response.status {
        200..=299 => 0,
        400..=499 => 2,
        _ => 1,
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

fn exit_code_for(err: &AppError) -> i32 {
    if err.is_client_error() { 2 } else { 1 }
}

fn port_from_env() -> Result<Option<u16>, AppError> {
    match std::env::var("PORT") {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::config_error(format!("PORT must be a port number, got '{}'", raw))),
        _ => Ok(None),
    }
}

/// Request body carrying the keyword; missing keywords are left for the
/// handler to reject.
fn keyword_body(keyword: Option<String>) -> Result<Value, AppError> {
    Ok(match resolve_keyword(keyword)? {
        Some(keyword) => json!({ "keyword": keyword }),
        None => json!({}),
    })
}

fn resolve_keyword(keyword: Option<String>) -> Result<Option<String>, AppError> {
    match keyword {
        Some(value) => Ok(Some(value)),
        None if std::io::stdin().is_terminal() => prompt_keyword(),
        None => Ok(None),
    }
}

fn prompt_keyword() -> Result<Option<String>, AppError> {
    match Input::<String>::new().with_prompt("Keyword").interact_text() {
        Ok(value) => Ok(Some(value)),
        Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(AppError::Validation(format!("Failed to read keyword: {}", err))),
    }
}
