// src/main.rs

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use testsmith::config::Config;
use testsmith::service::ToolService;

#[derive(Parser)]
#[command(
    name = "testsmith",
    version,
    about = "Static function analysis + test-generation prompt orchestration"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one function and print the normalized metrics
    Analyze {
        /// Source language: python, java, typescript/js
        #[arg(short, long)]
        language: String,
        /// Read source from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Summarize an analysis (JSON from a file or stdin) into a test plan
    Summarize {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Build the LLM prompt from a flow summary (JSON from a file or stdin)
    Prompt {
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Test framework: auto, pytest, junit5, jest
        #[arg(short = 't', long, default_value = "auto")]
        framework: String,
    },
    /// Run analysis, summarization and prompt generation in one pass
    Pipeline {
        #[arg(short, long)]
        language: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short = 't', long, default_value = "auto")]
        framework: String,
    },
    /// Probe backend availability
    Status,
    /// Show recent analyses or prompts
    History {
        /// Which history to show: analyses or prompts
        #[arg(value_parser = ["analyses", "prompts"])]
        kind: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let service = ToolService::new(Config::load());

    match run(&cli.command, &service) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Command, service: &ToolService) -> Result<(), String> {
    match command {
        Command::Analyze { language, file } => {
            let code = read_source(file.as_deref())?;
            print_json(&service.analyze_function(language, &code))
        }
        Command::Summarize { file } => {
            let value = read_json(file.as_deref())?;
            match service.summarize_flow(&value) {
                Ok(summary) => print_json(&summary),
                Err(e) => print_error(&e),
            }
        }
        Command::Prompt { file, framework } => {
            let value = read_json(file.as_deref())?;
            match service.build_prompt(&value, framework) {
                Ok(artifact) => print_json(&artifact),
                Err(e) => print_error(&e),
            }
        }
        Command::Pipeline {
            language,
            file,
            framework,
        } => {
            let code = read_source(file.as_deref())?;
            print_json(&service.run_full_pipeline(language, &code, framework))
        }
        Command::Status => print_json(&service.check_runtime_status()),
        Command::History { kind } => match kind.as_str() {
            "analyses" => print_json(&service.last_analyses()),
            _ => print_json(&service.last_prompts()),
        },
    }
}

fn read_source(file: Option<&std::path::Path>) -> Result<String, String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

fn read_json(file: Option<&std::path::Path>) -> Result<serde_json::Value, String> {
    let raw = read_source(file)?;
    serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON input: {}", e))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| format!("Failed to render output: {}", e))?;
    println!("{}", rendered);
    Ok(())
}

fn print_error(message: &str) -> Result<(), String> {
    println!("{}", serde_json::json!({ "error": message }));
    Ok(())
}
