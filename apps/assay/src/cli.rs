//! # CLI
//!
//! Command-line surface. Parsing is clap derive; every command is a
//! `cmd_*` function returning the text to print, so commands are testable
//! without spawning a process.

use crate::api;
use crate::config::{ConfigError, EngineConfig};
use crate::engine::Engine;
use crate::source::{EvidenceSource, SimulatedSource, SourceError, StaticSource, TimeoutSource};
use assay_core::{Answerability, ValidationError};
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "assay",
    version,
    about = "Answer questions by generating, interrogating and eliminating hypotheses"
)]
pub struct Cli {
    /// JSON engine configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Evidence source to interrogate.
    #[arg(long, global = true, value_enum, default_value_t = SourceKind::Simulated)]
    pub source: SourceKind,

    /// Keyword table for `--source static`.
    #[arg(long, global = true)]
    pub source_file: Option<PathBuf>,

    /// Override `max_hypotheses`.
    #[arg(long, global = true)]
    pub max_hypotheses: Option<usize>,

    /// Override `confidence_threshold`.
    #[arg(long, global = true)]
    pub threshold: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Simulated,
    Static,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full lifecycle and print the decision.
    Ask {
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Estimate answerability without interrogating any source.
    Check {
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Serve the HTTP API.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("query must not be empty")]
    EmptyQuery,

    #[error("--source static requires --source-file")]
    MissingSourceFile,

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// SETUP
// =============================================================================

/// Load the config file (or defaults) and apply flag overrides, then validate.
pub fn load_config(
    path: Option<&Path>,
    max_hypotheses: Option<usize>,
    threshold: Option<f64>,
) -> Result<EngineConfig, CliError> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(max) = max_hypotheses {
        config.max_hypotheses = max;
    }
    if let Some(threshold) = threshold {
        config.confidence_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

/// Build the configured evidence source, bounded by `timeout`.
pub fn build_source(
    kind: SourceKind,
    file: Option<&Path>,
    timeout: Duration,
) -> Result<Arc<dyn EvidenceSource>, CliError> {
    Ok(match kind {
        SourceKind::Simulated => Arc::new(TimeoutSource::new(SimulatedSource::new(), timeout)),
        SourceKind::Static => {
            let path = file.ok_or(CliError::MissingSourceFile)?;
            Arc::new(TimeoutSource::new(StaticSource::load(path)?, timeout))
        }
    })
}

/// Build an engine from parsed arguments.
pub fn build_engine(cli: &Cli) -> Result<Engine, CliError> {
    let config = load_config(cli.config.as_deref(), cli.max_hypotheses, cli.threshold)?;
    let source = build_source(cli.source, cli.source_file.as_deref(), config.source_timeout())?;
    Ok(Engine::new(config, source))
}

// =============================================================================
// COMMANDS
// =============================================================================

pub async fn cmd_ask(engine: &Engine, query: &str, json: bool) -> Result<String, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::EmptyQuery);
    }
    let result = engine.execute(query).await;
    if json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(result.to_text())
    }
}

pub fn cmd_check(engine: &Engine, query: &str, json: bool) -> Result<String, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::EmptyQuery);
    }
    let assessment = engine.can_answer(query);
    if json {
        Ok(serde_json::to_string_pretty(&assessment)?)
    } else {
        Ok(render_answerability(&assessment))
    }
}

pub async fn cmd_serve(engine: Engine, addr: SocketAddr) -> Result<(), CliError> {
    api::serve(Arc::new(engine), addr).await?;
    Ok(())
}

fn render_answerability(a: &Answerability) -> String {
    let strategies = if a.strategies.is_empty() {
        String::from("(none)")
    } else {
        a.strategies
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "answerable: {}\nconfidence: {:.2}\nreason: {}\nestimated cost: {:.1}\nestimated time: {:.0}s\nstrategies: {}\n",
        if a.answerable { "yes" } else { "no" },
        a.confidence,
        a.reason,
        a.estimated_cost,
        a.estimated_time_secs,
        strategies
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ask_with_globals() {
        let cli = Cli::try_parse_from(["assay", "ask", "What is rust?", "--json", "--verbose"]);
        let cli = cli.ok();
        assert!(cli.as_ref().is_some_and(|c| c.verbose));
        assert!(matches!(
            cli.map(|c| c.command),
            Some(Commands::Ask { json: true, .. })
        ));
    }

    #[test]
    fn parses_serve_default_addr() {
        let cli = Cli::try_parse_from(["assay", "serve"]).ok();
        let addr = match cli.map(|c| c.command) {
            Some(Commands::Serve { addr }) => Some(addr),
            _ => None,
        };
        assert_eq!(addr.map(|a| a.port()), Some(8080));
    }

    #[test]
    fn static_source_requires_file() {
        let result = build_source(SourceKind::Static, None, Duration::from_secs(1));
        assert!(matches!(result, Err(CliError::MissingSourceFile)));
    }

    #[test]
    fn overrides_are_validated() {
        assert!(load_config(None, None, Some(2.0)).is_err());
        assert!(load_config(None, Some(0), None).is_err());
        assert_eq!(
            load_config(None, Some(3), Some(0.9)).ok().map(|c| c.max_hypotheses),
            Some(3)
        );
    }

    #[test]
    fn answerability_renders_lines() {
        let engine = Engine::new(EngineConfig::default(), Arc::new(SimulatedSource::new()));
        let text = cmd_check(&engine, "hello", false).unwrap_or_default();
        assert!(text.contains("answerable: no"));
        assert!(text.contains("strategies: (none)"));
    }
}
