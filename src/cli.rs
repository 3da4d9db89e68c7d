//! CLI interface for the resume ranker

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-ranker")]
#[command(about = "Rank resumes against a job description")]
#[command(long_about = "Score a batch of PDF resumes against one job description with a hosted language model, falling back to text similarity when the model gives no usable score")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score and rank resumes against a job description
    Rank {
        /// Resume files (PDF)
        #[arg(required = true)]
        resumes: Vec<PathBuf>,

        /// Path to job description file (TXT, MD)
        #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Minimum match percentage for the filtered view and export
        #[arg(short, long)]
        min_match: Option<f64>,

        /// Output format: console, json, csv
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show per-resume feedback
        #[arg(short, long)]
        detailed: bool,

        /// Skip the model and score every resume by text similarity
        #[arg(long)]
        no_model: bool,

        /// API key for the model service
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model to use for scoring
        #[arg(long)]
        model: Option<String>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "csv" => Ok(OutputFormat::Csv),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, csv", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

/// Reject thresholds outside `0..=100`.
pub fn validate_min_match(value: f64) -> Result<f64, String> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("Minimum match must be between 0 and 100, got {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("CSV"), Ok(OutputFormat::Csv));
        assert_eq!(parse_output_format("json"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("console"), Ok(OutputFormat::Console));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF"), &["pdf"]).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &["pdf"]).is_err());
        assert!(validate_file_extension(Path::new("cv"), &["pdf"]).is_err());
    }

    #[test]
    fn test_validate_min_match() {
        assert_eq!(validate_min_match(70.0), Ok(70.0));
        assert!(validate_min_match(-1.0).is_err());
        assert!(validate_min_match(100.5).is_err());
    }

    #[test]
    fn test_rank_requires_a_job_description() {
        let result = Cli::try_parse_from(["resume-ranker", "rank", "a.pdf"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "resume-ranker",
            "rank",
            "--job-text",
            "Rust developer",
            "a.pdf",
            "b.pdf",
            "--no-model",
        ])
        .unwrap();
        match cli.command {
            Commands::Rank { resumes, job_text, no_model, .. } => {
                assert_eq!(resumes.len(), 2);
                assert_eq!(job_text.as_deref(), Some("Rust developer"));
                assert!(no_model);
            }
            _ => panic!("expected rank command"),
        }
    }

    #[test]
    fn test_job_sources_conflict() {
        let result = Cli::try_parse_from([
            "resume-ranker",
            "rank",
            "--job",
            "jd.txt",
            "--job-text",
            "inline",
            "a.pdf",
        ]);
        assert!(result.is_err());
    }
}
