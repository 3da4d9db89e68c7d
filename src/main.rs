//! Resume ranker: score a batch of resumes against one job description

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_ranker::cli::{self, Cli, Commands, ConfigAction};
use resume_ranker::config::Config;
use resume_ranker::input::{InputManager, UploadedDocument};
use resume_ranker::llm::{DisabledModel, GeminiClient, ModelClient};
use resume_ranker::output::{save_report_to_file, suggest_filename, BatchReport, ReportGenerator};
use resume_ranker::processing::ScoringPipeline;
use resume_ranker::ResumeRecord;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading configuration from {}", path.display())),
        None => Config::load().context("reading default configuration"),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Rank {
            resumes,
            job,
            job_text,
            min_match,
            output,
            save,
            detailed,
            no_model,
            api_key,
            model,
        } => {
            for resume in &resumes {
                cli::validate_file_extension(resume, &["pdf"])
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("resume file {}", resume.display()))?;
            }

            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(anyhow::Error::msg)?,
                None => config.output.format,
            };
            let min_match = match min_match {
                Some(value) => cli::validate_min_match(value).map_err(anyhow::Error::msg)?,
                None => config.scoring.min_match,
            };

            let input_manager = InputManager::new();
            let job_description = match (job, job_text) {
                (Some(path), _) => {
                    cli::validate_file_extension(&path, &["txt", "md"])
                        .map_err(anyhow::Error::msg)
                        .with_context(|| format!("job description file {}", path.display()))?;
                    input_manager.load_job_description(&path).await?
                }
                (None, Some(text)) => text,
                (None, None) => bail!("a job description is required (--job or --job-text)"),
            };

            let documents = input_manager.load_resumes(&resumes).await?;
            info!("Ranking {} resumes (minimum match {}%)", documents.len(), min_match);

            let mut model_config = config.model.clone();
            if let Some(key) = api_key {
                model_config.api_key = Some(key);
            }
            if let Some(name) = model {
                model_config.model_name = name;
            }

            let started = Instant::now();
            let (records, model_used) = if no_model {
                println!("⚠️  Model scoring disabled, using text similarity only");
                rank_with(DisabledModel, &job_description, &documents, config.scoring.concurrency).await?
            } else {
                let client = GeminiClient::new(&model_config)?;
                rank_with(client, &job_description, &documents, config.scoring.concurrency).await?
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let report = BatchReport::new(records, min_match, &model_used, elapsed_ms);
            let use_colors = config.output.color_output && save.is_none();
            let generator = ReportGenerator::with_options(use_colors, detailed, true);
            let content = generator.generate_report(&report, output_format)?;

            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(output_format, true))
                    } else {
                        path
                    };
                    save_report_to_file(&content, &path)
                        .with_context(|| format!("saving report to {}", path.display()))?;
                    println!("💾 Saved {} results to {}", report.filtered().len(), path.display());
                }
                None => print!("{}", content),
            }

            Ok(())
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", path.display());
                    let mut shown = config.clone();
                    if shown.model.api_key.is_some() {
                        shown.model.api_key = Some("********".to_string());
                    }
                    let rendered = toml::to_string_pretty(&shown).context("rendering configuration")?;
                    println!("{}", rendered);
                }
                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default()
                        .save_to(&path)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("✅ Configuration reset successfully!");
                }
                Some(ConfigAction::Path) => println!("{}", path.display()),
            }
            Ok(())
        }
    }
}

/// Score and rank `documents` with `client`, showing a spinner while the
/// batch runs.
async fn rank_with<C: ModelClient>(
    client: C,
    job_description: &str,
    documents: &[UploadedDocument],
    concurrency: usize,
) -> Result<(Vec<ResumeRecord>, String)> {
    let pipeline = ScoringPipeline::new(client, job_description)?.with_concurrency(concurrency);
    let model_used = pipeline.model_name().to_string();

    let progress = ProgressBar::new(documents.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(120));
    progress.set_message("scoring resumes");

    let records = pipeline
        .score_batch_with_progress(documents, |record| {
            progress.inc(1);
            progress.set_message(record.name.clone());
        })
        .await;

    progress.finish_and_clear();
    Ok((records, model_used))
}
