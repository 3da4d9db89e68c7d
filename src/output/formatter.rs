//! Output formatters for ranked batches

use crate::config::OutputFormat;
use crate::error::{Result, RankerError};
use crate::output::report::{BatchReport, ExportRow};
use crate::processing::record::{MatchBand, ResumeRecord, ScoreSource};
use colored::{Color, Colorize};
use std::path::Path;

pub const EXPORT_FILE_STEM: &str = "filtered_resume_results";

const BAR_WIDTH: usize = 20;

/// Text bar with one block per five percentage points.
pub fn match_bar(percentage: f64) -> String {
    let blocks = ((percentage.clamp(0.0, 100.0) / 5.0).round() as usize).min(BAR_WIDTH);
    "█".repeat(blocks)
}

/// Trait for formatting batch reports
pub trait OutputFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Ranked table with colours and optional per-resume feedback
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

/// CSV export of the filtered view
pub struct CsvFormatter;

/// Report generator that coordinates the formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    csv_formatter: CsvFormatter,
}

fn band_color(band: MatchBand) -> Color {
    match band {
        MatchBand::Strong => Color::Green,
        MatchBand::Good => Color::Yellow,
        MatchBand::Weak => Color::Red,
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_band(&self, band: MatchBand) -> String {
        let color = band_color(band);
        // pad before colouring so escape codes don't break the column
        let padded = format!("{:<6}", band.to_string());
        if self.use_colors {
            padded.color(color).bold().to_string()
        } else {
            padded
        }
    }

    fn format_source(&self, source: ScoreSource) -> String {
        let padded = format!("{:<8}", source.to_string());
        match source {
            ScoreSource::ModelDerived => padded,
            ScoreSource::FallbackSimilarity => self.colorize(&padded, Color::BrightBlack),
        }
    }

    fn format_table(&self, records: &[&ResumeRecord]) -> String {
        let name_width = records
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Resume".len());

        let mut output = format!(
            "{:>4}  {:<name_width$}  {:>8}  {:<8}  {:<6}  {}\n",
            "Rank",
            "Resume",
            "Match",
            "Source",
            "Band",
            "Progress",
            name_width = name_width
        );
        output.push_str(&format!("{}\n", "-".repeat(name_width + 36 + BAR_WIDTH)));

        for record in records {
            let band = record.band();
            output.push_str(&format!(
                "{:>4}  {:<name_width$}  {:>7.2}%  {}  {}  {}\n",
                record.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
                record.name,
                record.match_percentage,
                self.format_source(record.score_source),
                self.format_band(band),
                self.colorize(&match_bar(record.match_percentage), band_color(band)),
                name_width = name_width
            ));
        }
        output
    }

    fn format_distribution(&self, buckets: &[usize; 10]) -> String {
        let peak = buckets.iter().copied().max().unwrap_or(0).max(1);
        let mut output = String::new();
        for (index, count) in buckets.iter().enumerate() {
            let low = index * 10;
            let label = if index == 9 {
                format!("{}-100", low)
            } else {
                format!("{}-{}", low, low + 9)
            };
            // scale so the fullest bucket spans the whole bar
            let blocks = (count * BAR_WIDTH + peak - 1) / peak;
            let bar = format!("{:<width$}", "█".repeat(blocks), width = BAR_WIDTH);
            output.push_str(&format!(
                "  {:>6}%  {}  {}\n",
                label,
                self.colorize(&bar, Color::Cyan),
                count
            ));
        }
        output
    }

    fn format_feedback(&self, record: &ResumeRecord) -> String {
        let mut output = format!(
            "{} {} ({:.2}%, {})\n",
            self.colorize(&format!("#{}", record.rank.unwrap_or_default()), Color::Cyan),
            self.colorize(&record.name, Color::White),
            record.match_percentage,
            record.score_source
        );

        output.push_str(&format!("  Summary: {}\n", record.profile_summary));
        if record.missing_keywords.is_empty() {
            output.push_str(&format!("  Missing keywords: {}\n", self.colorize("No major gaps", Color::Green)));
        } else {
            output.push_str(&format!(
                "  Missing keywords: {}\n",
                self.colorize(&record.missing_keywords.join(", "), Color::Yellow)
            ));
        }
        output.push_str(&format!("  Suggestions: {}\n", record.suggestions));
        if let Some(diagnostic) = &record.diagnostic {
            output.push_str(&format!("  Note: {}\n", self.colorize(diagnostic, Color::BrightBlack)));
        }
        output.push('\n');
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME RANKING", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms | Model: {}\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms,
            report.metadata.model_used
        ));

        let fallbacks = report.fallback_count();
        if fallbacks > 0 {
            output.push_str(&self.colorize(
                &format!(
                    "⚠️  {} of {} resumes scored by text similarity\n",
                    fallbacks,
                    report.records.len()
                ),
                Color::Yellow,
            ));
        }

        output.push_str(&self.format_header("All Resumes", 2));
        if report.records.is_empty() {
            output.push_str("No resumes were scored.\n");
            return Ok(output);
        }
        let all: Vec<&ResumeRecord> = report.records.iter().collect();
        output.push_str(&self.format_table(&all));

        let filtered = report.filtered();
        output.push_str(&self.format_header(
            &format!("Resumes at or above {}%", report.min_match),
            2,
        ));
        if filtered.is_empty() {
            output.push_str(&self.colorize("No resumes meet the minimum match.\n", Color::Red));
        } else {
            output.push_str(&self.format_table(&filtered));
        }

        output.push_str(&self.format_header("📈 Match % Distribution", 2));
        output.push_str(&self.format_distribution(&report.distribution()));

        let keywords = report.common_missing_keywords();
        if !keywords.is_empty() {
            output.push_str(&self.format_header("🔍 Common Missing Keywords", 2));
            for (keyword, count) in keywords.iter().take(15) {
                output.push_str(&format!("  • {} ({})\n", self.colorize(keyword, Color::Yellow), count));
            }
        }

        if self.detailed {
            output.push_str(&self.format_header("📋 Detailed Feedback", 2));
            for record in &report.records {
                output.push_str(&self.format_feedback(record));
            }
        }

        output.push_str(&format!(
            "\n{} Generated by Resume Ranker v{}\n",
            self.colorize("ℹ️", Color::Blue),
            report.metadata.ranker_version
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl CsvFormatter {
    pub fn format_rows(rows: &[ExportRow]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        // header is written even when there are no rows
        writer.write_record(["name", "rank", "match_percentage", "source"])?;
        for row in rows {
            writer.write_record(&[
                row.name.clone(),
                row.rank.map(|rank| rank.to_string()).unwrap_or_default(),
                row.match_percentage.to_string(),
                row.source.clone(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| RankerError::Export(csv::Error::from(e.into_error())))?;
        String::from_utf8(bytes)
            .map_err(|e| RankerError::InvalidInput(format!("CSV output is not UTF-8: {}", e)))
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        Self::format_rows(&report.export_rows())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            csv_formatter: CsvFormatter,
        }
    }

    pub fn generate_report(&self, report: &BatchReport, format: OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Csv => &self.csv_formatter,
        };
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
    };
    format!("{}{}.{}", EXPORT_FILE_STEM, timestamp_suffix, extension)
}
