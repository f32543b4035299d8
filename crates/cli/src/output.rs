//! Output formatting utilities

use advisor_lib::orchestrator::{RecommendationQuality, RecordStatus};
use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format currency
pub fn format_currency(amount: f64, currency: &str) -> String {
    match currency {
        "USD" => format!("${:.2}", amount),
        "EUR" => format!("€{:.2}", amount),
        "GBP" => format!("£{:.2}", amount),
        _ => format!("{:.2} {}", amount, currency),
    }
}

/// Format a monthly savings delta with its sign
pub fn format_savings(amount: f64, currency: &str) -> String {
    let formatted = format_currency(amount.abs(), currency);
    if amount >= 0.0 {
        format!("-{}/mo", formatted).green().to_string()
    } else {
        format!("+{}/mo", formatted).red().to_string()
    }
}

/// Color a record status
pub fn color_record_status(status: RecordStatus) -> String {
    let label = status.as_str();
    match status {
        RecordStatus::Completed => label.green().to_string(),
        RecordStatus::Timeout => label.yellow().to_string(),
        RecordStatus::Failed | RecordStatus::Invalid => label.red().to_string(),
    }
}

/// Color a recommendation quality label
pub fn color_quality(quality: RecommendationQuality) -> String {
    match quality {
        RecommendationQuality::ReadyToResize => "ready to resize".green().to_string(),
        RecommendationQuality::ReviewWarnings => "review warnings".yellow().to_string(),
        RecommendationQuality::Blocked => "blocked".red().to_string(),
        RecommendationQuality::Unknown => "unknown".dimmed().to_string(),
    }
}

/// Color an alternative score
pub fn color_score(score: f32) -> String {
    let formatted = format!("{:.1}", score);
    if score >= 100.0 {
        formatted.green().to_string()
    } else if score >= 60.0 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}
