//! Coloured status output for the CLI. Everything goes to stderr so stdout
//! stays clean for the extracted text.

use std::time::Duration;

use owo_colors::OwoColorize;
use readaloud_core::ParsedArticle;

use crate::VERSION;

/// Name and version, shown once when `--verbose` is on.
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Readaloud".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Turn web articles into text worth listening to\n".dimmed());
}

/// `[n/total] message` progress line.
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a labelled detail line under a step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// One stage duration, tagged fast, moderate or slow.
pub fn print_timing(label: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 50.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 100.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Print the article summary shown after extraction
pub fn print_article_details(article: &ParsedArticle) {
    if !article.title.is_empty() {
        print_detail("Title", &article.title);
    }
    if let Some(byline) = &article.byline {
        print_detail("Byline", byline);
    }
    print_detail("Score", &format!("{:.1}", article.top_score));
}

/// Per-stage durations followed by the end-to-end total.
pub fn print_timing_summary(total: Duration, timings: &[(&str, Duration)]) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Timing Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    for (label, duration) in timings {
        print_timing(label, *duration);
    }

    eprintln!(
        "  {} {:>8.2}ms\n",
        format!("{}:", "Total").bold().dimmed(),
        total.as_secs_f64() * 1000.0
    );
}

/// Human-readable byte count for the fetched body.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
