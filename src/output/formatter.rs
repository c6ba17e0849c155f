use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::insight::{Confidence, LocalCost, ReportStatus, TownInsightViewModel, TownListing};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format whole dollars with thousands separators: 1234567.8 -> "$1,234,568"
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn format_confidence(confidence: Confidence, use_colors: bool) -> String {
    if !use_colors {
        return confidence.to_string();
    }
    match confidence {
        Confidence::High => confidence.green().bold().to_string(),
        Confidence::Medium => confidence.yellow().bold().to_string(),
        Confidence::Low => confidence.red().bold().to_string(),
    }
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Render the full town report as plain or colored text
pub fn format_report(view: &TownInsightViewModel, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let title = match &view.county {
        Some(county) => format!("My Town: {}, {}", view.name, county),
        None => format!("My Town: {}", view.name),
    };
    lines.push(heading(&title, use_colors));

    let points = view
        .coverage
        .as_ref()
        .map(|c| format!(" ({}/8 points)", c.points))
        .unwrap_or_default();
    lines.push(format!(
        "As of {} | Confidence: {}{}",
        view.as_of,
        format_confidence(view.confidence, use_colors),
        points
    ));
    lines.push(String::new());

    // Headline numbers
    match (&view.transparency_grade, view.transparency_score) {
        (Some(grade), score) => {
            let grade = if use_colors {
                grade.bold().to_string()
            } else {
                grade.clone()
            };
            let detail = match (score, view.transparency_score_year) {
                (Some(s), Some(year)) => format!(" (score {}/100, {})", s, year),
                (Some(s), None) => format!(" (score {}/100)", s),
                (None, _) => String::new(),
            };
            lines.push(format!("Transparency grade: {}{}", grade, detail));
        }
        (None, _) => lines.push("Transparency grade: not yet reviewed".to_string()),
    }

    match view.money_lost_usd {
        Some(lost) => {
            let recovered = view
                .money_recovered_usd
                .map(|r| format!(" (recovered {})", format_usd(r)))
                .unwrap_or_default();
            lines.push(format!("Estimated money lost: {}{}", format_usd(lost), recovered));
        }
        None => lines.push("Estimated money lost: no data yet".to_string()),
    }

    if let Some(jobs) = view.jobs_lost {
        lines.push(format!("Estimated jobs lost: {:.1}", jobs));
    }

    lines.push(String::new());
    lines.push(heading("What this means locally", use_colors));
    match view.local_cost() {
        Some(LocalCost::PerHousehold(usd)) => lines.push(format!(
            "  Estimated cost: {} per household per year (estimate)",
            format_usd(usd)
        )),
        Some(LocalCost::PerResident(usd)) => lines.push(format!(
            "  Estimated cost: {} per resident per year (estimate)",
            format_usd(usd)
        )),
        None => lines.push(
            "  Per-household framing appears once population is available for this town."
                .to_string(),
        ),
    }

    lines.push(String::new());
    match (view.latest_budget_year, view.latest_budget_usd) {
        (Some(year), Some(amount)) => {
            lines.push(format!("Latest budget: {} (FY{})", format_usd(amount), year))
        }
        (Some(year), None) => lines.push(format!("Latest budget: FY{} (amount unavailable)", year)),
        (None, _) => lines.push("Latest budget: no budget data yet".to_string()),
    }

    if !view.real_world_examples.is_empty() {
        lines.push(String::new());
        lines.push(heading("What this means in real terms", use_colors));
        for ex in &view.real_world_examples {
            let note = ex
                .note
                .as_ref()
                .map(|n| format!(", {}", n))
                .unwrap_or_default();
            lines.push(format!(
                "  - {}: ~{:.1} units (at {} each{})",
                ex.label,
                ex.equivalent_units,
                format_usd(ex.usd_per_unit),
                note
            ));
        }
    }

    lines.push(String::new());
    lines.push(heading("Data coverage", use_colors));
    match &view.coverage {
        Some(coverage) => {
            lines.push(format!(
                "  Metrics: {}/{} filled",
                count_or_unknown(coverage.metrics_filled),
                count_or_unknown(coverage.metrics_total)
            ));
            lines.push(format!(
                "  Sources counted: {}",
                count_or_unknown(coverage.sources_count)
            ));
            let stale = if coverage.stale { " (stale)" } else { "" };
            lines.push(format!(
                "  Last updated: {}{}",
                coverage.last_updated_at.format("%Y-%m-%d %H:%M UTC"),
                stale
            ));
            lines.push(format!("  Missing: {}", coverage.missing));
        }
        None => lines.push("  Coverage details not available yet for this town.".to_string()),
    }

    if !view.sources.is_empty() {
        lines.push(String::new());
        lines.push(heading("Sources", use_colors));
        for source in &view.sources {
            let url = if use_colors {
                source.url.underline().to_string()
            } else {
                source.url.clone()
            };
            if source.kind.is_empty() {
                lines.push(format!("  - {} {}", source.title, url));
            } else {
                lines.push(format!("  - {} ({}) {}", source.title, source.kind, url));
            }
        }
    }

    if !view.data_warnings.is_empty() {
        lines.push(String::new());
        lines.push(heading("Data warnings", use_colors));
        for warning in &view.data_warnings {
            lines.push(format!("  - {}", warning));
        }
    }

    lines.join("\n")
}

fn count_or_unknown(count: Option<u32>) -> String {
    count.map_or_else(|| "?".to_string(), |n| n.to_string())
}

/// One line per town: name, grade and confidence, or why there is no report
pub fn format_town_list(listings: &[TownListing], use_colors: bool) -> String {
    if listings.is_empty() {
        return "No municipalities found.".to_string();
    }

    let name_width = listings
        .iter()
        .map(|l| l.profile.display_name().chars().count())
        .max()
        .unwrap_or(0);

    listings
        .iter()
        .map(|listing| {
            let name = format!("{:<width$}", listing.profile.display_name(), width = name_width);
            let status = match &listing.status {
                ReportStatus::Ready { grade, confidence } => format!(
                    "{:<3} Confidence: {}",
                    grade.as_deref().unwrap_or("-"),
                    format_confidence(*confidence, use_colors)
                ),
                ReportStatus::NotYet => {
                    if use_colors {
                        "report not available yet".dimmed().to_string()
                    } else {
                        "report not available yet".to_string()
                    }
                }
                ReportStatus::Failed(message) => {
                    if use_colors {
                        format!("error: {}", message).red().to_string()
                    } else {
                        format!("error: {}", message)
                    }
                }
            };
            format!("{}  {}", name, status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
