use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::flags::{FlagCatalogue, FlagDefinition, FlagSummaryRow, FlaggedProject, Severity};
use crate::portfolio::{DimensionStats, PortfolioSummary};
use crate::scoring::{QualityTier, Weights};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Tier label padded to `width`, colored by band.
fn format_tier(tier: QualityTier, width: usize, use_colors: bool) -> String {
    let padded = format!("{:<width$}", tier.label(), width = width);
    if !use_colors {
        return padded;
    }
    match tier {
        QualityTier::VeryHigh => padded.green().bold().to_string(),
        QualityTier::High => padded.green().to_string(),
        QualityTier::Medium => padded.yellow().to_string(),
        QualityTier::Low => padded.red().to_string(),
        QualityTier::VeryLow => padded.red().bold().to_string(),
    }
}

/// Severity label ("none" when absent) padded to `width`.
fn format_severity(severity: Option<Severity>, width: usize, use_colors: bool) -> String {
    let label = severity.map(|s| s.as_str()).unwrap_or("none");
    let padded = format!("{:<width$}", label, width = width);
    if !use_colors {
        return padded;
    }
    match severity {
        Some(Severity::High) => padded.red().bold().to_string(),
        Some(Severity::Medium) => padded.yellow().to_string(),
        Some(Severity::Low) => padded.cyan().to_string(),
        None => padded.dimmed().to_string(),
    }
}

/// Format projects as a ranked table with columns:
/// Index, CQI, Tier, Flags, Severity, Project id, Name
/// No headers (minimal format). `first_rank` is the 0-based rank of the
/// first row, so a bottom slice keeps its overall positions.
pub fn format_ranked_table(
    projects: &[FlaggedProject],
    first_rank: usize,
    use_colors: bool,
) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }

    let term_width = get_terminal_width();

    // Index "999." + CQI "100.0" + tier "Very High" + flags "9" + severity "medium"
    let index_width = 4;
    let cqi_width = 5;
    let tier_width = 9;
    let flags_width = 1;
    let severity_width = 6;
    let separator = "  ";

    projects
        .iter()
        .enumerate()
        .map(|(offset, flagged)| {
            let idx = first_rank + offset;
            let index_str = format!("{:>3}.", idx + 1);
            let cqi_str = format!("{:>width$.1}", flagged.cqi(), width = cqi_width);
            let tier_str = format_tier(flagged.scored.quality_tier, tier_width, use_colors);
            let flags_str = format!("{:>width$}", flagged.flag_count, width = flags_width);
            let severity_str = format_severity(flagged.max_severity, severity_width, use_colors);
            let id = flagged.project().display_id(idx);
            let name = flagged.project().name().unwrap_or("(unnamed)");

            let fixed_width = index_width
                + cqi_width
                + tier_width
                + flags_width
                + severity_width
                + id.chars().count()
                + separator.len() * 6;

            let name = if let Some(width) = term_width {
                if width > fixed_width + 10 {
                    truncate_text(name, width - fixed_width)
                } else {
                    truncate_text(name, 20)
                }
            } else {
                // No terminal (pipe), don't truncate
                name.to_string()
            };

            if use_colors {
                format!(
                    "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
                    index_str.dimmed(),
                    cqi_str.bold(),
                    tier_str,
                    flags_str,
                    severity_str,
                    id.underline(),
                    name,
                    sep = separator
                )
            } else {
                format!(
                    "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
                    index_str,
                    cqi_str,
                    tier_str,
                    flags_str,
                    severity_str,
                    id,
                    name,
                    sep = separator
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format projects as tab-separated values for scripting
/// Columns: cqi, tier, flag_count, max_severity, project_id, name, flags
/// (no headers, no colors)
pub fn format_tsv(projects: &[FlaggedProject], first_rank: usize) -> String {
    projects
        .iter()
        .enumerate()
        .map(|(offset, flagged)| {
            let idx = first_rank + offset;
            let flags = flagged
                .flags
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(",");
            format!(
                "{:.2}\t{}\t{}\t{}\t{}\t{}\t{}",
                flagged.cqi(),
                flagged.scored.quality_tier,
                flagged.flag_count,
                flagged.max_severity_label(),
                flagged.project().display_id(idx),
                flagged.project().name().unwrap_or(""),
                flags
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single project with its score breakdown and triggered flags
/// (for verbose mode and `show`)
pub fn format_project_detail(
    flagged: &FlaggedProject,
    position: usize,
    weights: &Weights,
    catalogue: &FlagCatalogue,
    use_colors: bool,
) -> String {
    let project = flagged.project();
    let id = project.display_id(position);
    let mut lines = Vec::new();

    let title = match project.name() {
        Some(name) => format!("{} ({})", name, id),
        None => id,
    };
    if use_colors {
        lines.push(title.bold().to_string());
    } else {
        lines.push(title);
    }

    lines.push(format!("  Country: {}", project.country().unwrap_or("unknown")));
    lines.push(format!("  Type: {}", project.project_type().unwrap_or("unknown")));
    lines.push(format!(
        "  CQI: {:.2} ({})",
        flagged.cqi(),
        flagged.scored.quality_tier
    ));

    for contribution in flagged.scored.breakdown(weights) {
        lines.push(format!(
            "    {:<17} {:>5.1} x {:.2} = {:>5.2}",
            contribution.label, contribution.score, contribution.weight, contribution.points
        ));
    }

    if flagged.flags.is_empty() {
        lines.push("  Flags: none".to_string());
    } else {
        lines.push(format!(
            "  Flags: {} (worst: {})",
            flagged.flag_count,
            flagged.max_severity_label()
        ));
        for code in &flagged.flags {
            let severity = catalogue.severity(*code);
            lines.push(format!(
                "    [{}] {} - {}",
                format_severity(Some(severity), 6, use_colors),
                code,
                catalogue.label(*code)
            ));
        }
    }

    lines.join("\n")
}

/// Format the flag frequency table, one flag per line
pub fn format_flag_summary(rows: &[FlagSummaryRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No red flags raised.".to_string();
    }

    rows.iter()
        .map(|row| {
            format!(
                "{:>5}  {:>5.1}%  {}  {:<20}  {}",
                row.project_count,
                row.pct_of_portfolio,
                format_severity(Some(row.severity), 6, use_colors),
                row.flag_code.as_str(),
                row.label
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the portfolio headline card
pub fn format_portfolio_summary(summary: &PortfolioSummary) -> String {
    let rule = "=".repeat(55);
    let mut lines = vec![
        rule.clone(),
        "  PORTFOLIO QUALITY SUMMARY".to_string(),
        rule.clone(),
        format!("  Total projects analysed:  {}", summary.total_projects),
        format!(
            "  Average CQI:              {}",
            summary
                .avg_cqi
                .map(|c| format!("{:.1}", c))
                .unwrap_or_else(|| "-".to_string())
        ),
        format!(
            "  High-quality projects:    {:.1}% (CQI >= 70)",
            summary.pct_high_quality
        ),
        format!("  Projects with flags:      {:.1}%", summary.pct_flagged),
        format!(
            "  Total issued (MtCO2e):    {:.2}",
            summary.total_issued_mtco2
        ),
        format!(
            "  Total retired (MtCO2e):   {:.2}",
            summary.total_retired_mtco2
        ),
    ];
    if let Some(ref country) = summary.top_country {
        lines.push(format!("  Most common country:      {}", country));
    }
    if let Some(ref project_type) = summary.top_project_type {
        lines.push(format!("  Most common type:         {}", project_type));
    }
    let tiers = summary
        .tier_counts
        .iter()
        .map(|(tier, count)| format!("{} {}", tier, count))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("  Tiers:                    {}", tiers));
    lines.push(rule);
    lines.join("\n")
}

/// Format score dimension statistics (mean / min / max)
pub fn format_dimension_stats(stats: &[DimensionStats]) -> String {
    stats
        .iter()
        .map(|s| {
            format!(
                "  {:<24} mean {:>5.1}  min {:>5.1}  max {:>5.1}",
                s.dimension, s.mean, s.min, s.max
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one catalogue entry: code, severity and label, then the description
pub fn format_flag_definition(def: &FlagDefinition, use_colors: bool) -> String {
    let code = if use_colors {
        def.code.as_str().bold().to_string()
    } else {
        def.code.as_str().to_string()
    };
    format!(
        "{}  [{}]  {}\n    {}",
        code,
        format_severity(Some(def.severity), 6, use_colors),
        def.label,
        def.description
    )
}

/// Format the flag catalogue for `catalogue`
pub fn format_catalogue(catalogue: &FlagCatalogue, use_colors: bool) -> String {
    catalogue
        .entries()
        .iter()
        .map(|def| format_flag_definition(def, use_colors))
        .collect::<Vec<_>>()
        .join("\n")
}
