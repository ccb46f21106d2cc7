use crate::infra::parse_date;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use research_registry::error::AppError;
use research_registry::registry::dashboard::DashboardSnapshot;
use research_registry::registry::dates::today_local;
use research_registry::registry::report::{
    build_report, format_money, format_percent, CsvRenderer, EnglishLabels, ReportDocument,
    ReportKind, TableRenderer,
};
use research_registry::registry::{Dashboard, Dataset, ResearchStatus};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// JSON snapshot holding research, collaborations, academicCentres and researchers
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Evaluation date for collaboration status and the yearly budget (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the full dashboard as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON snapshot holding research, collaborations, academicCentres and researchers
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Report to render, e.g. research-list, collaborations or yearly-budget
    #[arg(long)]
    pub(crate) kind: ReportKind,
    /// Evaluation date for collaboration status and the yearly budget (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub(crate) format: OutputFormat,
    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs { data, today, json } = args;

    let dataset = Dataset::load(&data)?;
    let today = today.unwrap_or_else(today_local);
    let snapshot = Dashboard::from_dataset(&dataset, today).snapshot();

    if json {
        let rendered = serde_json::to_string_pretty(&snapshot).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_dashboard(&snapshot));
    }
    Ok(())
}

pub(crate) fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut lines = vec![
        format!("Research dashboard as of {}", snapshot.as_of),
        format!(
            "- {} research ({} ongoing) | {} collaborations ({} active)",
            snapshot.total_research,
            snapshot.ongoing_research,
            snapshot.total_collaborations,
            snapshot.active_collaborations
        ),
        format!(
            "- {} researchers | {} principal investigators",
            snapshot.total_researchers, snapshot.principal_investigators
        ),
        "Status distribution:".to_string(),
    ];

    for entry in &snapshot.status_distribution {
        lines.push(format!("  - {}: {}", entry.label, entry.count));
    }

    lines.push("Progress distribution:".to_string());
    for entry in &snapshot.progress_distribution {
        lines.push(format!("  - {}%: {}", entry.bucket.label(), entry.count));
    }

    let budget = &snapshot.yearly_budget;
    lines.push(format!(
        "Budget {}: {} allocated | {} spent | {} utilised",
        budget.year,
        format_money(budget.total_budget),
        format_money(budget.total_spending),
        format_percent(budget.total_utilization)
    ));
    for centre in &budget.centres {
        lines.push(format!(
            "  - {}: {} of {} ({})",
            centre.abbreviation,
            format_money(centre.spending),
            format_money(centre.budget),
            format_percent(centre.utilization)
        ));
    }

    let status = &snapshot.project_status;
    lines.push(format!("Project status ({} counted):", status.grand_total));
    for row in &status.rows {
        let counts: Vec<String> = ResearchStatus::ordered()
            .into_iter()
            .map(|value| format!("{} {}", value.label(), row.counts.get(value)))
            .collect();
        lines.push(format!(
            "  - {}: {} | total {}",
            row.abbreviation,
            counts.join(", "),
            row.total
        ));
    }

    if !snapshot.recent_activity.is_empty() {
        lines.push("Recent activity:".to_string());
        for entry in &snapshot.recent_activity {
            lines.push(format!(
                "  - {} [{}] {}",
                entry.created_at.format("%Y-%m-%d"),
                entry.subtitle,
                entry.title
            ));
        }
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        data,
        kind,
        today,
        format,
        out,
    } = args;

    let dataset = Dataset::load(&data)?;
    let today = today.unwrap_or_else(today_local);
    let document = build_report(kind, &dataset, &EnglishLabels, today);
    let rendered = render_document(&document, format)?;

    match out {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            println!("Wrote {} report to {}", kind, path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn render_document(document: &ReportDocument, format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Csv => Ok(CsvRenderer.render(document)?),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(document).map_err(std::io::Error::from)?;
            json.push('\n');
            Ok(json)
        }
    }
}
