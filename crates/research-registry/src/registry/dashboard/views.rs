use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::super::domain::{CentreId, ResearchStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProgressBucket {
    #[serde(rename = "0-25")]
    UpToQuarter,
    #[serde(rename = "26-50")]
    UpToHalf,
    #[serde(rename = "51-75")]
    UpToThreeQuarters,
    #[serde(rename = "76-100")]
    Final,
}

impl ProgressBucket {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::UpToQuarter,
            Self::UpToHalf,
            Self::UpToThreeQuarters,
            Self::Final,
        ]
    }

    /// Inclusive upper bounds; a boundary value lands in the lower bucket.
    pub fn for_progress(progress: f64) -> Self {
        if progress <= 25.0 {
            Self::UpToQuarter
        } else if progress <= 50.0 {
            Self::UpToHalf
        } else if progress <= 75.0 {
            Self::UpToThreeQuarters
        } else {
            Self::Final
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UpToQuarter => "0-25",
            Self::UpToHalf => "26-50",
            Self::UpToThreeQuarters => "51-75",
            Self::Final => "76-100",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCount {
    pub bucket: ProgressBucket,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ResearchStatus,
    pub label: &'static str,
    pub count: usize,
}

/// Research counts per known status. Unknown statuses are never tallied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTally {
    pub ongoing_new: usize,
    pub ongoing_past: usize,
    pub unregistered: usize,
    pub completed: usize,
}

impl StatusTally {
    pub fn record(&mut self, status: ResearchStatus) {
        match status {
            ResearchStatus::OngoingNew => self.ongoing_new += 1,
            ResearchStatus::OngoingPast => self.ongoing_past += 1,
            ResearchStatus::Unregistered => self.unregistered += 1,
            ResearchStatus::Completed => self.completed += 1,
            ResearchStatus::Unknown => {}
        }
    }

    pub fn get(&self, status: ResearchStatus) -> usize {
        match status {
            ResearchStatus::OngoingNew => self.ongoing_new,
            ResearchStatus::OngoingPast => self.ongoing_past,
            ResearchStatus::Unregistered => self.unregistered,
            ResearchStatus::Completed => self.completed,
            ResearchStatus::Unknown => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.ongoing_new + self.ongoing_past + self.unregistered + self.completed
    }

    pub fn absorb(&mut self, other: &StatusTally) {
        self.ongoing_new += other.ongoing_new;
        self.ongoing_past += other.ongoing_past;
        self.unregistered += other.unregistered;
        self.completed += other.completed;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreYearlyBudget {
    pub centre_id: CentreId,
    pub abbreviation: String,
    pub budget: f64,
    pub spending: f64,
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyBudgetSummary {
    pub year: i32,
    pub centres: Vec<CentreYearlyBudget>,
    pub total_budget: f64,
    pub total_spending: f64,
    pub total_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearFinancials {
    pub year: i32,
    pub budget: f64,
    pub spending: f64,
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreFinancials {
    pub centre_id: CentreId,
    pub abbreviation: String,
    pub budget: f64,
    pub spending: f64,
    pub utilization: f64,
    /// Newest year first; years without budget are omitted.
    pub yearly: Vec<YearFinancials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreStatusRow {
    pub centre_id: CentreId,
    pub abbreviation: String,
    pub counts: StatusTally,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusSummary {
    pub rows: Vec<CentreStatusRow>,
    pub totals: StatusTally,
    pub grand_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreCount {
    pub centre_id: CentreId,
    pub abbreviation: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Research,
    Collaboration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub title: String,
    /// Centre abbreviation for research, agreement type for collaborations.
    pub subtitle: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub as_of: NaiveDate,
    pub total_research: usize,
    pub ongoing_research: usize,
    pub total_collaborations: usize,
    pub active_collaborations: usize,
    pub total_researchers: usize,
    pub principal_investigators: usize,
    pub status_distribution: Vec<StatusCount>,
    pub progress_distribution: Vec<ProgressCount>,
    pub research_by_centre: Vec<CentreCount>,
    pub yearly_budget: YearlyBudgetSummary,
    pub financials_by_centre: Vec<CentreFinancials>,
    pub project_status: ProjectStatusSummary,
    pub recent_activity: Vec<ActivityEntry>,
}
