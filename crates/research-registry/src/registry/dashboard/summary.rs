use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::super::domain::{
    AcademicCentre, Collaboration, Research, ResearchRole, ResearchStatus, Researcher,
};
use super::super::snapshot::Dataset;
use super::activity::recent_activity;
use super::views::{
    CentreCount, CentreFinancials, CentreStatusRow, CentreYearlyBudget, DashboardSnapshot,
    ProgressBucket, ProgressCount, ProjectStatusSummary, StatusCount, StatusTally,
    YearFinancials, YearlyBudgetSummary,
};

/// Spending as a percentage of budget; zero when there is no budget.
pub fn utilization_pct(spending: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        spending / budget * 100.0
    } else {
        0.0
    }
}

fn research_in<'r>(
    research: &'r [Research],
    centre: &'r AcademicCentre,
) -> impl Iterator<Item = &'r Research> + 'r {
    research
        .iter()
        .filter(move |item| item.centre_id == centre.id)
}

/// Read-only view over the registry collections as of one calendar day.
///
/// Every figure is recomputed from the borrowed slices on each call.
#[derive(Debug, Clone, Copy)]
pub struct Dashboard<'a> {
    research: &'a [Research],
    collaborations: &'a [Collaboration],
    centres: &'a [AcademicCentre],
    researchers: &'a [Researcher],
    today: NaiveDate,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        research: &'a [Research],
        collaborations: &'a [Collaboration],
        centres: &'a [AcademicCentre],
        researchers: &'a [Researcher],
        today: NaiveDate,
    ) -> Self {
        Self {
            research,
            collaborations,
            centres,
            researchers,
            today,
        }
    }

    pub fn from_dataset(dataset: &'a Dataset, today: NaiveDate) -> Self {
        Self::new(
            &dataset.research,
            &dataset.collaborations,
            &dataset.academic_centres,
            &dataset.researchers,
            today,
        )
    }

    pub fn ongoing_research(&self) -> usize {
        self.research
            .iter()
            .filter(|item| item.status.is_ongoing())
            .count()
    }

    pub fn active_collaborations(&self) -> usize {
        self.collaborations
            .iter()
            .filter(|collaboration| collaboration.is_active(self.today))
            .count()
    }

    /// Researchers holding at least one principal-investigator involvement.
    pub fn principal_investigators(&self) -> usize {
        self.researchers
            .iter()
            .filter(|researcher| researcher.has_role(ResearchRole::PrincipalInvestigator))
            .count()
    }

    pub fn status_distribution(&self) -> Vec<StatusCount> {
        let mut tally = StatusTally::default();
        for item in self.research {
            tally.record(item.status);
        }

        ResearchStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                status,
                label: status.label(),
                count: tally.get(status),
            })
            .collect()
    }

    pub fn progress_distribution(&self) -> Vec<ProgressCount> {
        let mut counts = [0usize; 4];
        for item in self.research {
            let bucket = ProgressBucket::for_progress(item.progress);
            if let Some(index) = ProgressBucket::ordered().iter().position(|b| *b == bucket) {
                counts[index] += 1;
            }
        }

        ProgressBucket::ordered()
            .into_iter()
            .zip(counts)
            .map(|(bucket, count)| ProgressCount { bucket, count })
            .collect()
    }

    /// Centres with at least one research record, in centre order.
    pub fn research_by_centre(&self) -> Vec<CentreCount> {
        self.centres
            .iter()
            .map(|centre| CentreCount {
                centre_id: centre.id.clone(),
                abbreviation: centre.abbreviation.clone(),
                count: research_in(self.research, centre).count(),
            })
            .filter(|entry| entry.count > 0)
            .collect()
    }

    /// Yearly-progress budget per centre for `year`, limited to centres with budget.
    pub fn yearly_budget(&self, year: i32) -> YearlyBudgetSummary {
        let centres: Vec<CentreYearlyBudget> = self
            .centres
            .iter()
            .map(|centre| {
                let (budget, spending) = research_in(self.research, centre)
                    .flat_map(|item| item.yearly_entries_for(year))
                    .fold((0.0, 0.0), |(budget, spending), entry| {
                        (budget + entry.budget_limit, spending + entry.budget_spent)
                    });
                CentreYearlyBudget {
                    centre_id: centre.id.clone(),
                    abbreviation: centre.abbreviation.clone(),
                    budget,
                    spending,
                    utilization: utilization_pct(spending, budget),
                }
            })
            .filter(|row| row.budget > 0.0)
            .collect();

        let total_budget: f64 = centres.iter().map(|row| row.budget).sum();
        let total_spending: f64 = centres.iter().map(|row| row.spending).sum();

        YearlyBudgetSummary {
            year,
            centres,
            total_budget,
            total_spending,
            total_utilization: utilization_pct(total_spending, total_budget),
        }
    }

    pub fn current_year_budget(&self) -> YearlyBudgetSummary {
        self.yearly_budget(self.today.year())
    }

    /// Overall budget per centre plus its yearly breakdown, newest year first.
    pub fn financials_by_centre(&self) -> Vec<CentreFinancials> {
        self.centres
            .iter()
            .map(|centre| {
                let mut budget = 0.0;
                let mut spending = 0.0;
                let mut years: BTreeMap<i32, (f64, f64)> = BTreeMap::new();

                for item in research_in(self.research, centre) {
                    budget += item.budget;
                    spending += item.spending;
                    for entry in &item.yearly_progress {
                        let slot = years.entry(entry.year).or_insert((0.0, 0.0));
                        slot.0 += entry.budget_limit;
                        slot.1 += entry.budget_spent;
                    }
                }

                let yearly = years
                    .into_iter()
                    .rev()
                    .filter(|(_, (budget, _))| *budget > 0.0)
                    .map(|(year, (budget, spending))| YearFinancials {
                        year,
                        budget,
                        spending,
                        utilization: utilization_pct(spending, budget),
                    })
                    .collect();

                CentreFinancials {
                    centre_id: centre.id.clone(),
                    abbreviation: centre.abbreviation.clone(),
                    budget,
                    spending,
                    utilization: utilization_pct(spending, budget),
                    yearly,
                }
            })
            .filter(|row| row.budget > 0.0 || !row.yearly.is_empty())
            .collect()
    }

    /// Centre by status cross-tab; centres without counted research are left out.
    pub fn project_status(&self) -> ProjectStatusSummary {
        let rows: Vec<CentreStatusRow> = self
            .centres
            .iter()
            .map(|centre| {
                let mut counts = StatusTally::default();
                for item in research_in(self.research, centre) {
                    counts.record(item.status);
                }
                CentreStatusRow {
                    centre_id: centre.id.clone(),
                    abbreviation: centre.abbreviation.clone(),
                    total: counts.total(),
                    counts,
                }
            })
            .filter(|row| row.total > 0)
            .collect();

        let mut totals = StatusTally::default();
        for row in &rows {
            totals.absorb(&row.counts);
        }

        ProjectStatusSummary {
            grand_total: totals.total(),
            rows,
            totals,
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            as_of: self.today,
            total_research: self.research.len(),
            ongoing_research: self.ongoing_research(),
            total_collaborations: self.collaborations.len(),
            active_collaborations: self.active_collaborations(),
            total_researchers: self.researchers.len(),
            principal_investigators: self.principal_investigators(),
            status_distribution: self.status_distribution(),
            progress_distribution: self.progress_distribution(),
            research_by_centre: self.research_by_centre(),
            yearly_budget: self.current_year_budget(),
            financials_by_centre: self.financials_by_centre(),
            project_status: self.project_status(),
            recent_activity: recent_activity(self.research, self.collaborations, self.centres),
        }
    }
}
