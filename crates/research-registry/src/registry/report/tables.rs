use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::super::dashboard::views::{ProjectStatusSummary, YearlyBudgetSummary};
use super::super::dashboard::Dashboard;
use super::super::domain::{
    centre_abbreviation, AcademicCentre, CentreId, Collaboration, InvolvementProject, Research,
    ResearchRole, ResearchStatus, Researcher, UNRESOLVED,
};
use super::super::snapshot::Dataset;
use super::format::{
    ellipsize, format_amount, format_date, format_money, format_percent, format_period,
    truncate_chars,
};
use super::labels::Translator;

const LIST_TITLE_CHARS: usize = 30;
const DETAIL_TITLE_CHARS: usize = 40;
const INVOLVEMENT_TITLE_CHARS: usize = 50;

/// One table of a report: header row, body rows and an optional totals row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foot: Option<Vec<String>>,
}

/// Renderer-neutral report: a title and its tables in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub tables: Vec<ReportTable>,
}

/// Collection-wide reports addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    ResearchList,
    FullResearch,
    Collaborations,
    ResearchersSummary,
    ResearcherInvolvements,
    YearlyBudget,
    ProjectStatus,
}

impl ReportKind {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::ResearchList,
            Self::FullResearch,
            Self::Collaborations,
            Self::ResearchersSummary,
            Self::ResearcherInvolvements,
            Self::YearlyBudget,
            Self::ProjectStatus,
        ]
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::ResearchList => "research-list",
            Self::FullResearch => "full-research",
            Self::Collaborations => "collaborations",
            Self::ResearchersSummary => "researchers-summary",
            Self::ResearcherInvolvements => "researcher-involvements",
            Self::YearlyBudget => "yearly-budget",
            Self::ProjectStatus => "project-status",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report kind '{0}'")]
pub struct UnknownReportKind(pub String);

impl FromStr for ReportKind {
    type Err = UnknownReportKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.slug() == value)
            .ok_or_else(|| UnknownReportKind(value.to_string()))
    }
}

/// Turns registry records into report tables using the injected labels.
pub struct ReportBuilder<'a> {
    centres: &'a [AcademicCentre],
    research: &'a [Research],
    labels: &'a dyn Translator,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(
        centres: &'a [AcademicCentre],
        research: &'a [Research],
        labels: &'a dyn Translator,
    ) -> Self {
        Self {
            centres,
            research,
            labels,
        }
    }

    fn t(&self, key: &str) -> String {
        self.labels.translate(key).into_owned()
    }

    fn heads(&self, keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| self.t(key)).collect()
    }

    fn centre(&self, id: &CentreId) -> String {
        match centre_abbreviation(self.centres, id) {
            UNRESOLVED => self.t("common.na"),
            abbreviation => abbreviation.to_string(),
        }
    }

    fn centre_name(&self, id: &CentreId) -> String {
        self.centres
            .iter()
            .find(|centre| &centre.id == id)
            .map(|centre| centre.name.clone())
            .unwrap_or_else(|| self.t("common.na"))
    }

    fn status(&self, status: ResearchStatus) -> String {
        self.t(status.translation_key())
    }

    /// Overview of each research record, one row per project.
    pub fn research_list(&self, items: &[Research]) -> ReportDocument {
        let body = items
            .iter()
            .map(|item| {
                vec![
                    truncate_chars(&item.title, LIST_TITLE_CHARS),
                    self.centre(&item.centre_id),
                    self.status(item.status),
                    format_period(item.start_date, item.end_date),
                    format_money(item.budget),
                    format_money(item.spending),
                    format_percent(item.progress),
                ]
            })
            .collect();

        ReportDocument {
            title: self.t("report.researchReport"),
            tables: vec![ReportTable {
                caption: None,
                head: self.heads(&[
                    "report.title",
                    "report.centre",
                    "report.status",
                    "report.period",
                    "report.budget",
                    "report.spending",
                    "report.progress",
                ]),
                body,
                foot: None,
            }],
        }
    }

    /// Portfolio metrics followed by a detail row per project.
    pub fn full_research(&self, items: &[Research]) -> ReportDocument {
        let ongoing = items.iter().filter(|item| item.status.is_ongoing()).count();
        let completed = items
            .iter()
            .filter(|item| item.status == ResearchStatus::Completed)
            .count();
        let total_budget: f64 = items.iter().map(|item| item.budget).sum();
        let total_spending: f64 = items.iter().map(|item| item.spending).sum();

        let summary = ReportTable {
            caption: Some(self.t("report.summary")),
            head: self.heads(&["report.metric", "report.value"]),
            body: vec![
                vec![self.t("report.totalProjects"), items.len().to_string()],
                vec![self.t("report.ongoing"), ongoing.to_string()],
                vec![self.t("report.completed"), completed.to_string()],
                vec![self.t("report.totalBudget"), format_money(total_budget)],
                vec![self.t("report.totalSpending"), format_money(total_spending)],
            ],
            foot: None,
        };

        let details = ReportTable {
            caption: Some(self.t("report.details")),
            head: self.heads(&[
                "report.title",
                "report.centre",
                "report.status",
                "report.start",
                "report.end",
                "report.budget",
                "report.progress",
            ]),
            body: items
                .iter()
                .map(|item| {
                    vec![
                        truncate_chars(&item.title, DETAIL_TITLE_CHARS),
                        self.centre(&item.centre_id),
                        self.status(item.status),
                        format_date(item.start_date),
                        format_date(item.end_date),
                        format_money(item.budget),
                        format_percent(item.progress),
                    ]
                })
                .collect(),
            foot: None,
        };

        ReportDocument {
            title: self.t("report.fullResearchReport"),
            tables: vec![summary, details],
        }
    }

    /// Everything about one project: header facts, financials, yearly checkpoints, team.
    pub fn single_research(&self, item: &Research) -> ReportDocument {
        let overview = ReportTable {
            caption: Some(item.title.clone()),
            head: self.heads(&["report.metric", "report.value"]),
            body: vec![
                vec![self.t("report.centre"), self.centre_name(&item.centre_id)],
                vec![self.t("report.status"), self.status(item.status)],
                vec![
                    self.t("report.period"),
                    format_period(item.start_date, item.end_date),
                ],
                vec![self.t("report.progress"), format_percent(item.progress)],
            ],
            foot: None,
        };

        let financials = ReportTable {
            caption: Some(self.t("report.financials")),
            head: self.heads(&["report.financialItem", "report.amount"]),
            body: vec![
                vec![self.t("report.overallBudget"), format_money(item.budget)],
                vec![self.t("report.overallSpending"), format_money(item.spending)],
                vec![
                    self.t("report.remainingOverall"),
                    format_money(item.budget - item.spending),
                ],
            ],
            foot: None,
        };

        let mut tables = vec![overview, financials];

        if !item.yearly_progress.is_empty() {
            tables.push(ReportTable {
                caption: Some(self.t("report.yearlyProgressBudget")),
                head: self.heads(&[
                    "report.year",
                    "report.progress",
                    "report.budgetLimit",
                    "report.budgetSpent",
                    "report.notes",
                ]),
                body: item
                    .yearly_progress
                    .iter()
                    .map(|entry| {
                        vec![
                            entry.year.to_string(),
                            format_percent(entry.progress),
                            format_money(entry.budget_limit),
                            format_money(entry.budget_spent),
                            entry.notes.clone().unwrap_or_default(),
                        ]
                    })
                    .collect(),
                foot: None,
            });
        }

        tables.push(ReportTable {
            caption: None,
            head: self.heads(&["report.researchTeam"]),
            body: item.team.iter().map(|member| vec![member.clone()]).collect(),
            foot: None,
        });

        ReportDocument {
            title: self.t("report.individualResearchReport"),
            tables,
        }
    }

    /// Agreements with the period running to the effective end date and derived status.
    pub fn collaborations(&self, items: &[Collaboration], today: NaiveDate) -> ReportDocument {
        let body = items
            .iter()
            .map(|item| {
                let statuses = item
                    .status(today)
                    .into_iter()
                    .map(|status| self.t(status.translation_key()))
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    item.organization.clone(),
                    item.kind.label().to_string(),
                    self.centre(&item.centre_id),
                    format_period(item.start_date, item.effective_end_date()),
                    statuses,
                ]
            })
            .collect();

        ReportDocument {
            title: self.t("report.collaborationsReport"),
            tables: vec![ReportTable {
                caption: None,
                head: self.heads(&[
                    "report.organization",
                    "report.type",
                    "report.centre",
                    "report.period",
                    "report.status",
                ]),
                body,
                foot: None,
            }],
        }
    }

    /// Involvement counts per researcher, split by role.
    pub fn researchers_summary(&self, researchers: &[Researcher]) -> ReportDocument {
        let body = researchers
            .iter()
            .map(|researcher| {
                vec![
                    researcher.name.clone(),
                    researcher.email.clone(),
                    self.centre(&researcher.centre_id),
                    researcher.involvements.len().to_string(),
                    researcher
                        .count_role(ResearchRole::PrincipalInvestigator)
                        .to_string(),
                    researcher
                        .count_role(ResearchRole::ResearchSecretary)
                        .to_string(),
                    researcher.count_role(ResearchRole::ResearchMember).to_string(),
                ]
            })
            .collect();

        ReportDocument {
            title: self.t("report.researchersSummaryReport"),
            tables: vec![ReportTable {
                caption: None,
                head: self.heads(&[
                    "report.name",
                    "report.email",
                    "report.centre",
                    "report.total",
                    "report.pi",
                    "report.secretary",
                    "report.member",
                ]),
                body,
                foot: None,
            }],
        }
    }

    /// Project-level table of one researcher's involvements.
    pub fn involvement_table(&self, researcher: &Researcher) -> ReportTable {
        let body = researcher
            .involvements
            .iter()
            .map(|involvement| {
                let (kind, title, status) = match &involvement.project {
                    InvolvementProject::Internal { research_id } => {
                        let found = research_id.as_ref().and_then(|id| {
                            self.research.iter().find(|item| &item.id == id)
                        });
                        match found {
                            Some(item) => (
                                self.t("report.internal"),
                                item.title.clone(),
                                self.status(item.status),
                            ),
                            None => (
                                self.t("report.internal"),
                                self.t("report.unknownResearch"),
                                self.t("common.na"),
                            ),
                        }
                    }
                    InvolvementProject::External { title, status } => (
                        self.t("report.external"),
                        title.clone().unwrap_or_else(|| self.t("common.na")),
                        status
                            .map(|status| self.t(status.translation_key()))
                            .unwrap_or_else(|| self.t("common.na")),
                    ),
                };
                vec![
                    ellipsize(&title, INVOLVEMENT_TITLE_CHARS),
                    kind,
                    self.t(involvement.role.translation_key()),
                    status,
                ]
            })
            .collect();

        ReportTable {
            caption: Some(format!(
                "{} | {}",
                researcher.name,
                self.centre(&researcher.centre_id)
            )),
            head: self.heads(&[
                "report.projectTitle",
                "report.type",
                "report.role",
                "report.status",
            ]),
            body,
            foot: None,
        }
    }

    pub fn researcher_involvements(&self, researcher: &Researcher) -> ReportDocument {
        ReportDocument {
            title: researcher.name.clone(),
            tables: vec![self.involvement_table(researcher)],
        }
    }

    /// One involvement table per researcher.
    pub fn all_researcher_involvements(&self, researchers: &[Researcher]) -> ReportDocument {
        ReportDocument {
            title: self.t("report.fullResearchersReport"),
            tables: researchers
                .iter()
                .map(|researcher| self.involvement_table(researcher))
                .collect(),
        }
    }

    pub fn yearly_budget(&self, summary: &YearlyBudgetSummary) -> ReportDocument {
        let body = summary
            .centres
            .iter()
            .map(|row| {
                vec![
                    row.abbreviation.clone(),
                    format_amount(row.budget),
                    format_amount(row.spending),
                    format_percent(row.utilization),
                ]
            })
            .collect();

        ReportDocument {
            title: format!(
                "{} {}",
                self.t("report.yearlyBudgetSummaryReport"),
                summary.year
            ),
            tables: vec![ReportTable {
                caption: None,
                head: self.heads(&[
                    "report.centre",
                    "report.yearlyBudgetLimit",
                    "report.yearlySpending",
                    "report.spentPercent",
                ]),
                body,
                foot: Some(vec![
                    self.t("report.total"),
                    format_amount(summary.total_budget),
                    format_amount(summary.total_spending),
                    format_percent(summary.total_utilization),
                ]),
            }],
        }
    }

    pub fn project_status(&self, summary: &ProjectStatusSummary) -> ReportDocument {
        let statuses = ResearchStatus::ordered();
        let body = summary
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.abbreviation.clone()];
                cells.extend(statuses.iter().map(|status| row.counts.get(*status).to_string()));
                cells.push(row.total.to_string());
                cells
            })
            .collect();

        let mut foot = vec![self.t("report.total")];
        foot.extend(
            statuses
                .iter()
                .map(|status| summary.totals.get(*status).to_string()),
        );
        foot.push(summary.grand_total.to_string());

        ReportDocument {
            title: self.t("report.projectStatusSummaryReport"),
            tables: vec![ReportTable {
                caption: None,
                head: self.heads(&[
                    "report.centre",
                    "report.activeNew",
                    "report.activePast",
                    "report.unregistered",
                    "report.completed",
                    "report.total",
                ]),
                body,
                foot: Some(foot),
            }],
        }
    }
}

/// Build a collection-wide report over a snapshot as of `today`.
pub fn build_report(
    kind: ReportKind,
    dataset: &Dataset,
    labels: &dyn Translator,
    today: NaiveDate,
) -> ReportDocument {
    let builder = ReportBuilder::new(&dataset.academic_centres, &dataset.research, labels);
    let dashboard = Dashboard::from_dataset(dataset, today);

    match kind {
        ReportKind::ResearchList => builder.research_list(&dataset.research),
        ReportKind::FullResearch => builder.full_research(&dataset.research),
        ReportKind::Collaborations => builder.collaborations(&dataset.collaborations, today),
        ReportKind::ResearchersSummary => builder.researchers_summary(&dataset.researchers),
        ReportKind::ResearcherInvolvements => {
            builder.all_researcher_involvements(&dataset.researchers)
        }
        ReportKind::YearlyBudget => builder.yearly_budget(&dashboard.yearly_budget(today.year())),
        ReportKind::ProjectStatus => builder.project_status(&dashboard.project_status()),
    }
}
