use std::borrow::Cow;

/// Lookup of display labels by translation key.
///
/// Report builders only ever pass keys; implementations decide the language.
/// Unknown keys should come back unchanged so a gap is visible instead of blank.
pub trait Translator: Send + Sync {
    fn translate<'a>(&'a self, key: &'a str) -> Cow<'a, str>;
}

/// Built-in English labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLabels;

const ENGLISH: &[(&str, &str)] = &[
    ("common.na", "N/A"),
    ("common.unknown", "Unknown"),
    ("report.researchReport", "Research Report"),
    ("report.fullResearchReport", "Full Research Report"),
    ("report.individualResearchReport", "Individual Research Report"),
    ("report.collaborationsReport", "Collaborations Report"),
    ("report.researchersSummaryReport", "Researchers Summary Report"),
    ("report.fullResearchersReport", "Researcher Involvements Report"),
    ("report.yearlyBudgetSummaryReport", "Yearly Budget Summary"),
    ("report.projectStatusSummaryReport", "Project Status Summary"),
    ("report.summary", "Summary"),
    ("report.details", "Details"),
    ("report.financials", "Financials"),
    ("report.yearlyProgressBudget", "Yearly Progress & Budget"),
    ("report.title", "Title"),
    ("report.centre", "Centre"),
    ("report.status", "Status"),
    ("report.period", "Period"),
    ("report.start", "Start Date"),
    ("report.end", "End Date"),
    ("report.budget", "Budget"),
    ("report.spending", "Spending"),
    ("report.progress", "Progress"),
    ("report.metric", "Metric"),
    ("report.value", "Value"),
    ("report.totalProjects", "Total Projects"),
    ("report.ongoing", "Ongoing"),
    ("report.completed", "Completed"),
    ("report.totalBudget", "Total Budget"),
    ("report.totalSpending", "Total Spending"),
    ("report.financialItem", "Financial Item"),
    ("report.amount", "Amount"),
    ("report.overallBudget", "Overall Budget"),
    ("report.overallSpending", "Overall Spending"),
    ("report.remainingOverall", "Remaining (Overall)"),
    ("report.year", "Year"),
    ("report.budgetLimit", "Budget Limit"),
    ("report.budgetSpent", "Budget Spent"),
    ("report.notes", "Notes"),
    ("report.researchTeam", "Research Team"),
    ("report.organization", "Organization"),
    ("report.type", "Type"),
    ("report.name", "Name"),
    ("report.email", "Email"),
    ("report.total", "Total"),
    ("report.pi", "PI"),
    ("report.secretary", "Secretary"),
    ("report.member", "Member"),
    ("report.projectTitle", "Project Title"),
    ("report.role", "Role"),
    ("report.internal", "Internal"),
    ("report.external", "External"),
    ("report.unknownResearch", "unknown research"),
    ("report.noInvolvements", "No involvements recorded"),
    ("report.yearlyBudgetLimit", "Yearly Budget Limit (RM)"),
    ("report.yearlySpending", "Yearly Spending (RM)"),
    ("report.spentPercent", "Spent %"),
    ("report.activeNew", "Active (New)"),
    ("report.activePast", "Active (Past Years)"),
    ("report.unregistered", "Unregistered"),
];

impl Translator for EnglishLabels {
    fn translate<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        if let Some((_, label)) = ENGLISH.iter().find(|(candidate, _)| *candidate == key) {
            return Cow::Borrowed(label);
        }

        // Status and role keys embed their English label after the namespace.
        for namespace in ["statuses.", "roles."] {
            if let Some(label) = key.strip_prefix(namespace) {
                return Cow::Borrowed(label);
            }
        }

        Cow::Borrowed(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::domain::{CollaborationStatus, ResearchRole, ResearchStatus};

    #[test]
    fn english_labels_resolve_enum_keys_to_their_names() {
        let labels = EnglishLabels;
        assert_eq!(
            labels.translate(ResearchStatus::OngoingPast.translation_key()),
            "Active-Ongoing (From Past Years)"
        );
        assert_eq!(
            labels.translate(CollaborationStatus::Extended.translation_key()),
            "Extended"
        );
        assert_eq!(
            labels.translate(ResearchRole::ResearchSecretary.translation_key()),
            "Research Secretary"
        );
    }

    #[test]
    fn unknown_keys_fall_through_unchanged() {
        assert_eq!(EnglishLabels.translate("report.nope"), "report.nope");
        assert_eq!(EnglishLabels.translate("common.na"), "N/A");
    }
}
