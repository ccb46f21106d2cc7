use chrono::Datelike;
use serde::Deserialize;

use super::domain::{CentreId, Research, ResearchRole, ResearchStatus, Researcher};

/// Optional constraints on the research listing; absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFilter {
    pub status: Option<ResearchStatus>,
    pub centre_id: Option<CentreId>,
    pub start_year: Option<i32>,
    /// Matches only completed research whose end date falls in this year.
    pub completion_year: Option<i32>,
}

impl ResearchFilter {
    pub fn matches(&self, research: &Research) -> bool {
        if let Some(status) = self.status {
            if research.status != status {
                return false;
            }
        }

        if let Some(centre_id) = &self.centre_id {
            if &research.centre_id != centre_id {
                return false;
            }
        }

        if let Some(year) = self.start_year {
            if research.start_date.map(|date| date.year()) != Some(year) {
                return false;
            }
        }

        if let Some(year) = self.completion_year {
            let completed_that_year = research.status == ResearchStatus::Completed
                && research.end_date.map(|date| date.year()) == Some(year);
            if !completed_that_year {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherFilter {
    /// Case-insensitive substring over name and email.
    pub search: Option<String>,
    pub role: Option<ResearchRole>,
    pub centre_id: Option<CentreId>,
}

impl ResearcherFilter {
    pub fn matches(&self, researcher: &Researcher) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim) {
            if !term.is_empty() {
                let needle = term.to_lowercase();
                let hit = researcher.name.to_lowercase().contains(&needle)
                    || researcher.email.to_lowercase().contains(&needle);
                if !hit {
                    return false;
                }
            }
        }

        if let Some(role) = self.role {
            if !researcher.has_role(role) {
                return false;
            }
        }

        match &self.centre_id {
            Some(centre_id) => &researcher.centre_id == centre_id,
            None => true,
        }
    }
}

/// Distinct start years across all research, newest first.
pub fn start_year_options(research: &[Research]) -> Vec<i32> {
    descending_unique(research.iter().filter_map(|item| item.start_date).map(|d| d.year()))
}

/// Distinct end-date years of completed research, newest first.
pub fn completion_year_options(research: &[Research]) -> Vec<i32> {
    descending_unique(
        research
            .iter()
            .filter(|item| item.status == ResearchStatus::Completed)
            .filter_map(|item| item.end_date)
            .map(|d| d.year()),
    )
}

fn descending_unique(years: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut years: Vec<i32> = years.collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn research(id: &str, status: &str, start: &str, end: &str) -> Research {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("Project {id}"),
            "centreId": "centre-emas",
            "startDate": start,
            "endDate": end,
            "status": status,
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .expect("research parses")
    }

    #[test]
    fn completion_year_only_matches_completed_research() {
        let filter = ResearchFilter {
            completion_year: Some(2023),
            ..ResearchFilter::default()
        };

        assert!(filter.matches(&research("a", "Completed", "2021-01-01", "2023-06-01")));
        assert!(!filter.matches(&research(
            "b",
            "Active-Ongoing (New)",
            "2021-01-01",
            "2023-06-01"
        )));
    }

    #[test]
    fn year_options_are_distinct_and_descending() {
        let items = vec![
            research("a", "Completed", "2021-01-01", "2022-06-01"),
            research("b", "Unregistered", "2023-03-01", "2025-01-01"),
            research("c", "Completed", "2021-05-01", "2024-02-01"),
        ];

        assert_eq!(start_year_options(&items), vec![2023, 2021]);
        assert_eq!(completion_year_options(&items), vec![2024, 2022]);
    }

    #[test]
    fn researcher_search_is_case_insensitive_over_name_and_email() {
        let researcher: Researcher = serde_json::from_value(json!({
            "id": "rsr-000001",
            "name": "Aminah Yusof",
            "email": "aminah@ikim.example",
            "centreId": "centre-kias",
            "involvements": [{"type": "internal", "researchId": "res-1", "role": "Research Member"}],
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .expect("researcher parses");

        let by_email = ResearcherFilter {
            search: Some("IKIM.EXAMPLE".to_string()),
            ..ResearcherFilter::default()
        };
        assert!(by_email.matches(&researcher));

        let wrong_role = ResearcherFilter {
            role: Some(ResearchRole::PrincipalInvestigator),
            ..ResearcherFilter::default()
        };
        assert!(!wrong_role.matches(&researcher));
    }
}
