//! Create payloads and partial-update patches for each registry collection.
//!
//! Drafts carry every user-supplied field of a new record; the service assigns ids and
//! audit stamps. Patches carry only the fields a client sent.

use chrono::NaiveDate;
use serde::Deserialize;

use super::dates::{lenient_date, lenient_date_list};
use super::domain::{
    AcademicCentre, CentreId, Collaboration, CollaborationType, Document, Involvement, Research,
    ResearchStatus, Researcher, YearlyProgress,
};

pub const MIN_PLAUSIBLE_YEAR: i32 = 1900;
pub const MAX_PLAUSIBLE_YEAR: i32 = 9999;

/// Field-level rejection of a draft or patch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("progress must be between 0 and 100 (found {0})")]
    ProgressOutOfRange(f64),
    #[error("{field} must not be negative (found {value})")]
    NegativeAmount { field: &'static str, value: f64 },
    #[error("yearly progress year {0} is out of range")]
    ImplausibleYear(i32),
    #[error("status must be one of the known research statuses")]
    UnknownStatus,
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

fn require_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::NegativeAmount { field, value });
    }
    Ok(())
}

fn require_progress(value: f64) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::ProgressOutOfRange(value));
    }
    Ok(())
}

fn require_known_status(status: ResearchStatus) -> Result<(), ValidationError> {
    if status == ResearchStatus::Unknown {
        return Err(ValidationError::UnknownStatus);
    }
    Ok(())
}

fn require_yearly(entries: &[YearlyProgress]) -> Result<(), ValidationError> {
    for entry in entries {
        if !(MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&entry.year) {
            return Err(ValidationError::ImplausibleYear(entry.year));
        }
        require_progress(entry.progress)?;
        require_amount("budgetLimit", entry.budget_limit)?;
        require_amount("budgetSpent", entry.budget_spent)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub centre_id: CentreId,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date_list")]
    pub extension_periods: Vec<NaiveDate>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub spending: f64,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub status: ResearchStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub yearly_progress: Vec<YearlyProgress>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl ResearchDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_amount("budget", self.budget)?;
        require_amount("spending", self.spending)?;
        require_progress(self.progress)?;
        require_yearly(&self.yearly_progress)?;
        require_known_status(self.status)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub centre_id: Option<CentreId>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date_list")]
    pub extension_periods: Option<Vec<NaiveDate>>,
    pub budget: Option<f64>,
    pub spending: Option<f64>,
    pub team: Option<Vec<String>>,
    pub status: Option<ResearchStatus>,
    pub progress: Option<f64>,
    pub yearly_progress: Option<Vec<YearlyProgress>>,
    pub documents: Option<Vec<Document>>,
}

impl ResearchPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(budget) = self.budget {
            require_amount("budget", budget)?;
        }
        if let Some(spending) = self.spending {
            require_amount("spending", spending)?;
        }
        if let Some(progress) = self.progress {
            require_progress(progress)?;
        }
        if let Some(entries) = &self.yearly_progress {
            require_yearly(entries)?;
        }
        if let Some(status) = self.status {
            require_known_status(status)?;
        }
        Ok(())
    }

    pub fn apply(self, research: &mut Research) {
        if let Some(title) = self.title {
            research.title = title;
        }
        if let Some(description) = self.description {
            research.description = description;
        }
        if let Some(centre_id) = self.centre_id {
            research.centre_id = centre_id;
        }
        if self.start_date.is_some() {
            research.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            research.end_date = self.end_date;
        }
        if let Some(extensions) = self.extension_periods {
            research.extension_periods = extensions;
        }
        if let Some(budget) = self.budget {
            research.budget = budget;
        }
        if let Some(spending) = self.spending {
            research.spending = spending;
        }
        if let Some(team) = self.team {
            research.team = team;
        }
        if let Some(status) = self.status {
            research.status = status;
        }
        if let Some(progress) = self.progress {
            research.progress = progress;
        }
        if let Some(entries) = self.yearly_progress {
            research.yearly_progress = entries;
        }
        if let Some(documents) = self.documents {
            research.documents = documents;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationDraft {
    pub organization: String,
    #[serde(rename = "type")]
    pub kind: CollaborationType,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date_list")]
    pub extension_periods: Vec<NaiveDate>,
    pub centre_id: CentreId,
}

impl CollaborationDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("organization", &self.organization)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationPatch {
    pub organization: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<CollaborationType>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date_list")]
    pub extension_periods: Option<Vec<NaiveDate>>,
    pub centre_id: Option<CentreId>,
}

impl CollaborationPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.organization {
            Some(organization) => require_text("organization", organization),
            None => Ok(()),
        }
    }

    pub fn apply(self, collaboration: &mut Collaboration) {
        if let Some(organization) = self.organization {
            collaboration.organization = organization;
        }
        if let Some(kind) = self.kind {
            collaboration.kind = kind;
        }
        if self.start_date.is_some() {
            collaboration.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            collaboration.end_date = self.end_date;
        }
        if let Some(extensions) = self.extension_periods {
            collaboration.extension_periods = extensions;
        }
        if let Some(centre_id) = self.centre_id {
            collaboration.centre_id = centre_id;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CentreDraft {
    pub name: String,
    #[serde(rename = "abbr", alias = "abbreviation")]
    pub abbreviation: String,
}

impl CentreDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("abbr", &self.abbreviation)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CentrePatch {
    pub name: Option<String>,
    #[serde(rename = "abbr", alias = "abbreviation")]
    pub abbreviation: Option<String>,
}

impl CentrePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(abbreviation) = &self.abbreviation {
            require_text("abbr", abbreviation)?;
        }
        Ok(())
    }

    pub fn apply(self, centre: &mut AcademicCentre) {
        if let Some(name) = self.name {
            centre.name = name;
        }
        if let Some(abbreviation) = self.abbreviation {
            centre.abbreviation = abbreviation;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherDraft {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub centre_id: CentreId,
    #[serde(default)]
    pub involvements: Vec<Involvement>,
}

impl ResearcherDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub centre_id: Option<CentreId>,
    pub involvements: Option<Vec<Involvement>>,
}

impl ResearcherPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => require_text("name", name),
            None => Ok(()),
        }
    }

    pub fn apply(self, researcher: &mut Researcher) {
        if let Some(name) = self.name {
            researcher.name = name;
        }
        if let Some(email) = self.email {
            researcher.email = email;
        }
        if let Some(centre_id) = self.centre_id {
            researcher.centre_id = centre_id;
        }
        if let Some(involvements) = self.involvements {
            researcher.involvements = involvements;
        }
    }
}

fn optional_date_list<'de, D>(deserializer: D) -> Result<Option<Vec<NaiveDate>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient_date_list(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn research_draft_rejects_out_of_range_progress() {
        let draft: ResearchDraft = serde_json::from_value(json!({
            "title": "Waqf governance",
            "centreId": "centre-emas",
            "progress": 120
        }))
        .expect("draft parses");

        assert_eq!(
            draft.validate(),
            Err(ValidationError::ProgressOutOfRange(120.0))
        );
    }

    #[test]
    fn research_draft_rejects_blank_title_and_negative_budget() {
        let mut draft: ResearchDraft = serde_json::from_value(json!({
            "title": "   ",
            "centreId": "centre-emas"
        }))
        .expect("draft parses");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyField("title")));

        draft.title = "Valid".to_string();
        draft.budget = -1.0;
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::NegativeAmount { field: "budget", .. })
        ));
    }

    #[test]
    fn yearly_progress_year_must_be_plausible() {
        let draft: ResearchDraft = serde_json::from_value(json!({
            "title": "Study",
            "centreId": "centre-kias",
            "yearlyProgress": [{"year": 24, "progress": 10, "budgetLimit": 0, "budgetSpent": 0}]
        }))
        .expect("draft parses");

        assert_eq!(draft.validate(), Err(ValidationError::ImplausibleYear(24)));
    }

    #[test]
    fn patch_touches_only_supplied_fields() {
        let patch: ResearchPatch = serde_json::from_value(json!({
            "progress": 40,
            "extensionPeriods": ["2026-01-01", ""]
        }))
        .expect("patch parses");
        assert!(patch.validate().is_ok());

        let mut research: Research = serde_json::from_value(json!({
            "id": "res-000001",
            "title": "Original",
            "centreId": "centre-rmu",
            "budget": 5000,
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .expect("research parses");

        patch.apply(&mut research);
        assert_eq!(research.title, "Original");
        assert_eq!(research.budget, 5000.0);
        assert_eq!(research.progress, 40.0);
        assert_eq!(research.extension_periods.len(), 1);
    }

    #[test]
    fn centre_draft_accepts_either_abbreviation_key() {
        let draft: CentreDraft =
            serde_json::from_value(json!({"name": "Unit", "abbreviation": "U"}))
                .expect("draft parses");
        assert_eq!(draft.abbreviation, "U");
        assert!(draft.validate().is_ok());
    }
}
