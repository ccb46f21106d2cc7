//! Collaboration lifecycle derivation.
//!
//! A collaboration never stores its status. It is recomputed from the primary end date
//! and the extension dates every time it is shown, counted, or exported.

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Collaboration, CollaborationStatus};

/// Latest of the primary end date and all extension dates.
pub fn effective_end_date(
    end_date: Option<NaiveDate>,
    extension_periods: &[NaiveDate],
) -> Option<NaiveDate> {
    end_date
        .into_iter()
        .chain(extension_periods.iter().copied())
        .max()
}

/// Derive the status labels for a collaboration as of `today`.
///
/// The result is never empty. Without any usable date the collaboration is `Expired`.
/// Any extension date marks the collaboration `Extended` while it is active, even one
/// that falls before the primary end date and so never moves the effective end.
pub fn derive_status(
    end_date: Option<NaiveDate>,
    extension_periods: &[NaiveDate],
    today: NaiveDate,
) -> Vec<CollaborationStatus> {
    let Some(latest) = effective_end_date(end_date, extension_periods) else {
        return vec![CollaborationStatus::Expired];
    };

    if latest < today {
        return vec![CollaborationStatus::Expired];
    }

    if extension_periods.is_empty() {
        vec![CollaborationStatus::Active]
    } else {
        vec![CollaborationStatus::Active, CollaborationStatus::Extended]
    }
}

impl Collaboration {
    pub fn status(&self, today: NaiveDate) -> Vec<CollaborationStatus> {
        derive_status(self.end_date, &self.extension_periods, today)
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        !self.status(today).contains(&CollaborationStatus::Expired)
    }

    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        effective_end_date(self.end_date, &self.extension_periods)
    }

    pub fn view(&self, today: NaiveDate) -> CollaborationView {
        CollaborationView {
            collaboration: self.clone(),
            status: self.status(today),
            effective_end_date: self.effective_end_date(),
        }
    }
}

/// Collaboration as returned by the API, with the derived fields attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationView {
    #[serde(flatten)]
    pub collaboration: Collaboration,
    pub status: Vec<CollaborationStatus>,
    pub effective_end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use CollaborationStatus::{Active, Expired, Extended};

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn past_end_without_extensions_is_expired() {
        let status = derive_status(Some(ymd(2020, 1, 1)), &[], ymd(2024, 1, 1));
        assert_eq!(status, vec![Expired]);
    }

    #[test]
    fn future_end_with_extension_is_active_and_extended() {
        let status = derive_status(Some(ymd(2030, 1, 1)), &[ymd(2031, 1, 1)], ymd(2024, 1, 1));
        assert_eq!(status, vec![Active, Extended]);
    }

    #[test]
    fn future_end_without_extensions_is_active() {
        let status = derive_status(Some(ymd(2030, 1, 1)), &[], ymd(2024, 1, 1));
        assert_eq!(status, vec![Active]);
    }

    #[test]
    fn ending_today_is_still_active() {
        let today = ymd(2024, 6, 30);
        assert_eq!(derive_status(Some(today), &[], today), vec![Active]);
    }

    #[test]
    fn extension_revives_an_elapsed_end_date() {
        let status = derive_status(Some(ymd(2020, 1, 1)), &[ymd(2026, 1, 1)], ymd(2024, 1, 1));
        assert_eq!(status, vec![Active, Extended]);
    }

    #[test]
    fn extension_before_end_date_still_marks_extended() {
        // Preserved quirk: the earlier extension does not move the end date but still
        // yields the Extended label.
        let end = ymd(2030, 1, 1);
        let earlier = ymd(2025, 1, 1);
        let status = derive_status(Some(end), &[earlier], ymd(2024, 1, 1));
        assert_eq!(status, vec![Active, Extended]);
        assert_eq!(effective_end_date(Some(end), &[earlier]), Some(end));
    }

    #[test]
    fn all_dates_elapsed_is_expired_even_with_extensions() {
        let status = derive_status(Some(ymd(2020, 1, 1)), &[ymd(2021, 1, 1)], ymd(2024, 1, 1));
        assert_eq!(status, vec![Expired]);
    }

    #[test]
    fn no_usable_dates_degrades_to_expired() {
        assert_eq!(derive_status(None, &[], ymd(2024, 1, 1)), vec![Expired]);
    }

    #[test]
    fn extension_alone_is_enough_without_primary_end() {
        let status = derive_status(None, &[ymd(2030, 1, 1)], ymd(2024, 1, 1));
        assert_eq!(status, vec![Active, Extended]);
    }
}
