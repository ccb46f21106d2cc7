use serde_json::json;

use super::common::*;
use crate::registry::dashboard::views::{ActivityKind, ProgressCount};
use crate::registry::dashboard::{
    recent_activity, utilization_pct, Dashboard, ProgressBucket, ACTIVITY_LIMIT,
};
use crate::registry::domain::{CentreId, Research, ResearchStatus};
use crate::registry::repository::default_centres;
use crate::registry::snapshot::Dataset;

fn with_research(research: Vec<Research>) -> Dataset {
    Dataset {
        research,
        academic_centres: default_centres(),
        ..Dataset::default()
    }
}

fn budgeted(id: &str, centre: &str, entries: serde_json::Value) -> Research {
    parse(json!({
        "id": id,
        "title": id,
        "centreId": centre,
        "budget": 1000,
        "spending": 250,
        "status": "Active-Ongoing (From Past Years)",
        "yearlyProgress": entries,
        "createdAt": "2024-01-01T00:00:00Z"
    }))
}

#[test]
fn progress_boundaries_fall_into_lower_bucket() {
    let dataset = with_research(vec![
        research("r0", "centre-rmu", "Completed", 0.0),
        research("r25", "centre-rmu", "Completed", 25.0),
        research("r26", "centre-rmu", "Completed", 26.0),
        research("r100", "centre-rmu", "Completed", 100.0),
    ]);
    let dashboard = Dashboard::from_dataset(&dataset, ymd(2025, 1, 1));

    let counts: Vec<(ProgressBucket, usize)> = dashboard
        .progress_distribution()
        .into_iter()
        .map(|ProgressCount { bucket, count }| (bucket, count))
        .collect();

    assert_eq!(
        counts,
        vec![
            (ProgressBucket::UpToQuarter, 2),
            (ProgressBucket::UpToHalf, 1),
            (ProgressBucket::UpToThreeQuarters, 0),
            (ProgressBucket::Final, 1),
        ]
    );
}

#[test]
fn unknown_status_is_left_out_of_status_rollups() {
    let dataset = with_research(vec![
        research("r1", "centre-rmu", "Completed", 100.0),
        research("r2", "centre-rmu", "Archived", 10.0),
        research("r3", "centre-apak", "Active-Ongoing (New)", 10.0),
    ]);
    let dashboard = Dashboard::from_dataset(&dataset, ymd(2025, 1, 1));

    let distribution = dashboard.status_distribution();
    assert_eq!(distribution.len(), 4);
    assert_eq!(distribution.iter().map(|entry| entry.count).sum::<usize>(), 2);

    let matrix = dashboard.project_status();
    assert_eq!(matrix.grand_total, 2);
    assert_eq!(matrix.totals.get(ResearchStatus::Completed), 1);
    let rmu = matrix
        .rows
        .iter()
        .find(|row| row.centre_id == CentreId::from("centre-rmu"))
        .expect("rmu row");
    assert_eq!(rmu.total, 1);
}

#[test]
fn zero_budget_means_zero_utilization() {
    assert_eq!(utilization_pct(500.0, 0.0), 0.0);
    assert_eq!(utilization_pct(50.0, 200.0), 25.0);
}

#[test]
fn yearly_budget_sums_entries_for_the_year_only() {
    let dataset = with_research(vec![
        budgeted(
            "b1",
            "centre-emas",
            json!([
                {"year": 2025, "budgetLimit": 4000, "budgetSpent": 1000},
                {"year": 2024, "budgetLimit": 9000, "budgetSpent": 9000}
            ]),
        ),
        budgeted(
            "b2",
            "centre-emas",
            json!([{"year": 2025, "budgetLimit": 1000, "budgetSpent": 1500}]),
        ),
        budgeted("b3", "centre-kias", json!([{"year": 2025, "budgetLimit": 0}])),
    ]);
    let dashboard = Dashboard::from_dataset(&dataset, ymd(2025, 6, 1));

    let summary = dashboard.current_year_budget();
    assert_eq!(summary.year, 2025);
    assert_eq!(summary.centres.len(), 1);
    assert_eq!(summary.centres[0].abbreviation, "EMAS");
    assert_eq!(summary.total_budget, 5000.0);
    assert_eq!(summary.total_spending, 2500.0);
    assert_eq!(summary.total_utilization, 50.0);
}

#[test]
fn financials_list_years_newest_first() {
    let dataset = with_research(vec![budgeted(
        "b1",
        "centre-emas",
        json!([
            {"year": 2023, "budgetLimit": 100, "budgetSpent": 50},
            {"year": 2025, "budgetLimit": 300, "budgetSpent": 30},
            {"year": 2024, "budgetLimit": 0, "budgetSpent": 0}
        ]),
    )]);
    let dashboard = Dashboard::from_dataset(&dataset, ymd(2025, 6, 1));

    let financials = dashboard.financials_by_centre();
    assert_eq!(financials.len(), 1);
    let years: Vec<i32> = financials[0].yearly.iter().map(|year| year.year).collect();
    assert_eq!(years, vec![2025, 2023]);
    assert_eq!(financials[0].utilization, 25.0);
}

#[test]
fn recent_activity_merges_newest_first_and_caps_feed() {
    let research: Vec<Research> = [
        "2025-01-01T00:00:00Z",
        "2025-03-01T00:00:00Z",
        "2025-02-01T00:00:00Z",
        "2025-05-01T00:00:00Z",
    ]
    .into_iter()
    .enumerate()
    .map(|(index, stamp)| research_at(&format!("r{index}"), stamp))
    .collect();
    let mut collaborations = Vec::new();
    for (index, stamp) in [
        "2025-04-01T00:00:00Z",
        "2024-12-01T00:00:00Z",
        "2025-06-01T00:00:00Z",
    ]
    .into_iter()
    .enumerate()
    {
        let mut item = collaboration(&format!("c{index}"), "2030-01-01", &[]);
        item.created_at = at(stamp);
        collaborations.push(item);
    }

    let feed = recent_activity(&research, &collaborations, &default_centres());

    assert_eq!(feed.len(), ACTIVITY_LIMIT);
    assert!(feed
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
    assert_eq!(feed[0].kind, ActivityKind::Collaboration);
    assert_eq!(feed[0].subtitle, "MoA");
    assert_eq!(
        feed.iter()
            .filter(|entry| entry.kind == ActivityKind::Research)
            .count(),
        3
    );
    assert!(feed.iter().all(|entry| entry.title != "Study r0"));
}

#[test]
fn activity_subtitle_falls_back_for_unknown_centre() {
    let mut orphan = research_at("orphan", "2025-01-01T00:00:00Z");
    orphan.centre_id = CentreId::from("centre-gone");

    let feed = recent_activity(&[orphan], &[], &default_centres());
    assert_eq!(feed[0].subtitle, "N/A");
}

#[test]
fn snapshot_headline_counts() {
    let dataset = sample_dataset();
    let snapshot = Dashboard::from_dataset(&dataset, ymd(2025, 1, 1)).snapshot();

    assert_eq!(snapshot.total_research, 2);
    assert_eq!(snapshot.ongoing_research, 1);
    assert_eq!(snapshot.active_collaborations, 1);
    assert_eq!(snapshot.principal_investigators, 1);
    assert_eq!(snapshot.research_by_centre.len(), 2);
    assert_eq!(snapshot.recent_activity.len(), 3);
}

fn research_at(id: &str, created_at: &str) -> Research {
    let mut item = research(id, "centre-rmu", "Completed", 100.0);
    item.created_at = at(created_at);
    item
}
