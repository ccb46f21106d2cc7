use std::cmp::Reverse;

use super::super::domain::{centre_abbreviation, AcademicCentre, Collaboration, Research};
use super::views::{ActivityEntry, ActivityKind};

const RECENT_RESEARCH: usize = 3;
const RECENT_COLLABORATIONS: usize = 2;
pub const ACTIVITY_LIMIT: usize = 5;

/// Newest research and collaboration records merged into one feed, newest first.
pub fn recent_activity(
    research: &[Research],
    collaborations: &[Collaboration],
    centres: &[AcademicCentre],
) -> Vec<ActivityEntry> {
    let mut newest_research: Vec<&Research> = research.iter().collect();
    newest_research.sort_by_key(|item| Reverse(item.created_at));

    let mut newest_collaborations: Vec<&Collaboration> = collaborations.iter().collect();
    newest_collaborations.sort_by_key(|item| Reverse(item.created_at));

    let mut feed: Vec<ActivityEntry> = newest_research
        .into_iter()
        .take(RECENT_RESEARCH)
        .map(|item| ActivityEntry {
            kind: ActivityKind::Research,
            title: item.title.clone(),
            subtitle: centre_abbreviation(centres, &item.centre_id).to_string(),
            created_at: item.created_at,
        })
        .chain(
            newest_collaborations
                .into_iter()
                .take(RECENT_COLLABORATIONS)
                .map(|item| ActivityEntry {
                    kind: ActivityKind::Collaboration,
                    title: item.organization.clone(),
                    subtitle: item.kind.label().to_string(),
                    created_at: item.created_at,
                }),
        )
        .collect();

    feed.sort_by_key(|entry| Reverse(entry.created_at));
    feed.truncate(ACTIVITY_LIMIT);
    feed
}
