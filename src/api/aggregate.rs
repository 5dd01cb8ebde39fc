//! Result aggregation: multi-query merging and saved-playlist rankings

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::future::Future;

use crate::models::{CatalogItem, CategoryCount, PopularEntry, SavedRecord};

/// What happened to one query of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Query ran; `accepted` items made it into the result
    Fetched { query: String, accepted: usize },
    /// Query failed and was skipped
    Failed { query: String, reason: String },
    /// Not issued because the target was already reached
    Skipped { query: String },
}

/// Merged items plus a per-query account of how they were gathered.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub items: Vec<CatalogItem>,
    pub outcomes: Vec<QueryOutcome>,
}

impl MergeReport {
    pub fn failures(&self) -> impl Iterator<Item = &QueryOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, QueryOutcome::Failed { .. }))
    }
}

/// Run `queries` in order and merge their results into at most `target`
/// distinct items, keeping first-seen order.
///
/// Each query asks for `ceil(target / queries.len())` items. Failed queries
/// are recorded and skipped; if all fail the result is simply empty.
pub async fn merge_queries<Q, F, Fut, E>(queries: &[Q], target: usize, mut search: F) -> MergeReport
where
    Q: AsRef<str>,
    F: FnMut(String, usize) -> Fut,
    Fut: Future<Output = Result<Vec<CatalogItem>, E>>,
    E: Display,
{
    let mut report = MergeReport::default();
    if queries.is_empty() || target == 0 {
        return report;
    }

    let per_query = target.div_ceil(queries.len());
    let mut seen = HashSet::new();

    for query in queries {
        let query = query.as_ref().to_string();
        if report.items.len() >= target {
            report.outcomes.push(QueryOutcome::Skipped { query });
            continue;
        }

        match search(query.clone(), per_query).await {
            Ok(items) => {
                let before = report.items.len();
                for item in items {
                    if report.items.len() >= target {
                        break;
                    }
                    if seen.insert(item.id.clone()) {
                        report.items.push(item);
                    }
                }
                let accepted = report.items.len() - before;
                tracing::debug!("Query {:?} contributed {} items", query, accepted);
                report.outcomes.push(QueryOutcome::Fetched { query, accepted });
            }
            Err(e) => {
                tracing::warn!("Query {:?} failed, continuing: {}", query, e);
                report.outcomes.push(QueryOutcome::Failed {
                    query,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

/// Pick the record that best represents a group, scanning newest first:
/// category and image, then image, then category, then the newest.
fn representative<'a>(records: &[&'a SavedRecord]) -> Option<&'a SavedRecord> {
    records
        .iter()
        .find(|r| r.category().is_some() && r.has_image())
        .or_else(|| records.iter().find(|r| r.has_image()))
        .or_else(|| records.iter().find(|r| r.category().is_some()))
        .or_else(|| records.first())
        .copied()
}

/// Most frequent category in a group; ties go to the first encountered.
fn dominant_category<'a>(records: &[&'a SavedRecord]) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for category in records.iter().filter_map(|r| r.category()) {
        match counts.iter_mut().find(|(name, _)| *name == category) {
            Some(entry) => entry.1 += 1,
            None => counts.push((category, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best, (name, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((name, n)),
        })
        .map(|(name, _)| name)
}

/// Rank saved playlists by how many records reference them.
///
/// With `category`, only playlists saved at least once under that category
/// are ranked, but all of their records count. Ties go to the playlist saved
/// most recently.
pub fn rank_popular(
    records: &[SavedRecord],
    category: Option<&str>,
    limit: usize,
) -> Vec<PopularEntry> {
    let mut newest_first: Vec<&SavedRecord> = records.iter().collect();
    newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let candidates: Option<HashSet<&str>> = category.filter(|c| !c.is_empty()).map(|cat| {
        records
            .iter()
            .filter(|r| r.category() == Some(cat))
            .map(|r| r.catalog_item_id.as_str())
            .collect()
    });

    // Groups in order of their newest record
    let mut groups: Vec<(&str, Vec<&SavedRecord>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for record in newest_first {
        let id = record.catalog_item_id.as_str();
        if candidates.as_ref().is_some_and(|c| !c.contains(id)) {
            continue;
        }
        match index.get(id) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(id, groups.len());
                groups.push((id, vec![record]));
            }
        }
    }

    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    groups.truncate(limit);

    groups
        .into_iter()
        .filter_map(|(id, group)| {
            let best = representative(&group)?;
            Some(PopularEntry {
                catalog_item_id: id.to_string(),
                name: best.name.clone(),
                image_url: best.image_url.clone(),
                owner_name: best.owner_name.clone(),
                track_count: best.track_count,
                external_url: best.external_url.clone(),
                category: dominant_category(&group).map(String::from),
                save_count: group.len(),
            })
        })
        .collect()
}

/// Categories with the number of distinct saved playlists in each, most first.
pub fn category_counts(records: &[SavedRecord]) -> Vec<CategoryCount> {
    let mut by_category: Vec<(&str, HashSet<&str>)> = Vec::new();
    for record in records {
        let Some(category) = record.category() else {
            continue;
        };
        let id = record.catalog_item_id.as_str();
        match by_category.iter_mut().find(|(name, _)| *name == category) {
            Some((_, ids)) => {
                ids.insert(id);
            }
            None => by_category.push((category, HashSet::from([id]))),
        }
    }

    by_category.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    by_category
        .into_iter()
        .map(|(name, ids)| CategoryCount {
            name: name.to_string(),
            count: ids.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Owner, TrackSummary};
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::RefCell;

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            images: Vec::new(),
            owner: Owner::default(),
            tracks: TrackSummary::default(),
            external_url: None,
        }
    }

    fn ids(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn record(id: &str, category: Option<&str>, image: Option<&str>, secs: i64) -> SavedRecord {
        SavedRecord {
            id: format!("{}-{}", id, secs),
            user_id: format!("user-{}", secs),
            catalog_item_id: id.to_string(),
            name: format!("{} @ {}", id, secs),
            description: None,
            image_url: image.map(String::from),
            owner_name: None,
            track_count: 0,
            external_url: None,
            category: category.map(String::from),
            created_at: at(secs),
        }
    }

    #[tokio::test]
    async fn test_merge_dedupes_and_stops_at_target() {
        let calls = RefCell::new(Vec::new());
        let report = merge_queries(&["q1", "q2", "q3"], 3, |query, limit| {
            calls.borrow_mut().push((query.clone(), limit));
            let result: Result<Vec<CatalogItem>, String> = Ok(match query.as_str() {
                "q1" => vec![item("a"), item("b")],
                "q2" => vec![item("b"), item("c")],
                _ => vec![item("d")],
            });
            async move { result }
        })
        .await;

        assert_eq!(ids(&report.items), vec!["a", "b", "c"]);
        assert_eq!(
            *calls.borrow(),
            vec![("q1".to_string(), 1), ("q2".to_string(), 1)]
        );
        assert_eq!(
            report.outcomes[2],
            QueryOutcome::Skipped {
                query: "q3".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_merge_skips_failed_queries() {
        let report = merge_queries(&["bad", "good"], 4, |query, _| async move {
            if query == "bad" {
                Err("HTTP 500".to_string())
            } else {
                Ok(vec![item("x"), item("y")])
            }
        })
        .await;

        assert_eq!(ids(&report.items), vec!["x", "y"]);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            report.outcomes[0],
            QueryOutcome::Failed {
                query: "bad".to_string(),
                reason: "HTTP 500".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_merge_all_failures_is_empty() {
        let report = merge_queries(&["q1", "q2"], 5, |_, _| async {
            Err::<Vec<CatalogItem>, _>("down")
        })
        .await;

        assert!(report.items.is_empty());
        assert_eq!(report.failures().count(), 2);
    }

    #[tokio::test]
    async fn test_merge_per_query_limit_rounds_up() {
        let limits = RefCell::new(Vec::new());
        merge_queries(&["q1", "q2", "q3"], 20, |_, limit| {
            limits.borrow_mut().push(limit);
            async { Ok::<_, String>(Vec::new()) }
        })
        .await;
        assert_eq!(*limits.borrow(), vec![7, 7, 7]);
    }

    #[tokio::test]
    async fn test_merge_zero_target_issues_nothing() {
        let report = merge_queries(&["q1"], 0, |_, _| async {
            Err::<Vec<CatalogItem>, _>("should not run")
        })
        .await;
        assert!(report.items.is_empty());
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_representative_and_dominant_category() {
        let records = vec![
            record("X", Some("pop"), Some("https://img/y"), 3),
            record("X", Some("pop"), None, 2),
            record("X", None, None, 1),
        ];

        let ranked = rank_popular(&records, None, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "X @ 3");
        assert_eq!(ranked[0].image_url.as_deref(), Some("https://img/y"));
        assert_eq!(ranked[0].category.as_deref(), Some("pop"));
        assert_eq!(ranked[0].save_count, 3);
    }

    #[test]
    fn test_representative_priority_order() {
        // Newest has only a category; an older one has only an image
        let records = vec![
            record("X", Some("rock"), None, 5),
            record("X", None, Some("https://img/old"), 1),
            record("X", None, None, 9),
        ];
        let ranked = rank_popular(&records, None, 10);
        assert_eq!(ranked[0].name, "X @ 1");

        // Nothing has an image: first with a category
        let records = vec![record("Y", None, None, 9), record("Y", Some("jazz"), None, 1)];
        assert_eq!(rank_popular(&records, None, 10)[0].name, "Y @ 1");

        // Nothing at all: newest
        let records = vec![record("Z", None, None, 1), record("Z", None, None, 4)];
        assert_eq!(rank_popular(&records, None, 10)[0].name, "Z @ 4");
    }

    #[test]
    fn test_dominant_category_tie_goes_to_newest() {
        let records = vec![
            record("X", Some("rock"), None, 1),
            record("X", Some("pop"), None, 2),
        ];
        let ranked = rank_popular(&records, None, 10);
        assert_eq!(ranked[0].category.as_deref(), Some("pop"));
    }

    #[test]
    fn test_rank_orders_by_count_and_truncates() {
        let records = vec![
            record("A", None, None, 1),
            record("B", None, None, 2),
            record("B", None, None, 3),
            record("C", None, None, 4),
            record("C", None, None, 5),
            record("C", None, None, 6),
        ];
        let ranked = rank_popular(&records, None, 2);
        let order: Vec<(&str, usize)> = ranked
            .iter()
            .map(|e| (e.catalog_item_id.as_str(), e.save_count))
            .collect();
        assert_eq!(order, vec![("C", 3), ("B", 2)]);
    }

    #[test]
    fn test_rank_tie_goes_to_most_recent() {
        let records = vec![record("OLD", None, None, 1), record("NEW", None, None, 9)];
        let ranked = rank_popular(&records, None, 10);
        assert_eq!(ranked[0].catalog_item_id, "NEW");
        assert_eq!(ranked[1].catalog_item_id, "OLD");
    }

    #[test]
    fn test_category_filter_counts_all_records_of_candidates() {
        let records = vec![
            record("X", Some("pop"), None, 1),
            record("X", None, None, 2),
            record("X", Some("rock"), None, 3),
            record("Y", Some("rock"), None, 4),
        ];
        let ranked = rank_popular(&records, Some("pop"), 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].catalog_item_id, "X");
        assert_eq!(ranked[0].save_count, 3);

        assert!(rank_popular(&records, Some("metal"), 10).is_empty());
        assert_eq!(rank_popular(&records, Some(""), 10).len(), 2);
    }

    #[test]
    fn test_category_counts_distinct_ids() {
        let records = vec![
            record("X", Some("pop"), None, 1),
            record("X", Some("rock"), None, 2),
            record("X", Some("pop"), None, 3),
            record("Y", Some("pop"), None, 4),
            record("Z", None, None, 5),
        ];
        let counts = category_counts(&records);
        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    name: "pop".to_string(),
                    count: 2
                },
                CategoryCount {
                    name: "rock".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_empty_category_ignored() {
        let records = vec![record("X", Some(""), Some(""), 1)];
        assert!(category_counts(&records).is_empty());
        let ranked = rank_popular(&records, None, 10);
        assert!(ranked[0].category.is_none());
    }
}
