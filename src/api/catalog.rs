//! Browse categories and search-backed playlist listings
//!
//! The provider's browse API is not used; each genre maps to a search query.

use super::aggregate::{merge_queries, MergeReport};
use super::client::{ProviderClient, ProviderError};
use crate::models::{CatalogItem, Category};

/// Fixed genre list with the search query used for each.
const GENRES: &[(Category, &str)] = &[
    (Category { id: "pop", name: "Pop" }, "pop hits playlist"),
    (Category { id: "hiphop", name: "Hip Hop" }, "hip hop rap playlist"),
    (Category { id: "rock", name: "Rock" }, "rock playlist"),
    (Category { id: "rnb", name: "R&B" }, "r&b soul playlist"),
    (Category { id: "electronic", name: "Elektronik" }, "electronic dance EDM playlist"),
    (Category { id: "jazz", name: "Jazz" }, "jazz playlist"),
    (Category { id: "classical", name: "Klasik Müzik" }, "classical music playlist"),
    (Category { id: "turkish-pop", name: "Türkçe Pop" }, "türkçe pop playlist"),
    (Category { id: "turkish-rap", name: "Türkçe Rap" }, "türkçe rap playlist"),
    (Category { id: "arabesk", name: "Arabesk" }, "arabesk türkü playlist"),
    (Category { id: "latin", name: "Latin" }, "latin reggaeton playlist"),
    (Category { id: "indie", name: "Indie" }, "indie alternative playlist"),
    (Category { id: "metal", name: "Metal" }, "metal heavy playlist"),
    (Category { id: "chill", name: "Chill" }, "chill lofi relax playlist"),
    (Category { id: "workout", name: "Workout" }, "workout gym motivation playlist"),
    (Category { id: "party", name: "Parti" }, "party dance hits playlist"),
    (Category { id: "sleep", name: "Uyku" }, "sleep calm ambient playlist"),
    (Category { id: "focus", name: "Odaklanma" }, "focus study concentration playlist"),
    (Category { id: "romance", name: "Romantik" }, "romantic love songs playlist"),
    (Category { id: "kpop", name: "K-Pop" }, "k-pop korean playlist"),
];

/// First `limit` browse categories.
pub fn categories(limit: usize) -> Vec<Category> {
    GENRES
        .iter()
        .take(limit)
        .map(|(category, _)| category.clone())
        .collect()
}

/// Search query for a category id; unknown ids search for `"{id} playlist"`.
pub fn search_query_for(category_id: &str) -> String {
    GENRES
        .iter()
        .find(|(category, _)| category.id == category_id)
        .map(|(_, query)| query.to_string())
        .unwrap_or_else(|| format!("{} playlist", category_id))
}

/// Playlists for a browse category.
pub async fn category_playlists(
    client: &ProviderClient,
    category_id: &str,
    limit: usize,
) -> Result<Vec<CatalogItem>, ProviderError> {
    let query = search_query_for(category_id);
    tracing::debug!("Category {} -> {:?}", category_id, query);
    client.search(&query, limit).await
}

/// Featured playlists merged from several searches.
pub async fn featured_playlists(
    client: &ProviderClient,
    queries: &[String],
    limit: usize,
) -> MergeReport {
    merge_queries(queries, limit, move |query, per_query| async move {
        client.search(&query, per_query).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_limit() {
        assert_eq!(categories(3).len(), 3);
        assert_eq!(categories(100).len(), 20);
        assert_eq!(categories(1)[0].id, "pop");
    }

    #[test]
    fn test_search_query_mapping() {
        assert_eq!(search_query_for("turkish-rap"), "türkçe rap playlist");
        assert_eq!(search_query_for("polka"), "polka playlist");
    }
}
