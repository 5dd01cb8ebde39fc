//! Saved playlists and the popularity leaderboard

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::aggregate::{category_counts, rank_popular};
use super::{print_json, Context};
use crate::models::{CategoryCount, PopularEntry, SaveAction, SavedRecord};

#[derive(Serialize)]
struct SaveOutcome<'a> {
    action: SaveAction,
    catalog_item_id: &'a str,
    name: &'a str,
}

/// Leaderboard plus the per-category counts.
#[derive(Debug, Serialize)]
struct PopularReport {
    playlists: Vec<PopularEntry>,
    categories: Vec<CategoryCount>,
}

impl PopularReport {
    fn build(records: &[SavedRecord], category: Option<&str>, limit: usize) -> Self {
        Self {
            playlists: rank_popular(records, category, limit),
            categories: category_counts(records),
        }
    }
}

fn print_outcome(ctx: &Context, outcome: &SaveOutcome) -> Result<()> {
    if ctx.json {
        return print_json(outcome);
    }
    match outcome.action {
        SaveAction::Saved => println!("Saved \"{}\".", outcome.name),
        SaveAction::Removed => println!("Removed \"{}\".", outcome.name),
    }
    Ok(())
}

/// Save a playlist for a user, or remove it if already saved.
///
/// Removal works from the stored record alone, so a playlist the provider
/// no longer serves can still be unsaved.
pub async fn toggle_save(
    ctx: &Context,
    user_id: &str,
    playlist_id: &str,
    category: Option<String>,
) -> Result<SaveAction> {
    let removed = ctx
        .store
        .remove_saved(user_id, playlist_id)
        .context("Failed to update saved playlists")?;
    if let Some(record) = removed {
        print_outcome(
            ctx,
            &SaveOutcome {
                action: SaveAction::Removed,
                catalog_item_id: &record.catalog_item_id,
                name: &record.name,
            },
        )?;
        return Ok(SaveAction::Removed);
    }

    let client = ctx.client_for(Some(user_id)).await;
    let playlist = client
        .get_by_id(playlist_id)
        .await
        .with_context(|| format!("Failed to load playlist {}", playlist_id))?;

    ctx.store
        .save(user_id, &playlist, category)
        .context("Failed to update saved playlists")?;

    print_outcome(
        ctx,
        &SaveOutcome {
            action: SaveAction::Saved,
            catalog_item_id: &playlist.id,
            name: &playlist.name,
        },
    )?;
    Ok(SaveAction::Saved)
}

pub fn popular(ctx: &Context, category: Option<&str>, limit: usize) -> Result<()> {
    let records = ctx.store.saved_records();
    let report = PopularReport::build(&records, category, limit);

    if ctx.json {
        return print_json(&report);
    }

    println!("\nMost Saved Playlists:");
    println!("{:-<60}", "");

    if report.playlists.is_empty() {
        println!("  (nothing saved yet)");
    }
    for (i, entry) in report.playlists.iter().enumerate() {
        println!(
            "{:>3}. {} ({} saves)",
            i + 1,
            entry.name,
            entry.save_count
        );
        println!("     ID: {}", entry.catalog_item_id);
        if let Some(ref c) = entry.category {
            println!("     Category: {}", c);
        }
    }

    if !report.categories.is_empty() {
        println!("\nCategories:");
        for c in &report.categories {
            println!("  {:<14} {}", c.name, c.count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::client::ProviderClient;
    use crate::auth::oauth::build_client;
    use crate::auth::{AppTokenCache, ClientCredentials, Endpoints, TokenRefresher};
    use crate::config::Config;
    use crate::models::{CatalogItem, Owner, TrackSummary};
    use crate::store::Store;

    fn context(server: &MockServer) -> Context {
        let endpoints = Endpoints {
            accounts_url: server.uri(),
            api_url: format!("{}/v1", server.uri()),
        };
        let creds = ClientCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
        };
        let oauth = build_client(&creds, &endpoints).unwrap();
        let store = Arc::new(Store::in_memory());

        Context {
            config: Config::default(),
            store: store.clone(),
            client: ProviderClient::new(
                oauth.clone(),
                &endpoints,
                "TR",
                Arc::new(AppTokenCache::new()),
            ),
            refresher: TokenRefresher::new(store, oauth),
            json: false,
        }
    }

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("Playlist {}", id),
            description: String::new(),
            images: Vec::new(),
            owner: Owner::default(),
            tracks: TrackSummary::default(),
            external_url: None,
        }
    }

    async fn mount_app_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "app-token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_unsave_needs_no_provider_call() {
        let server = MockServer::start().await;
        mount_app_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/playlists/X"))
            .respond_with(ResponseTemplate::new(404))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = context(&server);
        ctx.store.save("u1", &item("X"), None).unwrap();

        let action = toggle_save(&ctx, "u1", "X", None).await.unwrap();
        assert_eq!(action, SaveAction::Removed);
        assert!(!ctx.store.is_saved("u1", "X"));
    }

    #[tokio::test]
    async fn test_save_snapshots_provider_playlist() {
        let server = MockServer::start().await;
        mount_app_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/playlists/X"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "X",
                "name": "Fresh",
                "tracks": { "total": 4, "href": "h" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let action = toggle_save(&ctx, "u1", "X", Some("pop".to_string()))
            .await
            .unwrap();
        assert_eq!(action, SaveAction::Saved);

        let records = ctx.store.saved_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Fresh");
        assert_eq!(records[0].track_count, 4);
        assert_eq!(records[0].category.as_deref(), Some("pop"));
    }

    #[tokio::test]
    async fn test_save_of_missing_playlist_stores_nothing() {
        let server = MockServer::start().await;
        mount_app_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/playlists/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ctx = context(&server);
        assert!(toggle_save(&ctx, "u1", "gone", None).await.is_err());
        assert!(ctx.store.saved_records().is_empty());
    }

    #[test]
    fn test_json_shapes() {
        let outcome = serde_json::to_value(SaveOutcome {
            action: SaveAction::Removed,
            catalog_item_id: "X",
            name: "Mix",
        })
        .unwrap();
        assert_eq!(
            outcome,
            json!({ "action": "removed", "catalog_item_id": "X", "name": "Mix" })
        );

        let report = serde_json::to_value(PopularReport::build(&[], None, 10)).unwrap();
        assert_eq!(report, json!({ "playlists": [], "categories": [] }));
    }
}
