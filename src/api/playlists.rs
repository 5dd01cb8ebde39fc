//! Playlist listing commands (prints to stdout)

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::aggregate::QueryOutcome;
use super::{catalog, print_json, Context};
use crate::models::{CatalogItem, PlaylistDetail, Track};

/// Playlist detail as printed with `--json`.
#[derive(Serialize)]
struct PlaylistView<'a> {
    #[serde(flatten)]
    detail: &'a PlaylistDetail,
    /// Present only when the command ran for a user
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<bool>,
}

fn print_playlists(ctx: &Context, title: &str, playlists: &[CatalogItem]) -> Result<()> {
    if ctx.json {
        return print_json(playlists);
    }

    println!("\n{}:", title);
    println!("{:-<60}", "");

    if playlists.is_empty() {
        println!("  (no playlists found)");
        return Ok(());
    }

    for p in playlists {
        println!("{}", p.name);
        println!("  ID:     {}", p.id);
        if !p.owner.display_name.is_empty() {
            println!("  Owner:  {}", p.owner.display_name);
        }
        println!("  Tracks: {}", p.tracks.total);
        if let Some(ref url) = p.external_url {
            println!("  URL:    {}", url);
        }
        println!();
    }
    Ok(())
}

fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        println!("  (no tracks)");
        return;
    }
    for (i, t) in tracks.iter().enumerate() {
        println!(
            "{:>3}. {} - {} [{}]",
            i + 1,
            t.artist_names(),
            t.name,
            format_duration(t.duration_ms)
        );
    }
}

pub async fn search(ctx: &Context, query: &str, limit: usize) -> Result<()> {
    let playlists = ctx
        .client
        .search(query, limit)
        .await
        .with_context(|| format!("Search for {:?} failed", query))?;
    print_playlists(ctx, &format!("Results for {:?}", query), &playlists)
}

pub async fn show_playlist(ctx: &Context, id: &str, user_id: Option<&str>) -> Result<()> {
    let client = ctx.client_for(user_id).await;
    let detail = client
        .get_playlist_detail(id)
        .await
        .with_context(|| format!("Failed to load playlist {}", id))?;
    let saved = user_id.map(|uid| ctx.store.is_saved(uid, &detail.playlist.id));

    if ctx.json {
        return print_json(&PlaylistView {
            detail: &detail,
            saved,
        });
    }

    let p = &detail.playlist;
    println!("\n{}", p.name);
    println!("{:-<60}", "");
    if !p.description.is_empty() {
        println!("{}", p.description);
    }
    println!("Owner:  {}", p.owner.display_name);
    println!("Tracks: {}", p.tracks.total);
    if let Some(ref url) = p.external_url {
        println!("URL:    {}", url);
    }
    if let Some(saved) = saved {
        println!("Status: {}", if saved { "saved" } else { "not saved" });
    }
    println!();
    print_tracks(&detail.tracks);
    Ok(())
}

pub async fn list_tracks(
    ctx: &Context,
    id: &str,
    limit: usize,
    user_id: Option<&str>,
) -> Result<()> {
    let client = ctx.client_for(user_id).await;
    let tracks = client
        .get_tracks(id, limit)
        .await
        .with_context(|| format!("Failed to load tracks of {}", id))?;
    if ctx.json {
        return print_json(&tracks);
    }
    println!();
    print_tracks(&tracks);
    Ok(())
}

pub async fn my_playlists(ctx: &Context, user_id: &str, limit: usize) -> Result<()> {
    let Some(token) = ctx.refresher.ensure_valid_access_token(user_id).await else {
        anyhow::bail!(
            "No linked account for {} or its token expired. Reconnect the account.",
            user_id
        );
    };
    let playlists = ctx
        .client
        .with_user_token(token)
        .user_playlists(limit)
        .await
        .context("Failed to load user playlists")?;
    print_playlists(ctx, &format!("Playlists of {}", user_id), &playlists)
}

pub async fn featured(ctx: &Context, limit: usize) -> Result<()> {
    let report = catalog::featured_playlists(&ctx.client, &ctx.config.featured_queries, limit).await;

    let failed = report.failures().count();
    if failed > 0 && report.items.is_empty() {
        tracing::warn!("All {} featured queries failed", failed);
    }
    for outcome in &report.outcomes {
        if let QueryOutcome::Skipped { query } = outcome {
            tracing::debug!("Featured query {:?} not needed", query);
        }
    }

    print_playlists(ctx, "Featured Playlists", &report.items)
}

pub fn list_categories(limit: usize, json: bool) -> Result<()> {
    let categories = catalog::categories(limit);
    if json {
        return print_json(&categories);
    }

    println!("\nCategories:");
    println!("{:-<60}", "");
    for c in &categories {
        println!("  {:<14} {}", c.id, c.name);
    }
    Ok(())
}

pub async fn category(ctx: &Context, category_id: &str, limit: usize) -> Result<()> {
    let playlists = catalog::category_playlists(&ctx.client, category_id, limit)
        .await
        .with_context(|| format!("Failed to load category {}", category_id))?;
    print_playlists(ctx, &format!("Category {}", category_id), &playlists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Owner, TrackSummary};
    use serde_json::json;

    fn detail() -> PlaylistDetail {
        PlaylistDetail {
            playlist: CatalogItem {
                id: "p1".to_string(),
                name: "Mix".to_string(),
                description: String::new(),
                images: Vec::new(),
                owner: Owner::default(),
                tracks: TrackSummary::default(),
                external_url: None,
            },
            tracks: Vec::new(),
        }
    }

    #[test]
    fn test_playlist_view_json() {
        let detail = detail();
        let view = serde_json::to_value(PlaylistView {
            detail: &detail,
            saved: Some(true),
        })
        .unwrap();
        assert_eq!(view["playlist"]["id"], json!("p1"));
        assert_eq!(view["tracks"], json!([]));
        assert_eq!(view["saved"], json!(true));

        let anonymous = serde_json::to_value(PlaylistView {
            detail: &detail,
            saved: None,
        })
        .unwrap();
        assert!(anonymous.get("saved").is_none());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(201_000), "3:21");
        assert_eq!(format_duration(3_599_999), "59:59");
    }
}
