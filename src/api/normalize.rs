//! Raw catalog response shapes and the adapter to canonical models
//!
//! The upstream names a playlist's track collection either `tracks` or
//! `items`, and nests each track under either `track` or `item`. Both shapes
//! are decoded as-is, classified into [`TrackCollection`] / [`EntryShape`],
//! and only then flattened, so callers always see one canonical form.

use serde::Deserialize;

use crate::models::{Album, Artist, CatalogItem, Image, Owner, PlaylistDetail, Track, TrackSummary};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearch {
    pub playlists: Option<RawPlaylistPage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPlaylistPage {
    pub items: Option<Vec<Option<RawPlaylist>>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPlaylist {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<Option<RawImage>>>,
    pub owner: Option<RawOwner>,
    pub tracks: Option<RawTrackPage>,
    pub items: Option<RawTrackPage>,
    pub external_urls: Option<RawExternalUrls>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTrackPage {
    pub href: Option<String>,
    pub total: Option<u32>,
    pub items: Option<Vec<Option<RawEntry>>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawEntry {
    pub track: Option<RawTrack>,
    pub item: Option<RawTrack>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    pub duration_ms: Option<u64>,
    pub artists: Option<Vec<Option<RawArtist>>>,
    pub album: Option<RawAlbum>,
    pub external_urls: Option<RawExternalUrls>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawArtist {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAlbum {
    pub id: Option<String>,
    pub name: Option<String>,
    pub images: Option<Vec<Option<RawImage>>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawImage {
    pub url: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawOwner {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawExternalUrls {
    pub spotify: Option<String>,
}

/// Where a playlist keeps its track collection.
#[derive(Debug)]
pub(crate) enum TrackCollection {
    Tracks(RawTrackPage),
    Items(RawTrackPage),
    Missing,
}

impl TrackCollection {
    fn from_playlist(tracks: Option<RawTrackPage>, items: Option<RawTrackPage>) -> Self {
        match (tracks, items) {
            (Some(page), _) => Self::Tracks(page),
            (None, Some(page)) => Self::Items(page),
            (None, None) => Self::Missing,
        }
    }

    fn into_page(self) -> Option<RawTrackPage> {
        match self {
            Self::Tracks(page) | Self::Items(page) => Some(page),
            Self::Missing => None,
        }
    }
}

/// Where a collection entry keeps its track.
#[derive(Debug)]
pub(crate) enum EntryShape {
    Track(RawTrack),
    Item(RawTrack),
    Empty,
}

impl From<RawEntry> for EntryShape {
    fn from(entry: RawEntry) -> Self {
        match (entry.track, entry.item) {
            (Some(t), _) => Self::Track(t),
            (None, Some(t)) => Self::Item(t),
            (None, None) => Self::Empty,
        }
    }
}

impl EntryShape {
    fn into_track(self) -> Option<RawTrack> {
        match self {
            Self::Track(t) | Self::Item(t) => Some(t),
            Self::Empty => None,
        }
    }
}

fn images(raw: Option<Vec<Option<RawImage>>>) -> Vec<Image> {
    raw.unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|img| {
            img.url.map(|url| Image {
                url,
                height: img.height,
                width: img.width,
            })
        })
        .collect()
}

fn track(raw: RawTrack) -> Track {
    Track {
        id: raw.id,
        name: raw.name.unwrap_or_default(),
        duration_ms: raw.duration_ms.unwrap_or(0),
        artists: raw
            .artists
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|a| Artist {
                id: a.id,
                name: a.name.unwrap_or_default(),
            })
            .collect(),
        album: raw.album.map(|a| Album {
            id: a.id,
            name: a.name,
            images: images(a.images),
        }),
        external_url: raw.external_urls.and_then(|u| u.spotify),
        preview_url: raw.preview_url,
    }
}

/// Flatten a track page into its summary and canonical tracks.
///
/// A missing or zero total falls back to the number of tracks extracted.
pub(crate) fn normalize_page(page: RawTrackPage) -> (TrackSummary, Vec<Track>) {
    let tracks: Vec<Track> = page
        .items
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|entry| EntryShape::from(entry).into_track())
        .map(track)
        .collect();

    let summary = TrackSummary {
        total: page
            .total
            .filter(|t| *t > 0)
            .unwrap_or(tracks.len() as u32),
        href: page.href.unwrap_or_default(),
    };
    (summary, tracks)
}

/// Normalize a playlist. Returns `None` for entries without an id.
pub(crate) fn normalize_playlist(raw: RawPlaylist) -> Option<PlaylistDetail> {
    let id = raw.id.filter(|id| !id.is_empty())?;
    let (summary, tracks) = TrackCollection::from_playlist(raw.tracks, raw.items)
        .into_page()
        .map(normalize_page)
        .unwrap_or_default();
    let owner = raw.owner.unwrap_or_default();

    Some(PlaylistDetail {
        playlist: CatalogItem {
            id,
            name: raw.name.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            images: images(raw.images),
            owner: Owner {
                id: owner.id.unwrap_or_default(),
                display_name: owner.display_name.unwrap_or_default(),
            },
            tracks: summary,
            external_url: raw.external_urls.and_then(|u| u.spotify),
        },
        tracks,
    })
}

/// Normalize a page of playlists, skipping null or id-less entries.
pub(crate) fn normalize_playlist_page(page: RawPlaylistPage) -> Vec<CatalogItem> {
    page.items
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(normalize_playlist)
        .map(|detail| detail.playlist)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track_json() -> serde_json::Value {
        json!({
            "id": "t1",
            "name": "Song",
            "duration_ms": 201000,
            "artists": [{ "id": "a1", "name": "Singer" }],
            "album": {
                "id": "al1",
                "name": "Album",
                "images": [{ "url": "https://img/al1", "height": 640, "width": 640 }]
            },
            "external_urls": { "spotify": "https://open/t1" },
            "preview_url": null
        })
    }

    fn parse(value: serde_json::Value) -> PlaylistDetail {
        let raw: RawPlaylist = serde_json::from_value(value).unwrap();
        normalize_playlist(raw).unwrap()
    }

    #[test]
    fn test_tracks_and_items_shapes_normalize_identically() {
        let a = parse(json!({
            "id": "p1",
            "name": "Mix",
            "tracks": { "href": "https://api/p1/tracks", "total": 1, "items": [{ "track": track_json() }] }
        }));
        let b = parse(json!({
            "id": "p1",
            "name": "Mix",
            "items": { "href": "https://api/p1/tracks", "total": 1, "items": [{ "item": track_json() }] }
        }));

        assert_eq!(a.playlist, b.playlist);
        assert_eq!(a.tracks, b.tracks);
        assert_eq!(a.tracks.len(), 1);

        let t = &a.tracks[0];
        assert_eq!(t.id.as_deref(), Some("t1"));
        assert_eq!(t.duration_ms, 201000);
        assert_eq!(t.artist_names(), "Singer");
        assert_eq!(t.external_url.as_deref(), Some("https://open/t1"));
        assert!(t.preview_url.is_none());
        assert_eq!(t.album.as_ref().unwrap().images.len(), 1);
        assert_eq!(a.playlist.tracks.href, "https://api/p1/tracks");
    }

    #[test]
    fn test_missing_fields_default() {
        let detail = parse(json!({ "id": "p2" }));
        assert_eq!(detail.playlist.name, "");
        assert!(detail.playlist.images.is_empty());
        assert_eq!(detail.playlist.owner, Owner::default());
        assert_eq!(detail.playlist.tracks, TrackSummary::default());
        assert!(detail.playlist.external_url.is_none());
        assert!(detail.tracks.is_empty());
    }

    #[test]
    fn test_sparse_track_fields_default() {
        let detail = parse(json!({
            "id": "p3",
            "tracks": { "items": [{ "track": { "name": "Bare" } }] }
        }));
        let t = &detail.tracks[0];
        assert!(t.id.is_none());
        assert!(t.artists.is_empty());
        assert!(t.album.is_none());
        assert_eq!(t.duration_ms, 0);
    }

    #[test]
    fn test_null_entries_skipped_and_total_falls_back() {
        let detail = parse(json!({
            "id": "p4",
            "tracks": {
                "items": [
                    null,
                    { "track": null },
                    { "item": track_json() },
                    {}
                ]
            }
        }));
        assert_eq!(detail.tracks.len(), 1);
        assert_eq!(detail.playlist.tracks.total, 1);
    }

    #[test]
    fn test_tracks_preferred_over_items() {
        let detail = parse(json!({
            "id": "p5",
            "tracks": { "total": 7, "href": "tracks-href" },
            "items": { "total": 9, "href": "items-href" }
        }));
        assert_eq!(detail.playlist.tracks.total, 7);
        assert_eq!(detail.playlist.tracks.href, "tracks-href");
    }

    #[test]
    fn test_playlist_page_skips_null_and_idless() {
        let page: RawPlaylistPage = serde_json::from_value(json!({
            "items": [null, { "name": "no id" }, { "id": "p6", "name": "Kept" }]
        }))
        .unwrap();
        let items = normalize_playlist_page(page);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "p6");
    }
}
