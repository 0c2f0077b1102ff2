//! # Mock Catalog API
//!
//! A tiny HTTP server standing in for the remote wallpaper catalog during
//! development: `GET /api/wallpapers` returns a fixed list of ten records.
//! No paging, no query parameters, no auth.

use axum::{routing::get, Json, Router};

use crate::error::{AppError, Result};
use crate::wallpaper::Wallpaper;

/// (id, catalog id, title, unsplash photo, width, height, tags, ai generated)
type Fixture = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    u32,
    u32,
    &'static str,
    bool,
);

const FIXTURES: [Fixture; 10] = [
    ("9c1fe23c-d0cd-4d70-a1e7-55b059d9b001", "665fd801c234de001a51ab01", "Mountain View",
     "photo-1506744038136-46273834b3fb", 1920, 1080, "mountain, snow, nature", false),
    ("adf02e5b-4242-48a3-85ec-c4b5efc8b9a3", "665fd801c234de001a51ab02", "City Lights",
     "photo-1494526585095-c41746248156", 1920, 1080, "city, night, lights", false),
    ("c1d703e4-b2f6-4418-9d7e-fc0a2f9e5e0a", "665fd801c234de001a51ab03", "Forest Path",
     "photo-1501785888041-af3ef285b470", 1920, 1080, "forest, path, green", false),
    ("f3a5db64-43a4-4970-8185-989f7403289d", "665fd801c234de001a51ab04", "Space Nebula",
     "photo-1587613750860-1a4c1b9db84c", 2560, 1440, "space, nebula, stars", true),
    ("3ab2df97-4076-4d86-98a7-4f5dca99a6b4", "665fd801c234de001a51ab05", "Desert Dunes",
     "photo-1600535277468-0805c1b14c7e", 1920, 1080, "desert, dunes, sand", false),
    ("709b7f12-6d42-4b8f-a693-2e98e3d6a38c", "665fd801c234de001a51ab06", "Ocean Horizon",
     "photo-1507525428034-b723cf961d3e", 1920, 1080, "ocean, sea, waves", false),
    ("51d7d36e-3a62-49dc-9d5f-d9dfabcaaac2", "665fd801c234de001a51ab07", "Aurora Sky",
     "photo-1504384308090-c894fdcc538d", 1920, 1080, "aurora, sky, night", true),
    ("d1b7186a-2b43-4aa3-a012-30a06ecfcaa2", "665fd801c234de001a51ab08", "Sunset Field",
     "photo-1469474968028-56623f02e42e", 1920, 1080, "sunset, field, grass", false),
    ("8c5de2b7-88a6-49e2-a67a-35ae96cc760f", "665fd801c234de001a51ab09", "Frozen Lake",
     "photo-1482192596544-9eb780fc7f66", 1920, 1080, "lake, frozen, snow", false),
    ("f712313b-cb9f-49d5-8f46-446b1ad295f2", "665fd801c234de001a51ab0a", "Abstract Neon",
     "photo-1517694712202-14dd9538aa97", 1920, 1080, "abstract, neon, glow", true),
];

/// The records served by the mock API.
pub fn fixtures() -> Vec<Wallpaper> {
    FIXTURES
        .iter()
        .map(|&(id, mongo_id, title, photo, width, height, tags, is_ai_generated)| {
            let url = format!("https://images.unsplash.com/{photo}");
            Wallpaper {
                id: id.to_string(),
                mongo_id: Some(mongo_id.to_string()),
                title: title.to_string(),
                thumbnail: format!("{url}?w=400"),
                url,
                width,
                height,
                tags: tags.to_string(),
                is_ai_generated,
                is_favorite: None,
            }
        })
        .collect()
}

async fn list_wallpapers() -> Json<Vec<Wallpaper>> {
    Json(fixtures())
}

pub fn router() -> Router {
    Router::new().route("/api/wallpapers", get(list_wallpapers))
}

/// Serves the mock API on `port` until the process exits.
pub async fn serve(port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| AppError::Io(format!("Failed to bind port {port}: {e}")))?;

    tracing::info!("Wallpaper API running at http://localhost:{port}/api/wallpapers");
    axum::serve(listener, router()).await?;
    Ok(())
}
