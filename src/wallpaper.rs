//! # Wallpaper Model
//!
//! The record shared by the bridge, the persisted store and the mock catalog.
//! Tags travel as one comma-joined string (`"mountain, snow, nature"`) and are
//! treated as an unordered set of labels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single wallpaper as returned by the host shell or the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallpaper {
    /// Stable identity, unchanged across fetches
    pub id: String,
    /// Upstream catalog id, when the record was synced from the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<String>,
    pub title: String,
    /// Full-resolution image URL (or local path once cached by the host)
    pub url: String,
    pub thumbnail: String,
    pub width: u32,
    pub height: u32,
    /// Comma-separated labels
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub is_ai_generated: bool,
    /// Favorite flag as last reported by the host (or patched locally)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl Wallpaper {
    /// Iterates the trimmed, non-empty tags of this wallpaper.
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split(',').map(str::trim).filter(|t| !t.is_empty())
    }

    /// Whether the favorite flag is set (absent counts as not favorite).
    pub fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }
}

/// Derives the tag set for a collection: trimmed, de-duplicated and sorted.
pub fn derive_tags(wallpapers: &[Wallpaper]) -> Vec<String> {
    wallpapers
        .iter()
        .flat_map(|wp| wp.tag_list())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
pub(crate) fn sample(id: &str, tags: &str) -> Wallpaper {
    Wallpaper {
        id: id.to_string(),
        mongo_id: None,
        title: format!("Wallpaper {id}"),
        url: format!("https://images.example.com/{id}.jpg"),
        thumbnail: format!("https://images.example.com/{id}.jpg?w=400"),
        width: 1920,
        height: 1080,
        tags: tags.to_string(),
        is_ai_generated: false,
        is_favorite: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_list_trims_and_skips_empty() {
        let wp = sample("a", " mountain, snow ,, nature ,");
        let tags: Vec<&str> = wp.tag_list().collect();
        assert_eq!(tags, vec!["mountain", "snow", "nature"]);
    }

    #[test]
    fn test_derive_tags_sorted_and_unique() {
        let items = vec![
            sample("a", "snow, mountain"),
            sample("b", "night, city, snow"),
            sample("c", ""),
        ];
        assert_eq!(derive_tags(&items), vec!["city", "mountain", "night", "snow"]);
    }

    #[test]
    fn test_derive_tags_is_idempotent() {
        let items = vec![sample("a", "ocean, sea, waves"), sample("b", "sea, sunset")];
        let first = derive_tags(&items);
        let second = derive_tags(&items);
        assert_eq!(first, second);
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let json = r#"{
            "id": "9c1f",
            "title": "Mountain View",
            "url": "https://images.unsplash.com/photo-1",
            "thumbnail": "https://images.unsplash.com/photo-1?w=400",
            "width": 1920,
            "height": 1080,
            "tags": "mountain, snow, nature",
            "is_ai_generated": false
        }"#;
        let wp: Wallpaper = serde_json::from_str(json).unwrap();
        assert_eq!(wp.id, "9c1f");
        assert!(wp.mongo_id.is_none());
        assert!(!wp.is_favorite());
    }

    #[test]
    fn test_unset_favorite_is_not_serialized() {
        let json = serde_json::to_string(&sample("a", "x")).unwrap();
        assert!(!json.contains("is_favorite"));
        assert!(!json.contains("mongo_id"));
    }
}
