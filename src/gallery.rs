//! # Gallery View-Model
//!
//! Transient page state shared by the home and favorites pages: category
//! filter, the infinite-scroll window and the full-screen preview cursor.
//! None of it is persisted or sent to the host.

use std::time::Duration;

use crate::config::Config;
use crate::state::WallpaperState;
use crate::wallpaper::Wallpaper;

/// Id of the pseudo-category that shows everything.
pub const ALL_CATEGORY: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Category id for a tag: lowercase, whitespace runs replaced by `-`.
pub fn slug(tag: &str) -> String {
    tag.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `all` followed by one category per tag, in tag order.
pub fn categories(tags: &[String]) -> Vec<Category> {
    let mut list = vec![Category { id: ALL_CATEGORY.to_string(), name: "All".to_string() }];
    for tag in tags {
        let id = slug(tag);
        if id.is_empty() || list.iter().any(|c| c.id == id) {
            continue;
        }
        list.push(Category { id, name: capitalize(tag.trim()) });
    }
    list
}

pub fn matches_category(wallpaper: &Wallpaper, category: &str) -> bool {
    category == ALL_CATEGORY || wallpaper.tag_list().any(|tag| slug(tag) == category)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Clone)]
pub struct Gallery {
    items: Vec<Wallpaper>,
    category: String,
    visible: usize,
    per_load: usize,
    delay: Duration,
    preview: Option<usize>,
}

impl Gallery {
    pub fn new(items: Vec<Wallpaper>, per_load: usize, delay: Duration) -> Self {
        let per_load = per_load.max(1);
        Self {
            items,
            category: ALL_CATEGORY.to_string(),
            visible: per_load,
            per_load,
            delay,
            preview: None,
        }
    }

    /// Home page: the main collection.
    pub fn home(state: &WallpaperState, config: &Config) -> Self {
        Self::new(state.wallpapers.clone(), config.items_per_load, config.scroll_delay())
    }

    /// Favorites page.
    pub fn favorites(state: &WallpaperState, config: &Config) -> Self {
        Self::new(state.favorites.clone(), config.items_per_load, config.scroll_delay())
    }

    /// Swaps in a fresh collection, keeping the category but rewinding the
    /// scroll window.
    pub fn set_items(&mut self, items: Vec<Wallpaper>) {
        self.items = items;
        self.visible = self.per_load;
        self.preview = None;
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Changes the filter and resets the scroll window.
    pub fn select_category(&mut self, category: &str) {
        self.category = category.to_string();
        self.visible = self.per_load;
        self.preview = None;
    }

    pub fn filtered(&self) -> Vec<&Wallpaper> {
        self.items
            .iter()
            .filter(|wp| matches_category(wp, &self.category))
            .collect()
    }

    pub fn visible(&self) -> Vec<&Wallpaper> {
        let mut filtered = self.filtered();
        filtered.truncate(self.visible);
        filtered
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.filtered().len()
    }

    /// Reveals the next slice after the scroll delay. No-op at the end.
    pub async fn load_more(&mut self) {
        if !self.has_more() {
            return;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.visible = (self.visible + self.per_load).min(self.filtered().len());
    }

    /// Opens the preview at `index` within the filtered list.
    pub fn open_preview(&mut self, index: usize) -> Option<&Wallpaper> {
        if index >= self.filtered().len() {
            return None;
        }
        self.preview = Some(index);
        self.preview_item()
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    pub fn preview_item(&self) -> Option<&Wallpaper> {
        let index = self.preview?;
        self.filtered().get(index).copied()
    }

    /// Steps the preview, wrapping at both ends.
    pub fn navigate(&mut self, direction: Direction) -> Option<&Wallpaper> {
        let len = self.filtered().len();
        let current = self.preview?;
        if len == 0 {
            self.preview = None;
            return None;
        }
        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Prev => (current + len - 1) % len,
        };
        self.preview = Some(next);
        self.preview_item()
    }
}
