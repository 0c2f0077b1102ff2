//! # State Container
//!
//! The single owner of the wallpaper collection, favorites, derived tag set,
//! settings and pagination cursor. It is the only component that talks to the
//! bridge or the persisted store; everything else reads snapshots and calls
//! the mutators here.
//!
//! ## Synchronization
//! Every mutator follows the same shape: call the bridge, then on success
//! update the in-memory slices, then persist a snapshot. Failures are caught
//! per operation and written to the shared `error` field, leaving earlier state
//! untouched.
//!
//! `update_favorite` is the one optimistic path: it patches the flag locally as
//! soon as the bridge accepts it and then refetches favorites, which is what
//! actually reconciles the two collections.
//!
//! State lives in a `watch` channel. Mutations are short synchronous
//! `send_modify` calls and no borrow is held across an `.await`, so concurrent
//! calls only interleave while waiting on the bridge.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::bridge::Bridge;
use crate::config::{Config, LoadMoreMode};
use crate::error::{AppError, Result};
use crate::settings::{SettingCategory, SettingKey, SettingValue, Settings};
use crate::store::JsonStore;
use crate::wallpaper::{derive_tags, Wallpaper};

/// Store keys of the persisted snapshot.
const KEY_WALLPAPERS: &str = "wallpapers";
const KEY_FAVORITES: &str = "favorites";
const KEY_SETTINGS: &str = "settings";

/// Everything the UI renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct WallpaperState {
    pub wallpapers: Vec<Wallpaper>,
    pub favorites: Vec<Wallpaper>,
    /// Derived from `wallpapers`; recomputed whenever the collection changes
    pub tags: Vec<String>,
    pub settings: Settings,
    /// A wallpaper fetch is in flight
    pub loading: bool,
    /// Message from the most recent failed operation
    pub error: Option<String>,
    /// Number of pages fetched so far
    pub page: u32,
    pub has_more: bool,
    /// Settings have been fetched from the host at least once
    pub settings_loaded: bool,
}

impl Default for WallpaperState {
    fn default() -> Self {
        Self {
            wallpapers: Vec::new(),
            favorites: Vec::new(),
            tags: Vec::new(),
            settings: Settings::default(),
            loading: false,
            error: None,
            page: 0,
            has_more: true,
            settings_loaded: false,
        }
    }
}

pub struct StateContainer {
    bridge: Arc<dyn Bridge>,
    store: JsonStore,
    page_size: u32,
    load_more_mode: LoadMoreMode,
    state: watch::Sender<WallpaperState>,
}

impl StateContainer {
    pub fn new(bridge: Arc<dyn Bridge>, store: JsonStore, config: &Config) -> Self {
        let (state, _) = watch::channel(WallpaperState::default());
        Self {
            bridge,
            store,
            page_size: config.page_size.max(1),
            load_more_mode: config.load_more_mode,
            state,
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> WallpaperState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<WallpaperState> {
        self.state.subscribe()
    }

    pub fn settings(&self) -> Settings {
        self.state.borrow().settings.clone()
    }

    /// Stores `context: err` in the shared error field and hands the error back.
    fn record_error(&self, context: &str, err: AppError) -> AppError {
        let message = format!("{context}: {err}");
        tracing::warn!("{message}");
        self.state.send_modify(|s| {
            s.error = Some(message);
            s.loading = false;
        });
        err
    }

    // === Wallpapers ===

    /// Fetches one page and replaces the collection with it.
    ///
    /// `has_more` is set when the page came back full; `page` becomes
    /// `offset / limit + 1`.
    pub async fn fetch_wallpapers(&self, limit: u32, offset: u32) -> Result<()> {
        self.fetch_page(limit, offset, LoadMoreMode::Replace).await
    }

    /// Fetches the page after the current cursor. No-op once `has_more` is false.
    ///
    /// In replace mode the offset is `page * page_size`. In append mode it is
    /// the number of wallpapers already held, so a first page fetched with a
    /// different limit leaves no gap.
    pub async fn load_more_wallpapers(&self) -> Result<()> {
        let (page, loaded, has_more) = {
            let s = self.state.borrow();
            (s.page, s.wallpapers.len(), s.has_more)
        };
        if !has_more {
            tracing::debug!("load more: no more pages");
            return Ok(());
        }

        let offset = match self.load_more_mode {
            LoadMoreMode::Replace => page.saturating_mul(self.page_size),
            LoadMoreMode::Append => u32::try_from(loaded).unwrap_or(u32::MAX),
        };
        self.fetch_page(self.page_size, offset, self.load_more_mode).await
    }

    async fn fetch_page(&self, limit: u32, offset: u32, mode: LoadMoreMode) -> Result<()> {
        if limit == 0 {
            return Err(AppError::InvalidArguments(
                "limit must be greater than zero".to_string(),
            ));
        }

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let page = match self.bridge.get_wallpapers(limit, offset).await {
            Ok(page) => page,
            Err(e) => return Err(self.record_error("Failed to fetch wallpapers", e)),
        };

        let received = page.len();
        self.state.send_modify(|s| {
            match mode {
                LoadMoreMode::Replace => s.wallpapers = page,
                LoadMoreMode::Append => {
                    let known: HashSet<String> =
                        s.wallpapers.iter().map(|wp| wp.id.clone()).collect();
                    s.wallpapers
                        .extend(page.into_iter().filter(|wp| !known.contains(&wp.id)));
                }
            }
            s.tags = derive_tags(&s.wallpapers);
            s.has_more = received == limit as usize;
            s.page = offset / limit + 1;
            s.loading = false;
        });
        tracing::debug!("fetched {received} wallpapers (limit {limit}, offset {offset})");

        self.persist_state()
            .await
            .map_err(|e| self.record_error("Failed to save wallpapers", e))
    }

    /// Replaces the collection without touching the cursor.
    pub fn set_wallpapers(&self, items: Vec<Wallpaper>) {
        self.state.send_modify(|s| {
            s.tags = derive_tags(&items);
            s.wallpapers = items;
        });
    }

    /// Empties the collection and rewinds the cursor.
    pub fn clear_wallpapers(&self) {
        self.state.send_modify(|s| {
            s.wallpapers.clear();
            s.tags.clear();
            s.page = 0;
            s.has_more = true;
        });
    }

    // === Favorites ===

    /// Sets the favorite flag through the host, patches it locally, then
    /// refetches favorites to reconcile.
    ///
    /// Nothing changes locally if the host rejects the update.
    pub async fn update_favorite(&self, id: &str, is_favorite: bool) -> Result<()> {
        if let Err(e) = self.bridge.update_favorite(id, is_favorite).await {
            return Err(self.record_error("Failed to update favorite", e));
        }

        self.state.send_modify(|s| {
            for wp in s.wallpapers.iter_mut().filter(|wp| wp.id == id) {
                wp.is_favorite = Some(is_favorite);
            }
        });

        self.fetch_favorite_wallpapers().await
    }

    pub async fn delete_favorite_wallpaper(&self, id: &str) -> Result<()> {
        if let Err(e) = self.bridge.delete_favorite_wallpaper(id).await {
            return Err(self.record_error("Failed to delete favorite wallpaper", e));
        }
        self.fetch_favorite_wallpapers().await
    }

    /// Replaces favorites with the host's list and aligns `is_favorite` in the
    /// main collection with it.
    pub async fn fetch_favorite_wallpapers(&self) -> Result<()> {
        let favorites = match self.bridge.fetch_favorite_wallpapers().await {
            Ok(favorites) => favorites,
            Err(e) => return Err(self.record_error("Failed to fetch favorites", e)),
        };

        self.state.send_modify(|s| {
            let ids: HashSet<&str> = favorites.iter().map(|wp| wp.id.as_str()).collect();
            for wp in &mut s.wallpapers {
                wp.is_favorite = Some(ids.contains(wp.id.as_str()));
            }
            s.favorites = favorites;
        });

        self.persist_state()
            .await
            .map_err(|e| self.record_error("Failed to save favorites", e))
    }

    // === Settings ===

    /// Fetches settings from the host and normalizes them.
    pub async fn fetch_setting(&self) -> Result<()> {
        let raw = match self.bridge.get_app_settings().await {
            Ok(raw) => raw,
            Err(e) => return Err(self.record_error("Failed to fetch settings", e)),
        };

        let settings = Settings::from_raw(&raw);
        self.state.send_modify(|s| {
            s.settings = settings;
            s.settings_loaded = true;
        });

        self.persist_state()
            .await
            .map_err(|e| self.record_error("Failed to save settings", e))
    }

    /// Writes one setting through the host and patches it locally on success.
    ///
    /// Unlike the other mutators a bridge failure here is only logged and
    /// returned; the shared `error` field is left alone.
    pub async fn update_setting(
        &self,
        key: SettingKey,
        value: SettingValue,
        category: SettingCategory,
    ) -> Result<()> {
        Settings::validate(key, &value)?;

        let wire = value.to_wire();
        if let Err(e) = self
            .bridge
            .update_app_setting(key.as_str(), &wire, category.as_str())
            .await
        {
            tracing::error!("update_app_setting_command failed for {key}: {e}");
            return Err(e);
        }

        self.state.send_modify(|s| {
            if let Err(e) = s.settings.apply(key, value) {
                tracing::error!("setting {key} rejected after host accepted it: {e}");
            }
        });
        Ok(())
    }

    pub async fn reset_settings(&self) -> Result<()> {
        if let Err(e) = self.bridge.reset_wallpaper_settings().await {
            return Err(self.record_error("Failed to reset settings", e));
        }
        self.fetch_setting().await
    }

    // === Desktop commands (no local state) ===

    pub async fn apply_wallpaper(&self, image_url: &str) -> Result<()> {
        self.bridge.apply_wallpaper(image_url).await
    }

    pub async fn download_wallpaper(&self, url: &str, filename: &str) -> Result<String> {
        self.bridge.download_wallpaper(url, filename).await
    }

    /// Asks the host to start rotating through `paths`.
    ///
    /// The returned handle resolves once the host has acknowledged; it can be
    /// awaited or dropped.
    pub fn start_rotation(
        &self,
        paths: Vec<String>,
        interval_sec: u64,
        window: String,
    ) -> Result<JoinHandle<Result<()>>> {
        if paths.is_empty() {
            return Err(AppError::InvalidArguments("No wallpapers to rotate".to_string()));
        }
        if interval_sec == 0 {
            return Err(AppError::InvalidArguments(
                "Rotation interval must be at least one second".to_string(),
            ));
        }

        let bridge = Arc::clone(&self.bridge);
        Ok(tokio::spawn(async move {
            let result = bridge.start_wallpaper_rotation(&paths, interval_sec, &window).await;
            if let Err(e) = &result {
                tracing::warn!("start_wallpaper_rotation failed: {e}");
            }
            result
        }))
    }

    pub fn stop_rotation(&self) -> JoinHandle<Result<()>> {
        let bridge = Arc::clone(&self.bridge);
        tokio::spawn(async move {
            let result = bridge.stop_wallpaper_rotation().await;
            if let Err(e) = &result {
                tracing::warn!("stop_wallpaper_rotation failed: {e}");
            }
            result
        })
    }

    pub async fn wallpaper_count(&self) -> Result<u32> {
        self.bridge.wallpaper_count().await
    }

    pub async fn prune_wallpapers(&self, keep: u32) -> Result<()> {
        self.bridge.prune_wallpapers(keep).await
    }

    // === Persistence ===

    /// Writes {wallpapers, favorites, settings} to the store.
    pub async fn persist_state(&self) -> Result<()> {
        let (wallpapers, favorites, settings) = {
            let s = self.state.borrow();
            (s.wallpapers.clone(), s.favorites.clone(), s.settings.clone())
        };

        self.store.set(KEY_WALLPAPERS, &wallpapers).await?;
        self.store.set(KEY_FAVORITES, &favorites).await?;
        self.store.set(KEY_SETTINGS, &settings).await?;
        self.store.save().await
    }

    /// Restores the last snapshot. Absent or undecodable keys fall back to empty
    /// collections and the current settings.
    pub async fn load_persisted_state(&self) {
        let wallpapers: Vec<Wallpaper> = self.restore(KEY_WALLPAPERS).await.unwrap_or_default();
        let favorites: Vec<Wallpaper> = self.restore(KEY_FAVORITES).await.unwrap_or_default();
        let settings: Option<Settings> = self.restore(KEY_SETTINGS).await;

        tracing::info!(
            "restored {} wallpapers and {} favorites from {}",
            wallpapers.len(),
            favorites.len(),
            self.store.path().display()
        );

        self.state.send_modify(|s| {
            s.tags = derive_tags(&wallpapers);
            s.wallpapers = wallpapers;
            s.favorites = favorites;
            if let Some(settings) = settings {
                s.settings = settings;
            }
        });
    }

    async fn restore<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("ignoring persisted {key}: {e}");
                None
            }
        }
    }
}
