//! # Wallpaper Remix
//!
//! Client core of a wallpaper browser. The host shell (reached over D-Bus)
//! owns the wallpaper database, downloads and the desktop background; this
//! crate keeps a synchronized local view of it.
//!
//! ## Architecture
//! - `state.rs` - State container: wallpapers, favorites, tags, settings, paging
//! - `bridge.rs` - Command surface of the host shell
//! - `dbus_client.rs` - D-Bus implementation of the bridge
//! - `store.rs` - Persisted snapshot for cold starts
//! - `providers.rs` - Theme and language resolution
//! - `gallery.rs` - Category filter, infinite scroll and preview for list pages
//! - `desktop.rs` - Apply/download/rotation actions with toasts
//! - `catalog.rs` / `mock_api.rs` - Catalog HTTP client and a local mock server
//! - `config.rs` / `settings.rs` - Local config and the synchronized settings

pub mod bridge;      // Host shell command surface
pub mod catalog;     // HTTP client for the wallpaper catalog
pub mod config;      // Local configuration and option tables
pub mod dbus_client; // D-Bus bridge to the host shell
pub mod desktop;     // Apply/download/rotation with toast feedback
pub mod error;       // Shared error type
pub mod gallery;     // List page view-model
pub mod host;        // notify-send, dark mode detection, flatpak helpers
pub mod logging;     // tracing subscriber setup
pub mod mock_api;    // Local mock of the catalog API
pub mod providers;   // Theme and language providers
pub mod settings;    // Synchronized user settings
pub mod state;       // State container
pub mod store;       // Persisted key-value snapshot
pub mod wallpaper;   // Wallpaper record
