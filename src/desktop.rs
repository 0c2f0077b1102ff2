//! # Desktop Actions
//!
//! User-triggered desktop commands (apply, download, rotation) with progress
//! feedback. Each action announces itself with a loading toast and finishes
//! with a success or error toast on a broadcast channel; the front end decides
//! how to show them.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::state::StateContainer;

/// Toast channel capacity. Slow receivers lose the oldest toasts.
const TOAST_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

pub struct Desktop {
    state: Arc<StateContainer>,
    toasts: broadcast::Sender<Toast>,
    rotation_window: String,
}

impl Desktop {
    pub fn new(state: Arc<StateContainer>, rotation_window: impl Into<String>) -> Self {
        let (toasts, _) = broadcast::channel(TOAST_CAPACITY);
        Self { state, toasts, rotation_window: rotation_window.into() }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.toasts.subscribe()
    }

    fn toast(&self, kind: ToastKind, message: impl Into<String>) {
        // No receivers is fine
        let _ = self.toasts.send(Toast { kind, message: message.into() });
    }

    /// Reports the outcome of an action as a toast and passes it through.
    fn finish<T>(&self, result: Result<T>, success: &str, failure: &str) -> Result<T> {
        match &result {
            Ok(_) => self.toast(ToastKind::Success, success),
            Err(e) => {
                tracing::warn!("{failure}: {e}");
                self.toast(ToastKind::Error, format!("{failure}: {e}"));
            }
        }
        result
    }

    /// Sets `image_url` as the desktop background.
    pub async fn apply(&self, image_url: &str) -> Result<()> {
        self.toast(ToastKind::Loading, "Applying wallpaper...");
        let result = self.state.apply_wallpaper(image_url).await;
        self.finish(result, "Wallpaper applied", "Failed to apply wallpaper")
    }

    /// Downloads `url` under a name derived from `title`. Returns the saved path.
    pub async fn download(&self, url: &str, title: &str) -> Result<String> {
        let filename = generate_filename(title);
        tracing::debug!("downloading {url} as {filename}");

        self.toast(ToastKind::Loading, "Downloading wallpaper...");
        let result = self.state.download_wallpaper(url, &filename).await;
        let success = match &result {
            Ok(path) => format!("Saved to {path}"),
            Err(_) => String::new(),
        };
        self.finish(result, &success, "Failed to download wallpaper")
    }

    /// Starts host-side rotation through `paths` and waits for the host to
    /// acknowledge.
    pub async fn start_rotation(&self, paths: Vec<String>, interval_sec: u64) -> Result<()> {
        let count = paths.len();
        self.toast(ToastKind::Loading, "Starting rotation...");

        let window = self.rotation_window.clone();
        let result = match self.state.start_rotation(paths, interval_sec, window) {
            Ok(handle) => join(handle).await,
            Err(e) => Err(e),
        };
        let success = format!("Rotating {count} wallpapers every {interval_sec}s");
        self.finish(result, &success, "Failed to start rotation")
    }

    pub async fn stop_rotation(&self) -> Result<()> {
        self.toast(ToastKind::Loading, "Stopping wallpaper rotation...");
        let result = join(self.state.stop_rotation()).await;
        self.finish(result, "Rotation stopped", "Failed to stop rotation")
    }
}

async fn join(handle: tokio::task::JoinHandle<Result<()>>) -> Result<()> {
    handle
        .await
        .map_err(|e| crate::error::AppError::Bridge(format!("rotation task aborted: {e}")))?
}

/// Download filename for a wallpaper title, stamped with the current time.
pub fn generate_filename(title: &str) -> String {
    generate_filename_at(title, chrono::Utc::now().timestamp_millis())
}

/// `generate_filename` with an explicit timestamp.
///
/// Whitespace runs become `_`, anything outside `[A-Za-z0-9_-]` is dropped and
/// an empty stem falls back to `wallpaper`.
pub fn generate_filename_at(title: &str, millis: i64) -> String {
    let joined = title.split_whitespace().collect::<Vec<_>>().join("_");
    let stem: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let stem = if stem.is_empty() { "wallpaper" } else { stem.as_str() };
    format!("{stem}_{millis}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::fake::FakeBridge;
    use crate::config::Config;
    use crate::store::JsonStore;
    use tempfile::TempDir;

    async fn desktop(bridge: &Arc<FakeBridge>) -> (Desktop, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::load(dir.path().join("store.dat")).await;
        let state = Arc::new(StateContainer::new(bridge.clone(), store, &Config::default()));
        (Desktop::new(state, "main"), dir)
    }

    fn drain(rx: &mut broadcast::Receiver<Toast>) -> Vec<Toast> {
        let mut toasts = Vec::new();
        while let Ok(toast) = rx.try_recv() {
            toasts.push(toast);
        }
        toasts
    }

    #[test]
    fn test_generate_filename() {
        assert_eq!(
            generate_filename_at("Mountain Lake", 1700000000000),
            "Mountain_Lake_1700000000000.jpg"
        );
        assert_eq!(generate_filename_at("  Neon   City!  ", 5), "Neon_City_5.jpg");
        assert_eq!(generate_filename_at("dawn-2 / dusk", 7), "dawn-2__dusk_7.jpg");
        assert_eq!(generate_filename_at("???", 9), "wallpaper_9.jpg");
        assert_eq!(generate_filename_at("", 1), "wallpaper_1.jpg");
    }

    #[test]
    fn test_generate_filename_is_safe() {
        let name = generate_filename("Café – Paris/Night");
        assert!(name.ends_with(".jpg"));
        assert!(name
            .trim_end_matches(".jpg")
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    #[tokio::test]
    async fn test_apply_emits_loading_then_success() {
        let bridge = Arc::new(FakeBridge::default());
        let (desktop, _dir) = desktop(&bridge).await;
        let mut rx = desktop.subscribe();

        desktop.apply("https://images.example.com/1.jpg").await.unwrap();

        let kinds: Vec<_> = drain(&mut rx).into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Loading, ToastKind::Success]);
        assert_eq!(bridge.calls(), vec!["apply_wallpaper https://images.example.com/1.jpg"]);
    }

    #[tokio::test]
    async fn test_failed_apply_emits_error() {
        let bridge = Arc::new(FakeBridge::default());
        bridge.fail("apply_wallpaper");
        let (desktop, _dir) = desktop(&bridge).await;
        let mut rx = desktop.subscribe();

        assert!(desktop.apply("/tmp/a.jpg").await.is_err());

        let toasts = drain(&mut rx);
        assert_eq!(toasts.last().unwrap().kind, ToastKind::Error);
        assert!(toasts.last().unwrap().message.starts_with("Failed to apply wallpaper"));
    }

    #[tokio::test]
    async fn test_download_reports_saved_path() {
        let bridge = Arc::new(FakeBridge::default());
        let (desktop, _dir) = desktop(&bridge).await;
        let mut rx = desktop.subscribe();

        let path = desktop
            .download("https://images.example.com/2.jpg", "Desert Dunes")
            .await
            .unwrap();

        assert!(path.starts_with("/home/user/Downloads/Desert_Dunes_"));
        let last = drain(&mut rx).pop().unwrap();
        assert_eq!(last.kind, ToastKind::Success);
        assert_eq!(last.message, format!("Saved to {path}"));
    }

    #[tokio::test]
    async fn test_rotation_start_and_stop() {
        let bridge = Arc::new(FakeBridge::default());
        let (desktop, _dir) = desktop(&bridge).await;

        desktop.start_rotation(vec!["/tmp/a.jpg".into(), "/tmp/b.jpg".into()], 300).await.unwrap();
        {
            let state = bridge.state.lock().unwrap();
            let (paths, interval, window) = state.rotation.as_ref().unwrap();
            assert_eq!(paths.len(), 2);
            assert_eq!(*interval, 300);
            assert_eq!(window, "main");
        }

        let mut rx = desktop.subscribe();
        desktop.stop_rotation().await.unwrap();
        assert!(bridge.state.lock().unwrap().rotation.is_none());

        let toasts = drain(&mut rx);
        let kinds: Vec<_> = toasts.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Loading, ToastKind::Success]);
        assert_eq!(toasts[0].message, "Stopping wallpaper rotation...");
    }

    #[tokio::test]
    async fn test_rotation_without_paths_is_error_toast() {
        let bridge = Arc::new(FakeBridge::default());
        let (desktop, _dir) = desktop(&bridge).await;
        let mut rx = desktop.subscribe();

        assert!(desktop.start_rotation(Vec::new(), 60).await.is_err());
        assert_eq!(drain(&mut rx).last().unwrap().kind, ToastKind::Error);
        assert!(bridge.calls().is_empty());
    }
}
