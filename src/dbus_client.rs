//! # D-Bus Client Module
//!
//! Production [`Bridge`] implementation. The host shell registers the command
//! surface on the session bus; each bridge command is a D-Bus method with the
//! command's own name.
//!
//! Structured results (wallpaper lists, the settings table) travel as JSON
//! strings and are decoded here.
//!
//! ## Signal Handling
//!
//! ```ignore
//! let mut stream = client.subscribe_wallpaper_rotated().await?;
//! while let Some(signal) = stream.next().await {
//!     let args = signal.args()?;
//!     println!("Rotated to: {}", args.path());
//! }
//! ```

use async_trait::async_trait;
use zbus::{proxy, Connection};

use crate::bridge::Bridge;
use crate::error::{AppError, Result};
use crate::settings::RawSettings;
use crate::wallpaper::Wallpaper;

/// Well-known bus name of the host shell.
pub const SERVICE_NAME: &str = "io.github.wallpaper_remix.Bridge1";

/// Object path the host shell serves the command interface on.
pub const OBJECT_PATH: &str = "/io/github/wallpaper_remix/Bridge1";

/// D-Bus proxy for the host shell's command interface
#[proxy(
    interface = "io.github.wallpaper_remix.Bridge1",
    default_service = "io.github.wallpaper_remix.Bridge1",
    default_path = "/io/github/wallpaper_remix/Bridge1"
)]
trait HostCommands {
    /// One page of the collection as a JSON array
    #[zbus(name = "get_wallpapers")]
    async fn get_wallpapers(&self, limit: u32, offset: u32) -> zbus::Result<String>;

    #[zbus(name = "update_favorite_command")]
    async fn update_favorite_command(&self, id: &str, is_favorite: bool) -> zbus::Result<()>;

    #[zbus(name = "delete_favorite_wallpaper_command")]
    async fn delete_favorite_wallpaper_command(&self, id: &str) -> zbus::Result<()>;

    /// Favorites as a JSON array
    #[zbus(name = "fetch_favorite_wallpapers")]
    async fn fetch_favorite_wallpapers(&self) -> zbus::Result<String>;

    /// Settings table as a JSON object
    #[zbus(name = "get_app_settings")]
    async fn get_app_settings(&self) -> zbus::Result<String>;

    #[zbus(name = "update_app_setting_command")]
    async fn update_app_setting_command(
        &self,
        key: &str,
        value: &str,
        category: &str,
    ) -> zbus::Result<()>;

    #[zbus(name = "reset_wallpaper_settings")]
    async fn reset_wallpaper_settings(&self) -> zbus::Result<()>;

    #[zbus(name = "apply_wallpaper")]
    async fn apply_wallpaper(&self, image_url: &str) -> zbus::Result<()>;

    /// Returns the path the host saved the file to
    #[zbus(name = "download_wallpaper")]
    async fn download_wallpaper(&self, url: &str, filename: &str) -> zbus::Result<String>;

    #[zbus(name = "start_wallpaper_rotation")]
    async fn start_wallpaper_rotation(
        &self,
        paths: &[&str],
        interval_sec: u64,
        window: &str,
    ) -> zbus::Result<()>;

    #[zbus(name = "stop_wallpaper_rotation")]
    async fn stop_wallpaper_rotation(&self) -> zbus::Result<()>;

    #[zbus(name = "get_wallpaper_count_command")]
    async fn get_wallpaper_count_command(&self) -> zbus::Result<u32>;

    #[zbus(name = "prune_wallpaper_db_command")]
    async fn prune_wallpaper_db_command(&self, limit: u32) -> zbus::Result<()>;

    // === Signals ===

    /// Emitted by the host on every rotation step
    #[zbus(signal, name = "WallpaperRotated")]
    async fn wallpaper_rotated(&self, path: String) -> zbus::Result<()>;
}

/// Bridge client talking to the host shell over the session bus
pub struct DbusBridge {
    proxy: HostCommandsProxy<'static>,
}

impl DbusBridge {
    /// Connect to the host shell
    ///
    /// Returns an error if the session bus is unreachable
    pub async fn connect() -> Result<Self> {
        let connection = Connection::session().await?;
        let proxy = HostCommandsProxy::new(&connection).await?;
        Ok(Self { proxy })
    }

    /// Try to connect, retrying once if the bus isn't immediately available
    pub async fn connect_or_start() -> Result<Self> {
        if let Ok(client) = Self::connect().await {
            return Ok(client);
        }

        // Host may still be starting
        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
        Self::connect().await
    }

    /// Subscribe to rotation step signals
    pub async fn subscribe_wallpaper_rotated(&self) -> Result<WallpaperRotatedStream<'static>> {
        Ok(self.proxy.receive_wallpaper_rotated().await?)
    }
}

fn decode_wallpapers(command: &str, json: &str) -> Result<Vec<Wallpaper>> {
    serde_json::from_str(json).map_err(|e| {
        AppError::Serialization(format!("{command} returned malformed wallpapers: {e}"))
    })
}

fn decode_settings(json: &str) -> Result<RawSettings> {
    serde_json::from_str(json).map_err(|e| {
        AppError::Serialization(format!("get_app_settings returned malformed settings: {e}"))
    })
}

#[async_trait]
impl Bridge for DbusBridge {
    async fn get_wallpapers(&self, limit: u32, offset: u32) -> Result<Vec<Wallpaper>> {
        let json = self.proxy.get_wallpapers(limit, offset).await?;
        decode_wallpapers("get_wallpapers", &json)
    }

    async fn update_favorite(&self, id: &str, is_favorite: bool) -> Result<()> {
        Ok(self.proxy.update_favorite_command(id, is_favorite).await?)
    }

    async fn delete_favorite_wallpaper(&self, id: &str) -> Result<()> {
        Ok(self.proxy.delete_favorite_wallpaper_command(id).await?)
    }

    async fn fetch_favorite_wallpapers(&self) -> Result<Vec<Wallpaper>> {
        let json = self.proxy.fetch_favorite_wallpapers().await?;
        decode_wallpapers("fetch_favorite_wallpapers", &json)
    }

    async fn get_app_settings(&self) -> Result<RawSettings> {
        let json = self.proxy.get_app_settings().await?;
        decode_settings(&json)
    }

    async fn update_app_setting(&self, key: &str, value: &str, category: &str) -> Result<()> {
        Ok(self.proxy.update_app_setting_command(key, value, category).await?)
    }

    async fn reset_wallpaper_settings(&self) -> Result<()> {
        Ok(self.proxy.reset_wallpaper_settings().await?)
    }

    async fn apply_wallpaper(&self, image_url: &str) -> Result<()> {
        Ok(self.proxy.apply_wallpaper(image_url).await?)
    }

    async fn download_wallpaper(&self, url: &str, filename: &str) -> Result<String> {
        Ok(self.proxy.download_wallpaper(url, filename).await?)
    }

    async fn start_wallpaper_rotation(
        &self,
        paths: &[String],
        interval_sec: u64,
        window: &str,
    ) -> Result<()> {
        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
        Ok(self.proxy.start_wallpaper_rotation(&paths, interval_sec, window).await?)
    }

    async fn stop_wallpaper_rotation(&self) -> Result<()> {
        Ok(self.proxy.stop_wallpaper_rotation().await?)
    }

    async fn wallpaper_count(&self) -> Result<u32> {
        Ok(self.proxy.get_wallpaper_count_command().await?)
    }

    async fn prune_wallpapers(&self, keep: u32) -> Result<()> {
        Ok(self.proxy.prune_wallpaper_db_command(keep).await?)
    }
}

/// Check if the host shell is running and registered on D-Bus
pub async fn is_service_available() -> bool {
    if let Ok(connection) = Connection::session().await {
        connection
            .call_method(
                Some("org.freedesktop.DBus"),
                "/org/freedesktop/DBus",
                Some("org.freedesktop.DBus"),
                "NameHasOwner",
                &SERVICE_NAME,
            )
            .await
            .and_then(|reply| reply.body().deserialize::<bool>())
            .unwrap_or(false)
    } else {
        false
    }
}
