//! # Wallpaper Remix
//!
//! Client core of a wallpaper browser. The host shell (reached over D-Bus)
//! owns the wallpaper database, downloads and the desktop background; this
//! binary keeps a synchronized local view of it.
//!
//! ## CLI Usage
//! See `--help`.

use std::sync::Arc;

use futures_util::StreamExt;

use wallpaper_remix::bridge::Bridge;
use wallpaper_remix::config::Config;
use wallpaper_remix::dbus_client::{self, DbusBridge};
use wallpaper_remix::desktop::{Desktop, Toast, ToastKind};
use wallpaper_remix::error::{AppError, Result};
use wallpaper_remix::gallery::{self, Gallery};
use wallpaper_remix::providers::{LanguageProvider, LocalPreferences, ThemeProvider};
use wallpaper_remix::settings::{SettingKey, SettingValue};
use wallpaper_remix::state::StateContainer;
use wallpaper_remix::store::JsonStore;
use wallpaper_remix::{catalog, host, logging, mock_api};

/// Application entry point. Dispatches on the first argument.
fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("--sync");

    match command {
        "--help" | "-h" => {
            print_help(&args[0]);
            return;
        }
        "--version" | "-v" => {
            println!("wallpaper-remix {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {}
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(command, args.get(2..).unwrap_or_default())) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Prints help message
fn print_help(program: &str) {
    println!("Wallpaper Remix\n");
    println!("Usage: {} [OPTIONS]\n", program);
    println!("Options:");
    println!("  (none), --sync              Sync with the host shell and print a summary");
    println!("  --browse [category]         List wallpapers, optionally filtered by category");
    println!("  --favorite <id> <true|false>  Set or clear a favorite");
    println!("  --unfavorite <id>           Remove a favorite");
    println!("  --set <key> <value>         Change a setting (e.g. appTheme dark)");
    println!("  --reset-settings            Restore default settings");
    println!("  --apply <url>               Set a wallpaper as desktop background");
    println!("  --download <url> [title]    Download a wallpaper");
    println!("  --rotate <secs> <paths...>  Rotate through wallpapers");
    println!("  --stop-rotation             Stop rotating");
    println!("  --watch                     Print rotation steps as they happen");
    println!("  --count                     Number of wallpapers in the host database");
    println!("  --prune <keep>              Keep favorites plus the newest <keep> wallpapers");
    println!("  --catalog                   List the catalog API's wallpapers");
    println!("  --mock-api, -m              Run the mock catalog API");
    println!("  --version, -v               Show version information");
    println!("  --help, -h                  Show this help message");
    println!();
    println!("The host shell must be registered on the session bus as");
    println!("{}.", dbus_client::SERVICE_NAME);
}

fn arg<'a>(rest: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    rest.get(index)
        .map(String::as_str)
        .ok_or_else(|| AppError::InvalidArguments(format!("Missing argument: <{name}>")))
}

fn parse_arg<T: std::str::FromStr>(rest: &[String], index: usize, name: &str) -> Result<T> {
    let raw = arg(rest, index, name)?;
    raw.parse()
        .map_err(|_| AppError::InvalidArguments(format!("Invalid <{name}>: {raw}")))
}

async fn run(command: &str, rest: &[String]) -> Result<()> {
    let config = Config::load_or_init();

    // Commands that don't need the host shell
    match command {
        "--mock-api" | "-m" => return mock_api::serve(config.mock_api_port).await,
        "--catalog" => {
            let wallpapers = catalog::fetch_catalog(&config.catalog_url).await?;
            for wp in &wallpapers {
                println!("{}  {}  [{}]", wp.id, wp.title, wp.tags);
            }
            return Ok(());
        }
        _ => {}
    }

    if !dbus_client::is_service_available().await {
        tracing::warn!("{} is not registered on the session bus", dbus_client::SERVICE_NAME);
    }
    let dbus = Arc::new(DbusBridge::connect_or_start().await?);
    let bridge: Arc<dyn Bridge> = dbus.clone();
    let store = JsonStore::load(config.store_path()?).await;
    let state = Arc::new(StateContainer::new(bridge, store, &config));
    state.load_persisted_state().await;

    match command {
        "--sync" => {
            sync(&state, &config).await;
            print_summary(&state);
        }
        "--browse" => {
            sync(&state, &config).await;
            let mut page = Gallery::home(&state.snapshot(), &config);
            if let Some(category) = rest.first() {
                page.select_category(&gallery::slug(category));
            }
            while page.has_more() {
                page.load_more().await;
            }
            for wp in page.visible() {
                let star = if wp.is_favorite() { "*" } else { " " };
                println!("{star} {}  {}  {}x{}", wp.id, wp.title, wp.width, wp.height);
            }
        }
        "--favorite" => {
            let id = arg(rest, 0, "id")?;
            let is_favorite: bool = parse_arg(rest, 1, "true|false")?;
            state.update_favorite(id, is_favorite).await?;
            println!("{} favorites", state.snapshot().favorites.len());
        }
        "--unfavorite" => {
            state.delete_favorite_wallpaper(arg(rest, 0, "id")?).await?;
            println!("{} favorites", state.snapshot().favorites.len());
        }
        "--set" => {
            let key: SettingKey = arg(rest, 0, "key")?.parse()?;
            let value = SettingValue::parse_for(key, arg(rest, 1, "value")?)?;
            state.fetch_setting().await?;
            match key {
                SettingKey::AppTheme if value == SettingValue::from("system") => {
                    state.update_setting(key, value, key.default_category()).await?
                }
                SettingKey::AppTheme => {
                    let theme = ThemeProvider::new(
                        state.clone(),
                        LocalPreferences::default_path(),
                        host::system_prefers_dark(),
                    );
                    theme.set_dark_mode(value == SettingValue::from("dark")).await?
                }
                SettingKey::Language => {
                    let language =
                        LanguageProvider::new(state.clone(), LocalPreferences::default_path());
                    if let SettingValue::Text(code) = &value {
                        language.set_language(code).await?;
                    }
                }
                _ => state.update_setting(key, value, key.default_category()).await?,
            }
            println!("{key} = {}", state.settings().get(key).to_wire());
        }
        "--reset-settings" => {
            state.reset_settings().await?;
            println!("Settings reset");
        }
        "--apply" | "--download" | "--rotate" | "--stop-rotation" => {
            // Only needed for the notifications flag
            let _ = state.fetch_setting().await;
            let desktop = Desktop::new(state.clone(), config.rotation_window.clone());
            let mut toasts = desktop.subscribe();
            let result = match command {
                "--apply" => desktop.apply(arg(rest, 0, "url")?).await,
                "--download" => {
                    let url = arg(rest, 0, "url")?;
                    let title = rest.get(1).map(String::as_str).unwrap_or("");
                    desktop.download(url, title).await.map(|_| ())
                }
                "--rotate" => {
                    let secs: u64 = parse_arg(rest, 0, "secs")?;
                    desktop.start_rotation(rest[1..].to_vec(), secs).await
                }
                _ => desktop.stop_rotation().await,
            };
            let notifications = state.settings().notifications;
            while let Ok(toast) = toasts.try_recv() {
                show_toast(&toast, notifications);
            }
            result?;
        }
        "--watch" => {
            let mut stream = dbus.subscribe_wallpaper_rotated().await?;
            println!("Watching for rotation steps (Ctrl+C to stop)");
            loop {
                tokio::select! {
                    signal = stream.next() => {
                        let Some(signal) = signal else { break };
                        let args = signal.args()?;
                        println!("{}", args.path());
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        "--count" => println!("{}", state.wallpaper_count().await?),
        "--prune" => {
            let keep: u32 = parse_arg(rest, 0, "keep")?;
            state.prune_wallpapers(keep).await?;
            println!("Pruned to {keep} wallpapers plus favorites");
        }
        other => {
            eprintln!("Unknown argument: {other}");
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Initial round-trip with the host shell. Each step records its own failure
/// in the state, so one failing command doesn't stop the others.
async fn sync(state: &StateContainer, config: &Config) {
    let _ = state.fetch_wallpapers(config.initial_page_size, 0).await;
    let _ = state.fetch_setting().await;
    let _ = state.fetch_favorite_wallpapers().await;
}

fn print_summary(state: &Arc<StateContainer>) {
    let snapshot = state.snapshot();
    let theme = ThemeProvider::new(
        state.clone(),
        LocalPreferences::default_path(),
        host::system_prefers_dark(),
    );
    let language = LanguageProvider::new(state.clone(), LocalPreferences::default_path());

    println!(
        "Wallpapers: {} (page {}, more: {})",
        snapshot.wallpapers.len(),
        snapshot.page,
        snapshot.has_more
    );
    println!("Favorites:  {}", snapshot.favorites.len());
    let categories: Vec<String> =
        gallery::categories(&snapshot.tags).into_iter().map(|c| c.name).collect();
    println!("Categories: {}", categories.join(", "));
    println!("Theme:      {}", if theme.is_dark_mode() { "dark" } else { "light" });
    println!("Language:   {} ({})", language.label(), language.language());
    if let Some(error) = &snapshot.error {
        println!("Last error: {error}");
    }
}

/// Prints a toast and mirrors finished ones as desktop notifications.
fn show_toast(toast: &Toast, notifications: bool) {
    match toast.kind {
        ToastKind::Loading => println!("{}", toast.message),
        ToastKind::Success => println!("{}", toast.message),
        ToastKind::Error => eprintln!("{}", toast.message),
    }
    if notifications && toast.kind != ToastKind::Loading {
        host::notify("Wallpaper Remix", &toast.message, toast.kind == ToastKind::Error);
    }
}
