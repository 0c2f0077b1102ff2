//! # Host Desktop Helpers
//!
//! Small wrappers around desktop tools that work the same whether the app runs
//! natively or inside a Flatpak sandbox: desktop notifications and the
//! platform's light/dark preference.

use std::path::PathBuf;
use std::process::{Child, Command, Output};

/// Checks if running inside a Flatpak sandbox.
pub fn is_flatpak() -> bool {
    std::path::Path::new("/.flatpak-info").exists()
}

/// Runs a command on the host, via `flatpak-spawn --host` when sandboxed.
pub fn run_host_command(cmd: &str, args: &[&str]) -> std::io::Result<Output> {
    if is_flatpak() {
        let mut spawn_args = vec!["--host", cmd];
        spawn_args.extend(args);
        Command::new("flatpak-spawn").args(&spawn_args).output()
    } else {
        Command::new(cmd).args(args).output()
    }
}

/// Like [`run_host_command`] but doesn't wait for the command to finish.
pub fn spawn_host_command(cmd: &str, args: &[&str]) -> std::io::Result<Child> {
    if is_flatpak() {
        let mut spawn_args = vec!["--host", cmd];
        spawn_args.extend(args);
        Command::new("flatpak-spawn").args(&spawn_args).spawn()
    } else {
        Command::new(cmd).args(args).spawn()
    }
}

/// Shows a desktop notification through `notify-send`.
///
/// Failures are logged and otherwise ignored; a missing notification daemon
/// must not break the action that triggered it.
pub fn notify(title: &str, body: &str, critical: bool) {
    let urgency = if critical { "critical" } else { "normal" };
    let args = [
        "-u",
        urgency,
        "-i",
        "preferences-desktop-wallpaper",
        "-a",
        "Wallpaper Remix",
        title,
        body,
    ];
    if let Err(e) = spawn_host_command("notify-send", &args) {
        tracing::debug!("notify-send unavailable: {e}");
    }
}

/// COSMIC's dark mode flag file.
fn cosmic_theme_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cosmic/com.system76.CosmicTheme.Mode/v1/is_dark"))
}

/// Interprets the output of the portal `color-scheme` read.
///
/// The portal answers 1 for dark, 2 for light and 0 for no preference.
fn parse_color_scheme(stdout: &str) -> Option<bool> {
    if stdout.contains("uint32 1") {
        Some(true)
    } else if stdout.contains("uint32 2") {
        Some(false)
    } else {
        None
    }
}

/// Whether the desktop prefers a dark theme.
///
/// Reads COSMIC's config first, then asks the freedesktop portal. Light when
/// neither has an answer.
pub fn system_prefers_dark() -> bool {
    if let Some(content) = cosmic_theme_path().and_then(|p| std::fs::read_to_string(p).ok()) {
        return content.trim() == "true";
    }

    let portal = run_host_command(
        "gdbus",
        &[
            "call", "--session",
            "--dest", "org.freedesktop.portal.Desktop",
            "--object-path", "/org/freedesktop/portal/desktop",
            "--method", "org.freedesktop.portal.Settings.Read",
            "org.freedesktop.appearance", "color-scheme",
        ],
    );
    if let Ok(output) = portal {
        if let Some(dark) = parse_color_scheme(&String::from_utf8_lossy(&output.stdout)) {
            return dark;
        }
    }

    false
}
