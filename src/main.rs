// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Quillpad - Main Entry Point
//!
//! A markdown editor with structural table editing. Built with Rust and egui.

mod app;
mod preview;

use app::QuillpadApp;
use log::{info, warn};
use quillpad::config::PreferenceStore;

/// Application name constant.
const APP_NAME: &str = "Quillpad";

/// Preferences file used when the platform has no config directory.
fn fallback_preferences_path() -> std::path::PathBuf {
    std::env::temp_dir().join("quillpad").join("config.json")
}

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let preferences = PreferenceStore::open_default().unwrap_or_else(|e| {
        warn!("{}; keeping preferences in a temporary location", e);
        PreferenceStore::open(fallback_preferences_path())
    });
    let window_size = preferences.settings().window_size;

    info!(
        "Window configuration: {}x{}, maximized: {}",
        window_size.width, window_size.height, window_size.maximized
    );

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([400.0, 300.0])
        .with_maximized(window_size.maximized);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(QuillpadApp::new(cc, preferences)))),
    )
}
