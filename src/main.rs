// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Folio - Main Entry Point
//!
//! A desktop notes browser: a folder of markdown notes, opened in tabs and
//! saved automatically. Built with Rust and egui.

mod app;
mod config;
mod editor;
mod error;
mod files;
mod remote;
mod search;
mod session;
mod state;
mod storage;
mod tree;
mod ui;

use app::{FolioApp, APP_NAME};
use config::load_config;
use files::dialogs::open_folder_dialog;
use log::{info, warn};
use std::path::PathBuf;

/// Pick the notes folder: the first command line argument, then the folder
/// from the last run, then a native folder picker.
fn resolve_notes_root(last: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(arg) = std::env::args_os().nth(1) {
        let path = PathBuf::from(arg);
        if path.is_dir() {
            return Some(path);
        }
        warn!("{} is not a folder, ignoring it", path.display());
    }

    if let Some(path) = last.filter(|p| p.is_dir()) {
        return Some(path.clone());
    }

    open_folder_dialog(last)
}

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let settings = load_config();

    let Some(notes_root) = resolve_notes_root(settings.notes_root.as_ref()) else {
        info!("No notes folder chosen, exiting");
        return Ok(());
    };
    let notes_root = notes_root.canonicalize().unwrap_or(notes_root);

    let window_size = settings.window_size;
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
        Box::new(move |cc| Ok(Box::new(FolioApp::new(cc, notes_root, settings)))),
    )
}
