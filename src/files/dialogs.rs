//! Native file dialog integration using the rfd crate

use rfd::FileDialog;
use std::path::PathBuf;

/// Opens a native folder picker for choosing the notes folder.
///
/// Returns `Some(PathBuf)` if a folder was selected, `None` if cancelled.
pub fn open_folder_dialog(initial_dir: Option<&PathBuf>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new().set_title("Open Notes Folder");

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_folder()
}
