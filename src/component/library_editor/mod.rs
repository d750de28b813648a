//! Edit MP3 files already in the save directory

mod library;
mod main;

pub use library::{RenameOutcome, list_mp3_files, rename_in_place};
pub use main::LibraryEditor;
