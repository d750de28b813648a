use crate::component::{LibraryEditor, MediaGrabber};
use crate::config::Config;
use crate::error::AppResult;
use crate::pause;
use console::{Term, style};
use log::warn;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Fatal errors end the program; anything else is shown and the menu resumes.
fn report(result: AppResult<()>) -> AppResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!("Run failed: {e}");
            eprintln!("{} {e}", style(t!("common.error_prefix")).red().bold());
            Ok(())
        }
    }
}

pub fn run_media_grabber(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> AppResult<()> {
    let grabber = MediaGrabber::new(config.clone(), Arc::clone(shutdown_signal));
    report(grabber.run().map(|_| ()))?;

    pause(term)?;
    Ok(())
}

pub fn run_library_editor(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> AppResult<()> {
    let editor = LibraryEditor::new(config.clone(), Arc::clone(shutdown_signal));
    report(editor.run())?;

    pause(term)?;
    Ok(())
}
