use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(120);

#[must_use]
pub fn spinner(message: impl Display) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(TICK);
    bar
}

/// Run `task` behind a spinner that is cleared when it returns.
pub fn with_spinner<T>(message: impl Display, task: impl FnOnce() -> T) -> T {
    let bar = spinner(message);
    let result = task();
    bar.finish_and_clear();
    result
}
