//! Prompt helpers with a cooperative Ctrl-C check at every input boundary

use crate::error::{AppError, AppResult};
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::info;
use rust_i18n::t;
use std::fmt::Display;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// How many times a prompt is repeated after unparsable input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Unbounded,
    /// Total number of attempts, including the first.
    Bounded(u32),
}

impl RetryPolicy {
    const fn allows(&self, attempt: u32) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded(max) => attempt < *max,
        }
    }
}

/// Read and parse until `parse` succeeds or the policy runs out.
/// Returns the last parse error once attempts are exhausted.
pub fn retry_parse<T, E, R>(
    policy: RetryPolicy,
    mut read: R,
    parse: impl Fn(&str) -> Result<T, E>,
    mut on_error: impl FnMut(&E),
) -> AppResult<T>
where
    R: FnMut() -> AppResult<String>,
    AppError: From<E>,
{
    let mut attempt = 0;
    loop {
        let raw = read()?;
        attempt += 1;
        match parse(&raw) {
            Ok(value) => return Ok(value),
            Err(e) if policy.allows(attempt) => on_error(&e),
            Err(e) => return Err(e.into()),
        }
    }
}

fn is_interrupt(err: &dialoguer::Error) -> bool {
    matches!(err, dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted)
}

/// Ask until an answer arrives. A Ctrl-C during the read calls
/// `confirm_quit`: yes cancels the run, no asks again.
pub fn ask_interruptible<T>(
    mut ask: impl FnMut() -> Result<T, dialoguer::Error>,
    mut confirm_quit: impl FnMut() -> AppResult<bool>,
) -> AppResult<T> {
    loop {
        match ask() {
            Ok(answer) => return Ok(answer),
            Err(e) if is_interrupt(&e) => {
                if confirm_quit()? {
                    info!("User confirmed quit");
                    return Err(AppError::Cancelled);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

pub struct Prompter {
    term: Term,
    shutdown_signal: Arc<AtomicBool>,
}

impl Prompter {
    #[must_use]
    pub const fn new(term: Term, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            term,
            shutdown_signal,
        }
    }

    #[must_use]
    pub const fn term(&self) -> &Term {
        &self.term
    }

    #[must_use]
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_signal)
    }

    /// If Ctrl-C was pressed since the last check, ask whether to quit.
    pub fn checkpoint(&self) -> AppResult<()> {
        if !self.shutdown_signal.load(Ordering::SeqCst) {
            return Ok(());
        }
        if self.confirm_quit()? {
            info!("User confirmed quit");
            return Err(AppError::Cancelled);
        }
        Ok(())
    }

    fn confirm_quit(&self) -> AppResult<bool> {
        self.shutdown_signal.store(false, Ordering::SeqCst);
        match Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("prompt.confirm_quit"))
            .default(true)
            .interact_on(&self.term)
        {
            Ok(quit) => Ok(quit),
            // a second Ctrl-C answers yes
            Err(e) if is_interrupt(&e) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    pub fn confirm(&self, prompt: impl Display) -> AppResult<bool> {
        self.checkpoint()?;
        let prompt = prompt.to_string();
        ask_interruptible(
            || {
                Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(prompt.as_str())
                    .default(false)
                    .interact_on(&self.term)
            },
            || self.confirm_quit(),
        )
    }

    /// Free text; blank input is allowed and returned trimmed.
    pub fn text(&self, prompt: impl Display) -> AppResult<String> {
        self.checkpoint()?;
        let prompt = prompt.to_string();
        let value: String = ask_interruptible(
            || {
                Input::with_theme(&ColorfulTheme::default())
                    .with_prompt(prompt.as_str())
                    .allow_empty(true)
                    .interact_text_on(&self.term)
            },
            || self.confirm_quit(),
        )?;
        Ok(value.trim().to_string())
    }

    /// `None` when the user presses Esc.
    pub fn select<T: Display>(
        &self,
        prompt: impl Display,
        items: &[T],
    ) -> AppResult<Option<usize>> {
        self.checkpoint()?;
        let prompt = prompt.to_string();
        ask_interruptible(
            || {
                Select::with_theme(&ColorfulTheme::default())
                    .with_prompt(prompt.as_str())
                    .items(items)
                    .default(0)
                    .interact_on_opt(&self.term)
            },
            || self.confirm_quit(),
        )
    }

    /// Text prompt repeated under `policy` until `parse` accepts it.
    pub fn parse_with_retry<T, E>(
        &self,
        prompt: impl Display,
        policy: RetryPolicy,
        parse: impl Fn(&str) -> Result<T, E>,
    ) -> AppResult<T>
    where
        E: Display,
        AppError: From<E>,
    {
        let prompt = prompt.to_string();
        retry_parse(
            policy,
            || self.text(&prompt),
            parse,
            |e| eprintln!("{} {e}", style(t!("prompt.try_again")).yellow()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FormatError, timecode};
    use std::collections::VecDeque;

    fn reader(inputs: &[&str]) -> impl FnMut() -> AppResult<String> {
        let mut queue: VecDeque<String> = inputs.iter().map(|s| (*s).to_string()).collect();
        move || Ok(queue.pop_front().unwrap_or_default())
    }

    #[test]
    fn test_retry_until_valid() {
        let mut errors = 0;
        let value = retry_parse(
            RetryPolicy::Unbounded,
            reader(&["abc", "1:2:3", "1:30"]),
            timecode::parse,
            |_: &FormatError| errors += 1,
        )
        .unwrap();
        assert!((value - 90.0).abs() < f64::EPSILON);
        assert_eq!(errors, 2);
    }

    #[test]
    fn test_bounded_policy_gives_up() {
        let mut errors = 0;
        let result = retry_parse(
            RetryPolicy::Bounded(3),
            reader(&["x", "y", "z", "10"]),
            timecode::parse,
            |_: &FormatError| errors += 1,
        );
        assert!(matches!(result, Err(AppError::Format(_))));
        assert_eq!(errors, 2);
    }

    #[test]
    fn test_bounded_single_attempt() {
        let result = retry_parse(
            RetryPolicy::Bounded(1),
            reader(&["bad"]),
            timecode::parse,
            |_: &FormatError| panic!("no retry expected"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_first_valid_input_wins() {
        let value = retry_parse(
            RetryPolicy::Bounded(2),
            reader(&[""]),
            timecode::parse,
            |_: &FormatError| {},
        )
        .unwrap();
        assert!(value.abs() < f64::EPSILON);
    }

    #[test]
    fn test_read_errors_propagate() {
        let result = retry_parse(
            RetryPolicy::Unbounded,
            || Err(AppError::Cancelled),
            timecode::parse,
            |_: &FormatError| {},
        );
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    fn interrupted() -> dialoguer::Error {
        dialoguer::Error::IO(io::Error::new(io::ErrorKind::Interrupted, "ctrl-c"))
    }

    #[test]
    fn test_interrupt_declined_asks_again() {
        let mut asked = 0;
        let mut confirmations = 0;
        let answer = ask_interruptible(
            || {
                asked += 1;
                if asked == 1 {
                    Err(interrupted())
                } else {
                    Ok("1:30".to_string())
                }
            },
            || {
                confirmations += 1;
                Ok(false)
            },
        )
        .unwrap();
        assert_eq!(answer, "1:30");
        assert_eq!(asked, 2);
        assert_eq!(confirmations, 1);
    }

    #[test]
    fn test_interrupt_confirmed_cancels() {
        let result: AppResult<bool> = ask_interruptible(|| Err(interrupted()), || Ok(true));
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[test]
    fn test_other_prompt_errors_pass_through() {
        let result: AppResult<bool> = ask_interruptible(
            || {
                Err(dialoguer::Error::IO(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "closed",
                )))
            },
            || panic!("no quit confirmation expected"),
        );
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }
}
