use crate::config::save::save_settings;
use crate::config::types::{Config, Language};
use crate::config::SAVE_DIR_ENV;
use crate::error::{AppError, AppResult};
use crate::menu::handlers::{run_library_editor, run_media_grabber};
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::info;
use rust_i18n::t;
use std::env;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

const NOTICE_DELAY: Duration = Duration::from_secs(1);

/// Show the main menu once. `Ok(false)` means the user chose to exit.
pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> AppResult<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!(
        "{}",
        style(t!("main_menu.save_dir", dir = config.save_dir.display())).dim()
    );
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_download"),
        t!("main_menu.opt_edit"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_media_grabber(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_library_editor(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        // ESC or exit
        _ => Ok(false),
    }
}

fn show_settings_menu(term: &Term, config: &mut Config) -> AppResult<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_language"),
            t!("settings.opt_save_dir"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_language_menu(term, config)?,
            Some(1) => show_save_dir_menu(term, config)?,
            _ => break,
        }
    }

    Ok(())
}

fn show_language_menu(term: &Term, config: &mut Config) -> AppResult<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];
    let items: Vec<String> = languages.iter().map(Language::to_string).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];
    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        info!("Language set to {}", selected_lang.as_str());
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang
        );
        std::thread::sleep(NOTICE_DELAY);
    }

    Ok(())
}

fn show_save_dir_menu(term: &Term, config: &mut Config) -> AppResult<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.save_dir.title")).cyan().bold());
    println!(
        "\n{} {}",
        style(t!("settings.save_dir.current")).dim(),
        config.save_dir.display()
    );
    if env::var(SAVE_DIR_ENV).is_ok_and(|v| !v.trim().is_empty()) {
        println!(
            "{}",
            style(t!("settings.save_dir.env_override", var = SAVE_DIR_ENV)).yellow()
        );
    }
    println!();

    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.save_dir.prompt"))
        .with_initial_text(config.settings.save_dir.clone())
        .allow_empty(true)
        .interact_text_on(term)?;
    let raw = raw.trim();

    if raw.is_empty() || raw == config.settings.save_dir {
        return Ok(());
    }

    match resolve_save_dir(config, raw, |name| env::var(name).ok()) {
        Ok(resolved) => {
            save_settings(&resolved.settings)?;
            info!("Save directory set to {}", resolved.save_dir.display());
            println!(
                "\n{} {}",
                style(t!("settings.saved")).green(),
                resolved.save_dir.display()
            );
            *config = resolved;
        }
        Err(AppError::Configuration(reason)) => {
            println!("\n{} {reason}", style(t!("common.error_prefix")).red().bold());
        }
        Err(e) => return Err(e),
    }
    std::thread::sleep(NOTICE_DELAY);

    Ok(())
}

/// Settings with a new save directory, resolved the way startup does it:
/// a non-empty `SAVE_DIR` still wins for the running session.
fn resolve_save_dir(
    config: &Config,
    raw: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppResult<Config> {
    let mut settings = config.settings.clone();
    settings.save_dir = raw.to_string();
    let override_dir = lookup(SAVE_DIR_ENV);
    Config::resolve(settings, override_dir.as_deref(), lookup)
}
