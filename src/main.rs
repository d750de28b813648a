use console::{Term, style};
use log::{error, info};
use rust_i18n::t;
use std::process::ExitCode;
use tubeclip::config::types::Config;
use tubeclip::init;
use tubeclip::menu::show_main_menu;
use tubeclip::signal::setup_shutdown_signal;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> ExitCode {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();

    let mut config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Startup failed: {e}");
            eprintln!("{} {e}", style(t!("main_menu.error_prefix")).red().bold());
            return e.exit_code();
        }
    };
    rust_i18n::set_locale(config.settings.language.as_str());

    loop {
        match show_main_menu(&term, &shutdown_signal, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                let _ = term.clear_screen();
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                error!("Program error: {e}");
                eprintln!("{} {e}", style(t!("main_menu.error_prefix")).red().bold());
                return e.exit_code();
            }
        }
    }
}
