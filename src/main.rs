//! ToastShift - put Windows notification toasts where you want them
//!
//! Windows pins notification popups to the bottom-right corner and offers no
//! way to move them. ToastShift watches for the Action Center toast window
//! (and Teams notification popups) from the system tray and relocates them
//! to a user-chosen monitor and position, with optional transparency and
//! click-through.

#![windows_subsystem = "windows"]

mod error;
mod geometry;
mod locale;
mod locator;
mod monitor;
mod poller;
mod settings;
mod utils;

#[cfg(windows)]
mod app;
#[cfg(windows)]
mod mutator;
#[cfg(windows)]
mod state;
#[cfg(windows)]
mod tray;
#[cfg(windows)]
mod ui;

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use log::{info, LevelFilter};

    use crate::app::{Application, InstanceLock};
    use crate::locale::LocaleTable;

    // Initialize logging
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .format_timestamp_millis()
        .init();

    info!("Starting ToastShift v{}", env!("CARGO_PKG_VERSION"));

    let _instance = match InstanceLock::acquire()? {
        Some(lock) => lock,
        None => return Ok(()),
    };

    // The toast can only be found by its localized title, so an unsupported
    // display language means we would never match anything. Refuse loudly
    // instead of idling forever.
    let table = LocaleTable::load();
    let language = locale::system_language_code();
    let toast_title = match table.title_for(&language) {
        Some(title) => {
            info!("Locale \"{}\" -> toast title \"{}\"", language, title);
            title.to_string()
        }
        None => {
            crate::utils::alert(
                "ToastShift",
                &format!(
                    "Your display language (\"{}\") is not supported yet.\n\
                     Add its toast title to {:?} to enable it.",
                    language,
                    LocaleTable::overrides_path(),
                ),
                windows::Win32::UI::WindowsAndMessaging::MB_ICONERROR,
            );
            return Ok(());
        }
    };

    let mut app = Application::new(toast_title)?;
    app.run()?;

    info!("ToastShift shutting down gracefully");
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("ToastShift manages native Windows notification popups and only runs on Windows.");
}
