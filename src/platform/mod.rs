//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging setup
//! - Storage (LocalStorage on web, files on native)

#[cfg(target_arch = "wasm32")]
pub mod storage;

/// Install the logger for the current target
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
}

/// Install the logger for the current target (`RUST_LOG` overrides `info`)
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
