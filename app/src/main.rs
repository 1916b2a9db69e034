use std::env;

use tracing::Level;

use bottleprint_core::{targets, KioskConfig, DEFAULT_CONFIG_PATH};
use bottleprint_ui::logging::{init_logging, LogLevel, LogStore};
use bottleprint_ui::{run, Flags, UiResult};

fn main() -> UiResult {
    let log_store = LogStore::with_capacity(2000);
    let reload_handle = init_logging(log_store.clone(), LogLevel::Info);

    tracing::info!(target: targets::UI, "BottlePrint starting");
    tracing::event!(target: targets::UI, Level::DEBUG, "Logging infrastructure online");

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match KioskConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(
                target: targets::CONFIG,
                path = %config_path,
                detail = %error.technical_detail(),
                "{}",
                error.user_summary()
            );
            KioskConfig::default()
        }
    };

    run(Flags {
        log_store,
        reload_handle,
        config,
    })
}
