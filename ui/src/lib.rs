pub mod app;
mod executor;
pub mod logging;

use iced::{Application, Size};

pub use app::{Flags, KioskApp};
pub use logging::{
    apply_log_level, init_logging, LogEntry, LogLevel, LogStore, ReloadHandle,
};

pub type UiResult = iced::Result;

const WINDOW_SIZE: Size = Size::new(420.0, 860.0);

pub fn run(flags: Flags) -> UiResult {
    let mut settings = iced::Settings::with_flags(flags);
    settings.window.size = WINDOW_SIZE;
    KioskApp::run(settings)
}
