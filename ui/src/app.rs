mod actions;
mod helpers;
mod styles;
mod tasks;
mod types;
mod views;

use std::collections::HashSet;
use std::time::Duration;

use iced::theme;
use iced::widget::{column, container};
use iced::{Application, Command, Element, Length, Subscription, Theme};

use bottleprint_core::{
    targets, DesignCatalog, Error, ImpactStats, JobFlow, KioskConfig, SyncEvent, SyncTicket,
};

use crate::logging::{apply_log_level, LogEntry, LogLevel, LogStore, ReloadHandle};

use self::helpers::palette;
use self::types::Banner;

pub use self::types::{ErrorInfo, Flags, Message, Tab};

pub struct KioskApp {
    log_store: LogStore,
    reload_handle: ReloadHandle,
    log_entries: Vec<LogEntry>,
    log_level: LogLevel,
    known_targets: HashSet<String>,
    enabled_targets: HashSet<String>,
    copy_status: Option<String>,
    active_tab: Tab,
    config: KioskConfig,
    catalog: DesignCatalog,
    flow: JobFlow,
    impact: ImpactStats,
    qr_text: Option<String>,
    banner: Option<Banner>,
    last_error: Option<ErrorInfo>,
}

impl Application for KioskApp {
    type Executor = crate::executor::KioskExecutor;
    type Message = Message;
    type Theme = Theme;
    type Flags = Flags;

    fn new(flags: Flags) -> (Self, Command<Message>) {
        let known_targets: HashSet<String> =
            targets::ALL.iter().map(|value| value.to_string()).collect();
        let enabled_targets = known_targets.clone();
        let config = flags.config;
        let catalog = config.catalog();
        let impact = config.impact.clone();

        tracing::info!(
            target: targets::UI,
            designs = catalog.designs().len(),
            stages = config.sync.stage_count(),
            "Kiosk started"
        );

        (
            Self {
                log_store: flags.log_store,
                reload_handle: flags.reload_handle,
                log_entries: Vec::new(),
                log_level: LogLevel::default(),
                known_targets,
                enabled_targets,
                copy_status: None,
                active_tab: Tab::Dashboard,
                config,
                catalog,
                flow: JobFlow::new(),
                impact,
                qr_text: None,
                banner: None,
                last_error: None,
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        "BottlePrint".to_string()
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::LogTick => {
                self.refresh_logs();
                Command::none()
            }
            Message::LogLevelChanged(level) => {
                self.log_level = level;
                apply_log_level(&self.reload_handle, level);
                tracing::info!(target: targets::UI, "Log level set to {}", level);
                Command::none()
            }
            Message::ToggleTarget(target, enabled) => {
                if enabled {
                    self.enabled_targets.insert(target);
                } else {
                    self.enabled_targets.remove(&target);
                }
                Command::none()
            }
            Message::CopyDiagnostics => {
                self.copy_status = Some(self.copy_diagnostics());
                Command::none()
            }
            Message::SelectTab(tab) => {
                self.select_tab(tab);
                Command::none()
            }
            Message::SelectDesign(id) => {
                self.select_design(id);
                Command::none()
            }
            Message::UploadCustom => self.begin_upload(),
            Message::AnalysisFinished { ticket, result } => {
                self.finish_analysis(ticket, result);
                Command::none()
            }
            Message::Back => {
                self.reset_flow();
                Command::none()
            }
            Message::Confirm => {
                self.confirm_job();
                Command::none()
            }
            Message::StartSync => {
                if let Err(error) = self.flow.start_sync() {
                    self.report_error(&error);
                }
                Command::none()
            }
            Message::SyncProgress { ticket, event } => {
                self.apply_sync_event(ticket, event);
                Command::none()
            }
            Message::DismissBanner => {
                self.banner = None;
                Command::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let log_tick = iced::time::every(Duration::from_millis(250)).map(|_| Message::LogTick);
        let sync_feed = match self.flow.sync_ticket() {
            Some(ticket) => tasks::sync_subscription(ticket, self.config.sync.clone()),
            None => Subscription::none(),
        };
        Subscription::batch(vec![log_tick, sync_feed])
    }

    fn view(&self) -> Element<'_, Message> {
        let body = match self.active_tab {
            Tab::Dashboard => self.dashboard_view(),
            Tab::Print => self.print_view(),
            Tab::Diagnostics => self.diagnostics_view(),
        };

        let mut content = column![].spacing(16).padding(16);
        if let Some(banner) = &self.banner {
            content = content.push(self.banner_view(banner));
        }
        content = content
            .push(container(body).height(Length::Fill))
            .push(self.tab_bar());

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(theme::Container::Custom(Box::new(styles::PageStyle {
                background: palette::background(),
            })))
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl KioskApp {
    fn report_error(&mut self, error: &Error) {
        let info = ErrorInfo::from(error);
        tracing::warn!(
            target: targets::UI,
            detail = %info.detail,
            "{}",
            info.summary
        );
        self.banner = Some(Banner::failure(&info));
        self.last_error = Some(info);
    }

    fn apply_sync_event(&mut self, ticket: SyncTicket, event: SyncEvent) {
        match event {
            SyncEvent::Stage(step) => {
                // Late stages from a replaced run are dropped by the flow.
                let _ = self.flow.record_sync_step(ticket, step.index);
            }
            SyncEvent::Completed(notice) => {
                if let Ok(job) = self.flow.complete_sync(ticket) {
                    self.impact.record_print(&job);
                    self.qr_text = None;
                    tracing::info!(
                        target: targets::UI,
                        job = %job.id(),
                        bottles = self.impact.bottles,
                        prints = self.impact.prints,
                        "Print started"
                    );
                    self.banner = Some(Banner::success(notice));
                }
            }
            SyncEvent::Interrupted { .. } => {
                if self.flow.sync_ticket() == Some(ticket) {
                    self.reset_flow();
                }
            }
        }
    }
}
