use iced::Command;

use bottleprint_core::{targets, AnalysisReport, AnalysisTicket, DesignId, FlowStage};

use crate::app::tasks;
use crate::app::types::{Banner, ErrorInfo, Message, Tab};
use crate::app::KioskApp;
use crate::logging::LogEntry;

impl KioskApp {
    pub(crate) fn refresh_logs(&mut self) {
        let entries = self.log_store.recent();
        for entry in &entries {
            if self.known_targets.insert(entry.target.clone()) {
                self.enabled_targets.insert(entry.target.clone());
            }
        }
        self.log_entries = entries;
    }

    pub(crate) fn sorted_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.known_targets.iter().cloned().collect();
        targets.sort();
        targets
    }

    pub(crate) fn visible_entries(&self) -> Vec<&LogEntry> {
        self.log_entries
            .iter()
            .filter(|entry| self.enabled_targets.contains(&entry.target))
            .collect()
    }

    pub(crate) fn copy_diagnostics(&self) -> String {
        let text = self.diagnostics_text();
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => {
                tracing::info!(target: targets::UI, "Diagnostics copied to clipboard");
                "Copied".to_string()
            }
            Err(error) => {
                tracing::warn!(target: targets::UI, "Clipboard copy failed: {}", error);
                format!("Failed: {error}")
            }
        }
    }

    pub(crate) fn diagnostics_text(&self) -> String {
        let mut output = String::new();
        output.push_str("BottlePrint diagnostics\n");
        output.push_str(&format!("Log level: {}\n", self.log_level));
        output.push_str(&format!("Flow stage: {}\n", self.flow.stage()));
        if let Some(job) = self.flow.job() {
            output.push_str(&format!(
                "Current job: {} ({}, {} bottles)\n",
                job.id(),
                job.label(),
                job.bottles_required()
            ));
        }
        if let Some(code) = self.flow.deposit_code() {
            output.push_str(&format!("Deposit payload: {}\n", code.text()));
        }
        output.push_str(&format!(
            "Sync profile: {} stages, closes at {}ms\n",
            self.config.sync.stage_count(),
            self.config.sync.close_after_ms
        ));
        output.push_str(&format!(
            "Impact: {} credits, {} bottles, {:.1}kg saved, {} prints\n",
            self.impact.eco_credits,
            self.impact.bottles,
            self.impact.co2_saved_kg,
            self.impact.prints
        ));
        match &self.last_error {
            Some(error) => output.push_str(&format!(
                "Last error: {} ({})\n",
                error.summary, error.detail
            )),
            None => output.push_str("Last error: none\n"),
        }
        output.push_str(&format!(
            "Targets enabled: {}\n",
            self.sorted_targets()
                .into_iter()
                .filter(|target| self.enabled_targets.contains(target))
                .collect::<Vec<String>>()
                .join(", ")
        ));
        output.push_str(&format!(
            "Log entries evicted: {}\n",
            self.log_store.evicted()
        ));
        output.push_str("Recent logs:\n");

        let entries = self.visible_entries();
        let start = entries.len().saturating_sub(50);
        for entry in entries.into_iter().skip(start) {
            output.push_str(&entry.format_line());
            output.push('\n');
        }

        output
    }

    /// Entering the print tab starts a fresh wizard; leaving it mid-sync
    /// abandons the sync.
    pub(crate) fn select_tab(&mut self, tab: Tab) {
        if self.active_tab == tab {
            return;
        }
        let leaving_print = self.active_tab == Tab::Print;
        self.active_tab = tab;

        if tab == Tab::Print || (leaving_print && self.flow.is_syncing()) {
            self.reset_flow();
        }
        tracing::debug!(target: targets::UI, tab = ?tab, "Tab selected");
    }

    pub(crate) fn select_design(&mut self, id: DesignId) {
        let result = self
            .catalog
            .find(id)
            .and_then(|design| self.flow.select_preset(design).map(|_| ()));
        if let Err(error) = result {
            self.report_error(&error);
        }
    }

    pub(crate) fn begin_upload(&mut self) -> Command<Message> {
        match self.flow.begin_upload() {
            Ok(ticket) => tasks::analysis_command(ticket, self.config.analyzer()),
            Err(error) => {
                self.report_error(&error);
                Command::none()
            }
        }
    }

    pub(crate) fn finish_analysis(
        &mut self,
        ticket: AnalysisTicket,
        result: Result<AnalysisReport, ErrorInfo>,
    ) {
        match result {
            // A stale ticket means the user already left; nothing to show.
            Ok(report) => {
                let _ = self.flow.finish_analysis(ticket, &report);
            }
            Err(info) => {
                if self.flow.analysis_ticket() != Some(ticket) {
                    return;
                }
                self.flow.back();
                tracing::warn!(
                    target: targets::UI,
                    detail = %info.detail,
                    "Analysis failed: {}",
                    info.summary
                );
                self.banner = Some(Banner::failure(&info));
                self.last_error = Some(info);
            }
        }
    }

    pub(crate) fn confirm_job(&mut self) {
        let rendered = self
            .flow
            .confirm()
            .map(|code| code.qr_matrix().to_text());
        match rendered {
            Ok(text) => self.qr_text = Some(text),
            Err(error) => {
                self.qr_text = None;
                self.report_error(&error);
            }
        }
    }

    pub(crate) fn reset_flow(&mut self) {
        let reset = self.flow.back();
        self.qr_text = None;

        if let Some(interrupted) = reset.interrupted_sync {
            let error = interrupted.into_error();
            let info = ErrorInfo::from(&error);
            tracing::warn!(
                target: targets::UI,
                detail = %info.detail,
                "Sync cancelled"
            );
            self.banner = Some(Banner::cancelled(&info));
            self.last_error = Some(info);
        } else if reset.from != FlowStage::Idle {
            tracing::debug!(target: targets::UI, from = %reset.from, "Wizard reset");
        }
    }
}
