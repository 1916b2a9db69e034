use iced::alignment::Horizontal;
use iced::theme;
use iced::widget::text::{LineHeight, Shaping};
use iced::widget::{
    button, checkbox, column, container, pick_list, row, scrollable, text, Rule, Space,
};
use iced::{Alignment, Element, Font, Length};

use bottleprint_core::{Design, FlowStage, Job, JobSource};

use crate::app::helpers::{
    bottles_label, format_thousands, format_weight, level_color, marker_color, marker_glyph,
    palette,
};
use crate::app::styles::{ActionButtonStyle, CardStyle, TabStyle};
use crate::app::types::{Banner, Message, Tab};
use crate::app::KioskApp;
use crate::logging::LogLevel;

const GRID_COLUMNS: usize = 2;

fn card<'a>(
    content: impl Into<Element<'a, Message>>,
    style: CardStyle,
) -> container::Container<'a, Message> {
    container(content)
        .padding(16)
        .width(Length::Fill)
        .style(theme::Container::Custom(Box::new(style)))
}

fn muted(label: impl ToString) -> text::Text<'static> {
    text(label.to_string())
        .size(14)
        .style(theme::Text::Color(palette::text_muted()))
}

fn heading(label: impl ToString, size: u16) -> text::Text<'static> {
    text(label.to_string())
        .size(size)
        .style(theme::Text::Color(palette::text()))
}

impl KioskApp {
    pub(crate) fn tab_bar(&self) -> Element<'_, Message> {
        row![
            self.tab_button(Tab::Dashboard, "Home"),
            self.tab_button(Tab::Print, "Print"),
            self.tab_button(Tab::Diagnostics, "Diagnostics"),
        ]
        .spacing(4)
        .align_items(Alignment::Center)
        .into()
    }

    fn tab_button(&self, tab: Tab, label: &str) -> Element<'_, Message> {
        let style = theme::Button::custom(TabStyle {
            active: self.active_tab == tab,
        });

        button(
            text(label)
                .width(Length::Fill)
                .horizontal_alignment(Horizontal::Center),
        )
        .padding([10, 12])
        .width(Length::FillPortion(1))
        .style(style)
        .on_press(Message::SelectTab(tab))
        .into()
    }

    pub(crate) fn banner_view(&self, banner: &Banner) -> Element<'_, Message> {
        let content = row![
            column![
                heading(&banner.title, 18),
                text(&banner.body)
                    .size(14)
                    .style(theme::Text::Color(palette::text())),
            ]
            .spacing(4)
            .width(Length::Fill),
            button("Dismiss")
                .style(theme::Button::custom(ActionButtonStyle::ghost()))
                .on_press(Message::DismissBanner),
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        card(content, CardStyle::banner(banner.kind)).into()
    }

    pub(crate) fn dashboard_view(&self) -> Element<'_, Message> {
        let hero = column![
            heading("Welcome Back,", 28),
            muted("Ready to recycle today?"),
            Space::with_height(Length::Fixed(24.0)),
            button(
                column![
                    heading("Start New Project", 22),
                    muted("Tap here to choose a design or upload"),
                ]
                .spacing(6)
                .align_items(Alignment::Center)
                .width(Length::Fill),
            )
            .padding(20)
            .width(Length::Fill)
            .style(theme::Button::custom(ActionButtonStyle::tile()))
            .on_press(Message::SelectTab(Tab::Print)),
        ]
        .spacing(6);

        let credits = card(
            column![
                text("Eco Credits")
                    .size(14)
                    .style(theme::Text::Color(palette::text())),
                heading(format_thousands(self.impact.eco_credits), 32),
            ]
            .spacing(4),
            CardStyle::credits(),
        );

        let stats = row![
            self.stat_box(self.impact.bottles.to_string(), "Bottles"),
            self.stat_box(format!("{:.1}kg", self.impact.co2_saved_kg), "Saved"),
            self.stat_box(self.impact.prints.to_string(), "Prints"),
        ]
        .spacing(10);

        scrollable(
            column![hero, heading("Your Impact", 20), credits, stats]
                .spacing(16)
                .width(Length::Fill),
        )
        .into()
    }

    fn stat_box(&self, value: String, label: &str) -> Element<'_, Message> {
        card(
            column![heading(value, 22), muted(label)]
                .spacing(4)
                .align_items(Alignment::Center)
                .width(Length::Fill),
            CardStyle::surface(),
        )
        .width(Length::FillPortion(1))
        .into()
    }

    pub(crate) fn print_view(&self) -> Element<'_, Message> {
        match self.flow.stage() {
            FlowStage::Idle => self.design_library_view(),
            FlowStage::Analyzing => self.analyzing_view(),
            FlowStage::Result => match self.flow.job() {
                Some(job) => self.job_summary_view(job),
                None => self.design_library_view(),
            },
            FlowStage::CodeReady => match self.flow.job() {
                Some(job) => self.deposit_code_view(job),
                None => self.design_library_view(),
            },
        }
    }

    fn design_library_view(&self) -> Element<'_, Message> {
        let upload = button(
            column![
                heading("Upload Custom File", 18),
                text("Supports .STL and .OBJ")
                    .size(12)
                    .style(theme::Text::Color(palette::text())),
            ]
            .spacing(4)
            .align_items(Alignment::Center)
            .width(Length::Fill),
        )
        .padding(18)
        .width(Length::Fill)
        .style(theme::Button::custom(ActionButtonStyle::upload()))
        .on_press(Message::UploadCustom);

        let mut grid = column![].spacing(12);
        for chunk in self.catalog.designs().chunks(GRID_COLUMNS) {
            let mut line = row![].spacing(12);
            for design in chunk {
                line = line.push(self.design_tile(design));
            }
            for _ in chunk.len()..GRID_COLUMNS {
                line = line.push(Space::with_width(Length::FillPortion(1)));
            }
            grid = grid.push(line);
        }

        scrollable(
            column![
                heading("Design Library", 28),
                muted("Select a model or upload your own"),
                upload,
                heading("Community Designs", 18),
                grid,
            ]
            .spacing(16)
            .width(Length::Fill),
        )
        .into()
    }

    fn design_tile(&self, design: &Design) -> Element<'_, Message> {
        button(
            column![
                heading(&design.name, 16),
                text(bottles_label(design.bottles_required))
                    .size(13)
                    .style(theme::Text::Color(palette::primary())),
                text(format_weight(design.weight_grams))
                    .size(12)
                    .style(theme::Text::Color(palette::text_muted())),
            ]
            .spacing(6)
            .width(Length::Fill),
        )
        .padding(16)
        .width(Length::FillPortion(1))
        .style(theme::Button::custom(ActionButtonStyle::tile()))
        .on_press(Message::SelectDesign(design.id))
        .into()
    }

    fn analyzing_view(&self) -> Element<'_, Message> {
        container(
            column![
                text("...")
                    .size(40)
                    .style(theme::Text::Color(palette::primary())),
                heading("Slicing Model...", 22),
                muted("Calculating density & infill"),
            ]
            .spacing(10)
            .align_items(Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into()
    }

    fn back_button(&self) -> Element<'_, Message> {
        button("< Back")
            .padding([6, 14])
            .style(theme::Button::custom(ActionButtonStyle::tile()))
            .on_press(Message::Back)
            .into()
    }

    fn detail_row(&self, label: &str, value: String) -> Element<'_, Message> {
        row![
            muted(label).width(Length::Fill),
            text(value)
                .size(14)
                .style(theme::Text::Color(palette::text())),
        ]
        .align_items(Alignment::Center)
        .into()
    }

    fn job_summary_view(&self, job: &Job) -> Element<'_, Message> {
        let mut details = column![
            heading(job.label(), 22),
            self.detail_row("Estimated Weight", format_weight(job.weight_grams())),
            self.detail_row("Material", job.material().description().to_string()),
        ]
        .spacing(10);
        if let JobSource::Upload { volume_cm3, .. } = job.source() {
            details = details.push(self.detail_row("Volume", format!("{volume_cm3:.2} cm3")));
        }

        let deposit = card(
            column![
                text("REQUIRED DEPOSIT")
                    .size(12)
                    .style(theme::Text::Color(palette::primary())),
                heading(bottles_label(job.bottles_required()), 28),
            ]
            .spacing(6)
            .align_items(Alignment::Center)
            .width(Length::Fill),
            CardStyle::deposit(),
        );

        let summary = card(
            column![details, Rule::horizontal(1), deposit].spacing(14),
            CardStyle::surface(),
        );

        let confirm = button(
            text("Confirm & Generate Code")
                .size(16)
                .width(Length::Fill)
                .horizontal_alignment(Horizontal::Center),
        )
        .padding(18)
        .width(Length::Fill)
        .style(theme::Button::custom(ActionButtonStyle::primary()))
        .on_press(Message::Confirm);

        scrollable(
            column![
                row![self.back_button(), heading("Job Summary", 24)]
                    .spacing(12)
                    .align_items(Alignment::Center),
                summary,
                confirm,
            ]
            .spacing(18)
            .width(Length::Fill),
        )
        .into()
    }

    fn deposit_code_view(&self, job: &Job) -> Element<'_, Message> {
        let code: Element<'_, Message> = match (&self.qr_text, self.flow.deposit_code()) {
            (Some(matrix), _) => text(matrix)
                .font(Font::MONOSPACE)
                .shaping(Shaping::Advanced)
                .line_height(LineHeight::Relative(1.0))
                .size(9)
                .style(theme::Text::Color(palette::ink()))
                .into(),
            (None, Some(code)) => text(code.text())
                .size(12)
                .style(theme::Text::Color(palette::ink()))
                .into(),
            (None, None) => text("No code").into(),
        };

        let qr_panel = card(
            column![
                code,
                text("Align code with machine scanner")
                    .size(13)
                    .style(theme::Text::Color(palette::ink())),
            ]
            .spacing(12)
            .align_items(Alignment::Center)
            .width(Length::Fill),
            CardStyle::code(),
        );

        let info = card(
            text(format!(
                "Machine will open intake for {} bottles. Please remove caps before depositing.",
                job.bottles_required()
            ))
            .size(14)
            .style(theme::Text::Color(palette::text())),
            CardStyle::info(),
        );

        let syncing = self.flow.is_syncing();
        let demo = button(
            text("[DEMO] Simulate Connection")
                .size(14)
                .width(Length::Fill)
                .horizontal_alignment(Horizontal::Center),
        )
        .padding(12)
        .width(Length::Fill)
        .style(theme::Button::custom(ActionButtonStyle::ghost()))
        .on_press_maybe((!syncing).then_some(Message::StartSync));

        let mut content = column![
            row![self.back_button(), heading("Scan at Kiosk", 24)]
                .spacing(12)
                .align_items(Alignment::Center),
            qr_panel,
            info,
            demo,
        ]
        .spacing(18)
        .width(Length::Fill);

        if syncing {
            content = content.push(self.sync_status_view());
        }

        scrollable(content).into()
    }

    fn sync_status_view(&self) -> Element<'_, Message> {
        let profile = &self.config.sync;
        let step = self
            .flow
            .sync_step()
            .and_then(|index| profile.step(index));

        let body = match step {
            Some(step) => column![
                text(marker_glyph(step.marker))
                    .size(32)
                    .style(theme::Text::Color(marker_color(step.marker))),
                heading(&step.label, 20),
                muted(format!("Stage {} of {}", step.index + 1, step.count)),
            ],
            None => column![heading("Waiting for machine...", 20)],
        };

        card(
            body.spacing(8)
                .align_items(Alignment::Center)
                .width(Length::Fill),
            CardStyle::surface(),
        )
        .into()
    }

    pub(crate) fn diagnostics_view(&self) -> Element<'_, Message> {
        let level_picker = pick_list(
            &LogLevel::ALL[..],
            Some(self.log_level),
            Message::LogLevelChanged,
        )
        .placeholder("Log level");

        let console_header = row![heading("Console", 20).width(Length::Fill), level_picker]
            .spacing(12)
            .align_items(Alignment::Center);

        column![
            console_header,
            self.target_filters_view(),
            container(self.log_lines_view()).height(Length::FillPortion(3)),
            self.debug_panel_view(),
        ]
        .spacing(12)
        .into()
    }

    fn target_filters_view(&self) -> Element<'_, Message> {
        let mut filters = row![].spacing(10);
        for target in self.sorted_targets() {
            let enabled = self.enabled_targets.contains(&target);
            filters = filters.push(
                checkbox(target.clone(), enabled)
                    .size(14)
                    .text_size(12)
                    .on_toggle(move |value| Message::ToggleTarget(target.clone(), value)),
            );
        }

        card(
            column![muted("Targets"), scrollable(filters).direction(
                scrollable::Direction::Horizontal(scrollable::Properties::default())
            )]
            .spacing(6),
            CardStyle::surface(),
        )
        .into()
    }

    fn log_lines_view(&self) -> Element<'_, Message> {
        let mut lines = column![].spacing(4);

        for entry in self.visible_entries() {
            let line = text(entry.format_line())
                .size(12)
                .horizontal_alignment(Horizontal::Left)
                .style(theme::Text::Color(level_color(entry.level)));
            lines = lines.push(line);
        }

        scrollable(lines)
            .height(Length::Fill)
            .width(Length::Fill)
            .into()
    }

    fn debug_panel_view(&self) -> Element<'_, Message> {
        let copy_status = self.copy_status.as_deref().unwrap_or("Ready");
        let last_error = match &self.last_error {
            Some(error) => format!("Last error: {}", error.summary),
            None => "Last error: none".to_string(),
        };

        card(
            column![
                heading("Debug panel", 18),
                muted(format!("Flow stage: {}", self.flow.stage())),
                muted(format!(
                    "Sync profile: {} stages",
                    self.config.sync.stage_count()
                )),
                muted(last_error),
                button("Copy diagnostics")
                    .style(theme::Button::custom(ActionButtonStyle::tile()))
                    .on_press(Message::CopyDiagnostics),
                text(format!("Clipboard: {copy_status}"))
                    .size(12)
                    .style(theme::Text::Color(palette::text_muted())),
            ]
            .spacing(8),
            CardStyle::surface(),
        )
        .into()
    }
}
