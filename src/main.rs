use anyhow::anyhow;
use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, Ui, ViewportBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod config;
mod controller;
mod db;
mod hn_client;
mod logging;
mod models;
mod query;
mod recency;
mod reducer;
mod sort;

use crate::config::AppConfig;
use crate::controller::StoriesController;
use crate::db::{KeyValueStore, MemoryStore, PersistedSearchTerm, SqliteStore, SEARCH_KEY};
use crate::hn_client::HackerNewsClient;
use crate::models::Story;
use crate::query::SearchEndpoint;
use crate::sort::{SortKey, SortState};

fn main() -> anyhow::Result<()> {
    let config = match config::load(&config::default_config_path()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}; using defaults", e);
            AppConfig::default()
        }
    };

    if let Err(e) = logging::init(&config.log_file_path, &config.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    info!(?config, "starting hacker stories");

    let store: Arc<dyn KeyValueStore> = match SqliteStore::new() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "failed to open storage, search term will not be remembered");
            Arc::new(MemoryStore::default())
        }
    };

    let client = HackerNewsClient::new(config.request_timeout)?;
    let search_term = PersistedSearchTerm::load(store, SEARCH_KEY, &config.default_search);
    let endpoint = SearchEndpoint::new(config.api_base.as_str());
    info!(api_base = endpoint.base(), term = search_term.get(), "search endpoint ready");
    let controller = StoriesController::new(Arc::new(client), endpoint, search_term);

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Hacker Stories"),
        ..Default::default()
    };

    let default_dark_mode = config.dark_mode;
    eframe::run_native(
        "Hacker Stories",
        options,
        Box::new(move |cc| {
            let mut is_dark_mode = default_dark_mode;

            if let Some(storage) = cc.storage {
                if let Some(theme_str) = storage.get_string("is_dark_mode") {
                    if let Ok(saved) = theme_str.parse::<bool>() {
                        is_dark_mode = saved;
                    }
                }
            }

            Ok(Box::new(HackerStoriesApp::new(controller, is_dark_mode)))
        }),
    )
    .map_err(|e| anyhow!("failed to run application: {}", e))
}

struct AppTheme {
    background: Color32,
    card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    error: Color32,
    separator: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_active_background: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    fn dark() -> Self {
        Self {
            background: Color32::from_rgb(18, 18, 18),
            card_background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(180, 180, 180),
            highlight: Color32::from_rgb(255, 102, 0), // HN orange
            error: Color32::from_rgb(239, 83, 80),
            separator: Color32::from_rgb(60, 60, 60),
            button_background: Color32::from_rgb(66, 66, 66),
            button_foreground: Color32::from_rgb(240, 240, 240),
            button_active_background: Color32::from_rgb(255, 102, 0),
            button_hover_background: Color32::from_rgb(80, 80, 80),
        }
    }

    fn light() -> Self {
        Self {
            background: Color32::from_rgb(245, 245, 245),
            card_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(20, 20, 20),
            secondary_text: Color32::from_rgb(90, 90, 90),
            highlight: Color32::from_rgb(235, 92, 0),
            error: Color32::from_rgb(183, 28, 28),
            separator: Color32::from_rgb(200, 200, 200),
            button_background: Color32::from_rgb(235, 235, 235),
            button_foreground: Color32::from_rgb(20, 20, 20),
            button_active_background: Color32::from_rgb(235, 92, 0),
            button_hover_background: Color32::from_rgb(210, 210, 210),
        }
    }

    fn for_mode(is_dark_mode: bool) -> Self {
        if is_dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);

        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.button_active_background;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);

        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        ctx.set_style(style);
    }
}

/// Things the user asked for during a frame, applied once rendering is done.
enum UiAction {
    Submit,
    SearchRecent(String),
    More,
    Sort(SortKey),
    Dismiss(Story),
    OpenLink(String),
    ToggleTheme,
}

struct HackerStoriesApp {
    controller: StoriesController,
    // Lives only as long as the list is on screen
    sort: SortState,
    theme: AppTheme,
    is_dark_mode: bool,
    started: bool,
    focus_search: bool,
}

impl HackerStoriesApp {
    fn new(controller: StoriesController, is_dark_mode: bool) -> Self {
        Self {
            controller,
            sort: SortState::default(),
            theme: AppTheme::for_mode(is_dark_mode),
            is_dark_mode,
            started: false,
            focus_search: true,
        }
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = AppTheme::for_mode(self.is_dark_mode);
    }

    fn open_link(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        if let Err(e) = open::that(url) {
            warn!(url, error = %e, "failed to open URL");
        }
    }

    fn handle(&mut self, action: UiAction) {
        match action {
            UiAction::Submit => {
                self.controller.submit_search();
            }
            UiAction::SearchRecent(term) => self.controller.search_recent(&term),
            UiAction::More => self.controller.load_more(),
            UiAction::Sort(key) => self.sort = self.sort.clicked(key),
            UiAction::Dismiss(story) => self.controller.remove_story(&story),
            UiAction::OpenLink(url) => self.open_link(&url),
            UiAction::ToggleTheme => self.toggle_theme(),
        }
    }

    fn render_header(&self, ui: &mut Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!(
                    "My Hacker Stories with {} comments.",
                    self.controller.sum_comments()
                ))
                .color(self.theme.highlight)
                .size(26.0)
                .strong(),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let icon = if self.is_dark_mode { "☀" } else { "🌙" };
                let theme_btn = ui.add(
                    egui::Button::new(RichText::new(icon).size(18.0))
                        .corner_radius(CornerRadius::same(6))
                        .fill(self.theme.button_background),
                );
                if theme_btn.clicked() {
                    actions.push(UiAction::ToggleTheme);
                }
            });
        });
    }

    fn render_search_form(&mut self, ui: &mut Ui, actions: &mut Vec<UiAction>) {
        let mut term = self.controller.search_term().to_string();

        ui.horizontal(|ui| {
            ui.label(RichText::new("Search:").strong().color(self.theme.text));

            let input = ui.add(egui::TextEdit::singleline(&mut term).desired_width(320.0));
            if self.focus_search {
                input.request_focus();
                self.focus_search = false;
            }
            if input.changed() {
                self.controller.set_search_term(&term);
            }

            let can_submit = !term.is_empty();
            let enter = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let submit_btn = ui.add_enabled(
                can_submit,
                egui::Button::new(RichText::new("Submit").color(self.theme.button_foreground))
                    .corner_radius(CornerRadius::same(4)),
            );

            if can_submit && (submit_btn.clicked() || enter) {
                actions.push(UiAction::Submit);
            }
        });
    }

    fn render_last_searches(&self, ui: &mut Ui, actions: &mut Vec<UiAction>) {
        let last_searches = self.controller.last_searches();
        if last_searches.is_empty() {
            return;
        }

        ui.horizontal_wrapped(|ui| {
            for term in last_searches {
                let btn = ui.add(
                    egui::Button::new(RichText::new(&term).color(self.theme.button_foreground))
                        .corner_radius(CornerRadius::same(4))
                        .fill(self.theme.button_background),
                );
                if btn.clicked() {
                    actions.push(UiAction::SearchRecent(term));
                }
            }
        });
    }

    fn render_sort_header(&self, ui: &mut Ui, key: SortKey, actions: &mut Vec<UiAction>) {
        let arrow = if self.sort.sort_key != key {
            ""
        } else if self.sort.is_reverse {
            "▲ "
        } else {
            "▼ "
        };

        let btn = ui.add(
            egui::Button::new(
                RichText::new(format!("{}{}", arrow, key.label()))
                    .strong()
                    .color(self.theme.text),
            )
            .frame(false),
        );
        if btn.clicked() {
            actions.push(UiAction::Sort(key));
        }
    }

    fn render_stories_table(&self, ui: &mut Ui, actions: &mut Vec<UiAction>) {
        let stories = self.sort.sorted(&self.controller.state().data);

        egui::Grid::new("stories_table")
            .num_columns(5)
            .striped(true)
            .spacing([16.0, 8.0])
            .show(ui, |ui| {
                for key in SortKey::COLUMNS {
                    self.render_sort_header(ui, key, actions);
                }
                ui.label(RichText::new("Actions").strong().color(self.theme.text));
                ui.end_row();

                for story in stories {
                    let title = ui.add(
                        egui::Label::new(RichText::new(&story.title).color(self.theme.highlight))
                            .sense(egui::Sense::click()),
                    );
                    if title.clicked() {
                        actions.push(UiAction::OpenLink(story.url.clone()));
                    }
                    if title.hovered() && !story.url.is_empty() {
                        ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                    }

                    ui.label(RichText::new(&story.author).color(self.theme.secondary_text));
                    ui.label(RichText::new(story.num_comments.to_string()).color(self.theme.text));
                    ui.label(RichText::new(story.points.to_string()).color(self.theme.text));

                    let dismiss = ui.add(
                        egui::Button::new(RichText::new("Dismiss").color(self.theme.button_foreground))
                            .corner_radius(CornerRadius::same(4))
                            .fill(self.theme.button_background),
                    );
                    if dismiss.clicked() {
                        actions.push(UiAction::Dismiss(story));
                    }
                    ui.end_row();
                }
            });
    }
}

impl eframe::App for HackerStoriesApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        if !self.started {
            self.controller.start();
            self.started = true;
        }

        self.controller.poll();
        if self.controller.is_fetching() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let (is_loading, is_error) = {
            let state = self.controller.state();
            (state.is_loading, state.is_error)
        };
        self.sort = self.sort.reset_while_loading(is_loading);

        let mut actions = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui, &mut actions);
            ui.add_space(8.0);
            self.render_search_form(ui, &mut actions);
            ui.add_space(4.0);
            self.render_last_searches(ui, &mut actions);
            ui.separator();

            if is_error {
                ui.label(RichText::new("Something went wrong ...").color(self.theme.error));
            }

            if is_loading {
                ui.label(RichText::new("Loading ...").color(self.theme.secondary_text));
                return;
            }

            ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                self.render_stories_table(ui, &mut actions);
                ui.add_space(12.0);
                let more = ui.add(
                    egui::Button::new(RichText::new("More").color(self.theme.button_foreground))
                        .corner_radius(CornerRadius::same(4))
                        .fill(self.theme.button_background),
                );
                if more.clicked() {
                    actions.push(UiAction::More);
                }
            });
        });

        if !actions.is_empty() {
            for action in actions {
                self.handle(action);
            }
            ctx.request_repaint();
        }
    }
}
