use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{debug, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Paragraph};

pub mod axis;
pub mod cache;
pub mod chart_data;
pub mod chart_export;
pub mod config;
pub mod detect;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod registry;
pub mod session;
pub mod source;
pub mod widgets;

pub use cache::CacheManager;
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use csvscope_cli::{Args, CompressionFormat, LabelModeArg};
pub use detect::DelimiterStrategy;
pub use error::LoadError;
pub use registry::LabelMode;
pub use session::{LoadOptions, LoadStage, RedrawPayload, Session};

use chart_data::{prepare_chart_data, ChartData};
use chart_export::ChartExportFormat;
use widgets::chart::ChartView;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::files::FilesPanel;
use widgets::open_prompt::{OpenPrompt, PromptEvent};
use widgets::selector::YSelector;

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "csvscope";

/// How files are opened: per-load pipeline parameters plus decompression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub load: LoadOptions,
    pub compression: Option<CompressionFormat>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.load.skip_rows = skip_rows;
        self
    }

    pub fn with_strategy(mut self, strategy: DelimiterStrategy) -> Self {
        self.load.strategy = strategy;
        self
    }

    pub fn with_label_mode(mut self, label_mode: LabelMode) -> Self {
        self.load.label_mode = label_mode;
        self
    }

    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Config values first, command line on top.
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let file_loading = &config.file_loading;

        let strategy = match args.delimiter.or(file_loading.delimiter) {
            Some(delimiter) => DelimiterStrategy::Fixed(delimiter),
            None if args.sniff || file_loading.sniff_delimiter.unwrap_or(false) => {
                DelimiterStrategy::Sniff
            }
            None => DelimiterStrategy::Probe,
        };

        let label_mode = args
            .label_mode
            .map(LabelMode::from)
            .unwrap_or_else(|| config.plot.label_mode().unwrap_or_default());

        let compression = args.compression.or_else(|| {
            file_loading
                .compression
                .as_deref()
                .and_then(CompressionFormat::from_name)
        });

        Self {
            load: LoadOptions {
                strategy,
                skip_rows: args.skip_rows.or(file_loading.skip_rows).unwrap_or(0),
                label_mode,
            },
            compression,
        }
    }
}

/// X axis title: the first plotted dataset's column 0 name.
fn x_axis_name(session: &Session, payload: &RedrawPayload) -> String {
    payload
        .series
        .first()
        .and_then(|s| session.registry().get(s.dataset_id))
        .map(|d| d.x_name().to_string())
        .unwrap_or_default()
}

/// Chart data for the current selection. `max_points` thins series for the terminal.
pub fn chart_data(session: &Session, max_points: Option<usize>) -> ChartData {
    let payload = session.redraw();
    let x_name = x_axis_name(session, &payload);
    prepare_chart_data(&payload, &x_name, max_points)
}

/// Default export path for the current Y name, e.g. `csvscope-voltage.png`.
pub fn default_export_path(y_name: Option<&str>, format: ChartExportFormat) -> PathBuf {
    let stem: String = y_name
        .unwrap_or("chart")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    PathBuf::from(format!("{APP_NAME}-{stem}.{}", format.extension()))
}

/// Load `paths` in order, select `y` if given, and write the requested exports.
/// Used for `--export`/`--export-json` runs; load failures are reported and skipped.
pub fn run_headless(args: &Args, config: &AppConfig) -> Result<Session> {
    let options = OpenOptions::from_args_and_config(args, config);
    let mut session = Session::new(config.plot.palette.clone());

    for path in &args.paths {
        session.load_file(path, options.compression, &options.load);
        let status = session.status();
        if status.is_error {
            eprintln!("{}", status.message);
        }
    }

    if let Some(y) = &args.y {
        if !session.select_y(y) {
            warn!(y = y.as_str(), "requested Y column not found in any file");
            eprintln!("No file has a numeric column named '{y}'");
        }
    }

    if let Some(path) = &args.export {
        let format = ChartExportFormat::from_path(path).ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "Unsupported export format for {}. Use .png or .svg",
                path.display()
            )
        })?;
        chart_export::write_chart(path, format, &chart_data(&session, None))?;
    }
    if let Some(path) = &args.export_json {
        chart_export::write_payload_json(path, &session.redraw())?;
    }
    Ok(session)
}

pub enum AppEvent {
    Key(KeyEvent),
    /// Show the "Loading" status, then load the file.
    Open(PathBuf),
    /// Internal: perform the load after the "Loading" status has been drawn.
    DoLoad(PathBuf),
    /// Make a Y name current, matched case-insensitively. A name no file has
    /// yet is kept and applied by later loads.
    SelectY(String),
    /// Write the full-resolution chart to an image file.
    Export(PathBuf),
    /// Drop every loaded file.
    Reset,
    Exit,
    Resize(u16, u16),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Opening,
}

pub struct App {
    session: Session,
    events: Sender<AppEvent>,
    options: OpenOptions,
    pub input_mode: InputMode,
    open_prompt: OpenPrompt,
    /// Shown instead of the session status while a file is being read.
    transient_status: Option<String>,
    /// Requested Y name that no file had yet; retried after each load.
    pending_y: Option<String>,
    chart: ChartData,
    debug: DebugState,
    theme: Theme,
    parser: ColorParser,
    marker: Marker,
    show_legend: bool,
    max_points: usize,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        let theme = Theme::from_config(&AppConfig::default().theme).unwrap_or_else(|e| {
            warn!(error = %e, "failed to create default theme, using fallback");
            Theme::default()
        });
        Self::new_with_config(events, theme, &AppConfig::default(), OpenOptions::default())
    }

    pub fn new_with_config(
        events: Sender<AppEvent>,
        theme: Theme,
        app_config: &AppConfig,
        options: OpenOptions,
    ) -> App {
        let session = Session::new(app_config.plot.palette.clone());
        let marker = app_config.plot.marker().unwrap_or(Marker::Braille);
        let mut app = App {
            chart: chart_data(&session, None),
            session,
            events,
            options,
            input_mode: InputMode::Normal,
            open_prompt: OpenPrompt::new().with_border(theme.get("modal_border")),
            transient_status: None,
            pending_y: None,
            debug: DebugState::default(),
            theme,
            parser: ColorParser::new(),
            marker,
            show_legend: app_config.plot.show_legend,
            max_points: app_config.performance.max_points_per_series,
        };
        app.debug.enabled = app_config.debug.enabled;
        app
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    fn apply_pending_y(&mut self) {
        if let Some(name) = self.pending_y.take() {
            if !self.session.select_y(&name) {
                self.pending_y = Some(name);
            }
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn chart(&self) -> &ChartData {
        &self.chart
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    /// Recompute the complete chart after any session change.
    fn refresh(&mut self) {
        self.transient_status = None;
        self.chart = chart_data(&self.session, Some(self.max_points));
        self.debug.stage = self.session.stage();
        self.debug.points_drawn = self.chart.point_count();
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        if self.input_mode == InputMode::Opening {
            return match self.open_prompt.handle_key(event) {
                PromptEvent::None => None,
                PromptEvent::Cancel => {
                    self.input_mode = InputMode::Normal;
                    self.debug.last_action = "cancel_open".to_string();
                    None
                }
                PromptEvent::Submit(path) => {
                    self.input_mode = InputMode::Normal;
                    if path.is_empty() {
                        // Nothing chosen: clears the status, keeps every dataset.
                        self.session
                            .load(&source::Upload::default(), &self.options.load);
                        self.debug.last_action = "empty_open".to_string();
                        self.refresh();
                        None
                    } else {
                        Some(AppEvent::Open(resolve_path(&path)))
                    }
                }
            };
        }

        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Exit),
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(AppEvent::Exit)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.debug.last_action = "previous_y".to_string();
                self.session.step_y(-1);
                self.refresh();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.debug.last_action = "next_y".to_string();
                self.session.step_y(1);
                self.refresh();
                None
            }
            KeyCode::Char('o') => {
                self.open_prompt.clear();
                self.input_mode = InputMode::Opening;
                None
            }
            KeyCode::Char('e') => Some(AppEvent::Export(default_export_path(
                self.session.selection().current(),
                ChartExportFormat::Png,
            ))),
            KeyCode::Char('R') => Some(AppEvent::Reset),
            KeyCode::Char('d') => {
                self.debug.enabled = !self.debug.enabled;
                None
            }
            _ => None,
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path) => {
                self.transient_status = Some(format!("Loading {}...", path.display()));
                Some(AppEvent::DoLoad(path.clone()))
            }
            AppEvent::DoLoad(path) => {
                self.debug.last_action = "load".to_string();
                self.session
                    .load_file(path, self.options.compression, &self.options.load);
                self.apply_pending_y();
                self.refresh();
                None
            }
            AppEvent::SelectY(name) => {
                let found = self.session.select_y(name);
                self.pending_y = (!found).then(|| name.clone());
                self.refresh();
                if !found && !self.session.registry().is_empty() {
                    self.transient_status = Some(format!("No file has a numeric column '{name}'"));
                }
                None
            }
            AppEvent::Export(path) => {
                let data = chart_data(&self.session, None);
                let format = ChartExportFormat::from_path(path).unwrap_or(ChartExportFormat::Png);
                self.transient_status = Some(
                    match chart_export::write_chart(path, format, &data) {
                        Ok(()) => format!("Exported chart to {}", path.display()),
                        Err(e) => format!("Export failed: {e}"),
                    },
                );
                None
            }
            AppEvent::Reset => {
                self.debug.last_action = "reset".to_string();
                self.pending_y = None;
                self.session.reset();
                self.refresh();
                None
            }
            AppEvent::Resize(cols, rows) => {
                debug!(cols, rows, "terminal resized");
                None
            }
            AppEvent::Exit => None,
        }
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let status = self.session.status();
        let (text, fg) = match &self.transient_status {
            Some(message) => (message.as_str(), self.color("secondary")),
            None if status.is_error => (status.message.as_str(), self.color("error")),
            None => (status.message.as_str(), self.color("success")),
        };
        Paragraph::new(text)
            .style(Style::default().fg(fg))
            .render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.input_mode == InputMode::Opening {
            constraints.insert(1, Constraint::Length(3));
        }
        constraints.push(Constraint::Length(1)); // Controls
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(32)])
            .split(layout[0]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main[1]);

        ChartView::new(&self.chart, &self.theme, &self.parser)
            .marker(self.marker)
            .show_legend(self.show_legend)
            .render(main[0], buf);
        YSelector::new(self.session.selection(), &self.theme)
            .focused(self.input_mode == InputMode::Normal)
            .render(side[0], buf);
        FilesPanel::new(
            self.session.registry(),
            self.session.selection().current(),
            &self.theme,
            &self.parser,
        )
        .render(side[1], buf);

        let mut next = 1;
        if self.input_mode == InputMode::Opening {
            (&self.open_prompt).render(layout[next], buf);
            next += 1;
        }
        self.render_status(layout[next], buf);
        next += 1;

        let controls = Controls::new()
            .with_series_count(self.chart.series.len())
            .with_dimmed(self.input_mode != InputMode::Normal)
            .with_background(self.color("controls_bg"));
        (&controls).render(layout[next], buf);
        next += 1;

        if self.debug.enabled {
            Block::default()
                .style(
                    Style::default()
                        .fg(self.color("text_secondary"))
                        .add_modifier(Modifier::DIM),
                )
                .render(layout[next], buf);
            (&self.debug).render(layout[next], buf);
        }
    }
}

/// Read a path typed by the user relative to the working directory.
pub fn resolve_path(input: &str) -> PathBuf {
    let path = Path::new(input);
    match input.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::sync::mpsc::{channel, Receiver};

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("csvscope").chain(argv.iter().copied()))
    }

    #[test]
    fn cli_overrides_config() {
        let mut config = AppConfig::default();
        config.file_loading.skip_rows = Some(4);
        config.file_loading.sniff_delimiter = Some(true);
        config.plot.label_mode = "file_name".to_string();

        let opts = OpenOptions::from_args_and_config(&args(&[]), &config);
        assert_eq!(opts.load.skip_rows, 4);
        assert_eq!(opts.load.strategy, DelimiterStrategy::Sniff);
        assert_eq!(opts.load.label_mode, LabelMode::FileName);

        let opts = OpenOptions::from_args_and_config(
            &args(&["--skip-rows", "1", "--delimiter", ";", "--label-mode", "second-column"]),
            &config,
        );
        assert_eq!(opts.load.skip_rows, 1);
        assert_eq!(opts.load.strategy, DelimiterStrategy::Fixed(';'));
        assert_eq!(opts.load.label_mode, LabelMode::SecondColumn);
    }

    #[test]
    fn compression_from_config_name() {
        let mut config = AppConfig::default();
        config.file_loading.compression = Some("zstd".to_string());
        let opts = OpenOptions::from_args_and_config(&args(&[]), &config);
        assert_eq!(opts.compression, Some(CompressionFormat::Zstd));
        let opts = OpenOptions::from_args_and_config(&args(&["--compression", "xz"]), &config);
        assert_eq!(opts.compression, Some(CompressionFormat::Xz));
    }

    #[test]
    fn export_path_is_sanitized() {
        assert_eq!(
            default_export_path(Some("U [V]"), ChartExportFormat::Png),
            PathBuf::from("csvscope-u__v_.png")
        );
        assert_eq!(
            default_export_path(None, ChartExportFormat::Svg),
            PathBuf::from("csvscope-chart.svg")
        );
    }

    #[test]
    fn open_prompt_flow() {
        let (tx, _rx) = channel();
        let mut app = App::new(tx);
        let press = |c| AppEvent::Key(KeyEvent::new(c, KeyModifiers::NONE));

        assert!(app.event(&press(KeyCode::Char('o'))).is_none());
        assert_eq!(app.input_mode, InputMode::Opening);
        for c in "a.csv".chars() {
            app.event(&press(KeyCode::Char(c)));
        }
        match app.event(&press(KeyCode::Enter)) {
            Some(AppEvent::Open(path)) => assert_eq!(path, PathBuf::from("a.csv")),
            _ => panic!("expected open event"),
        }
        assert_eq!(app.input_mode, InputMode::Normal);

        // q quits only outside the prompt
        assert!(matches!(
            app.event(&press(KeyCode::Char('q'))),
            Some(AppEvent::Exit)
        ));
    }

    /// Feed events through the channel the way the main loop does.
    fn drain(app: &mut App, tx: &std::sync::mpsc::Sender<AppEvent>, rx: &Receiver<AppEvent>) {
        while let Ok(event) = rx.try_recv() {
            if let Some(next) = app.event(&event) {
                tx.send(next).unwrap();
            }
        }
    }

    #[test]
    fn requested_y_is_applied_once_a_file_has_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "t,Voltage,Current\n0,1,2\n1,2,3\n").unwrap();

        // Same order as startup: opens first, then the --y selection.
        let (tx, rx) = channel();
        let mut app = App::new(tx.clone());
        tx.send(AppEvent::Open(path)).unwrap();
        tx.send(AppEvent::SelectY("current".to_string())).unwrap();
        drain(&mut app, &tx, &rx);

        assert_eq!(app.session().selection().current(), Some("Current"));
        assert_eq!(app.chart().y_name, "Current");
    }

    #[test]
    fn later_selection_replaces_requested_y() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "t,Voltage,Current\n0,1,2\n").unwrap();

        let (tx, rx) = channel();
        let mut app = App::new(tx.clone());
        tx.send(AppEvent::SelectY("Current".to_string())).unwrap();
        tx.send(AppEvent::SelectY("nope".to_string())).unwrap();
        tx.send(AppEvent::Open(path)).unwrap();
        drain(&mut app, &tx, &rx);

        assert_eq!(app.session().selection().current(), Some("Voltage"));
    }

    #[test]
    fn unknown_y_is_reported_when_files_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "t,Voltage\n0,1\n").unwrap();

        let (tx, rx) = channel();
        let mut app = App::new(tx.clone());
        tx.send(AppEvent::Open(path)).unwrap();
        drain(&mut app, &tx, &rx);
        app.event(&AppEvent::SelectY("Current".to_string()));

        assert_eq!(
            app.transient_status.as_deref(),
            Some("No file has a numeric column 'Current'")
        );
        assert_eq!(app.session().selection().current(), Some("Voltage"));
    }

    #[test]
    fn render_smoke() {
        let (tx, _rx) = channel();
        let mut app = App::new(tx);
        app.enable_debug();
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
        let text: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Files (0)"));
        assert!(text.contains("Y axis"));
        assert!(text.contains("frames=1"));
    }

    #[test]
    fn home_relative_paths() {
        assert_eq!(resolve_path("data.csv"), PathBuf::from("data.csv"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_path("~/x.csv"), home.join("x.csv"));
        }
    }
}
