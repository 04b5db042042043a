//! Session controller: turns terminal input and background results into
//! orchestrator calls, and orchestrator effects into background work.
//!
//! [`Session::update`] is the only place state changes. It runs on one task,
//! one event at a time; lookups and fetches run on spawned tasks owned by the
//! [`EffectExecutor`] and report back through the same event channel.

mod executor;
mod headless;
mod terminal;


pub use executor::EffectExecutor;
pub use headless::run_headless;
pub use terminal::run_terminal;

use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Error;
use crate::orchestrator::{
    BatchId, Effect, FetchCompletion, FinishReason, Orchestrator, Phase, destination_for,
};
use crate::types::Illustration;
use crate::ui::{self, Layout, ProgressBar, Spinner, TextInput, Theme, style::colors};

/// Hint shown once a batch has ended
pub const FINISHED_HINT: &str = "enter to search again, esc to quit";

/// Everything the session reacts to
#[derive(Debug)]
pub enum SessionEvent {
    /// The terminal was resized
    Resize {
        /// New width in columns
        width: u16,
        /// New height in rows
        height: u16,
    },
    /// A key was pressed
    Key(KeyEvent),
    /// A catalog lookup finished
    CatalogReady {
        /// Batch the lookup was issued for
        batch: BatchId,
        /// Items, or why the lookup or destination setup failed
        result: std::result::Result<Vec<Illustration>, Error>,
    },
    /// An item fetch finished
    FetchCompleted(FetchCompletion),
    /// Animation frame for the spinner, cursor blink and progress bar
    Tick,
}

/// What the driver must do after an update
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Hand the effect to the executor
    Run(Effect),
    /// End the session, abandoning outstanding work
    Quit,
}

/// Interactive session state: the orchestrator plus its presentation
#[derive(Debug)]
pub struct Session {
    orchestrator: Orchestrator,
    input: TextInput,
    spinner: Spinner,
    progress: ProgressBar,
    layout: Layout,
    theme: Theme,
    download_dir: PathBuf,
    exit_when_finished: bool,
}

impl Session {
    /// Idle session rendering with `theme`
    pub fn new(config: &Config, theme: Theme) -> Self {
        let layout = Layout::new(&config.ui);
        let width = usize::from(layout.width());
        Self {
            orchestrator: Orchestrator::new(config.download.recent_log_capacity),
            input: TextInput::new(config.ui.char_limit, width),
            spinner: Spinner::default(),
            progress: ProgressBar::new(width),
            layout,
            theme,
            download_dir: config.download.download_dir.clone(),
            exit_when_finished: config.ui.exit_when_finished,
        }
    }

    /// The orchestrator driven by this session
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Current layout
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Text currently in the query field
    pub fn query(&self) -> String {
        self.input.value()
    }

    /// Pre-fill the query field
    pub fn set_query(&mut self, query: &str) {
        self.input.set_value(query);
    }

    /// Submit the query field, as if Enter was pressed
    pub fn submit(&mut self) -> Vec<Command> {
        self.submit_at(chrono::Local::now().naive_local())
    }

    pub(crate) fn submit_at(&mut self, now: NaiveDateTime) -> Vec<Command> {
        let query = self.input.value();
        let destination = destination_for(&self.download_dir, &query, now);
        let effects = self.orchestrator.submit(query, destination);
        if !effects.is_empty() {
            self.spinner.reset();
            self.progress.reset();
        }
        effects.into_iter().map(Command::Run).collect()
    }

    /// Apply one event
    pub fn update(&mut self, event: SessionEvent) -> Vec<Command> {
        match event {
            SessionEvent::Resize { width, .. } => {
                self.layout.resize(width);
                let width = usize::from(self.layout.width());
                self.input.set_width(width);
                self.progress.set_width(width);
                Vec::new()
            }
            SessionEvent::Key(key) => self.handle_key(key),
            SessionEvent::CatalogReady { batch, result } => {
                let effects = self.orchestrator.catalog_resolved(batch, result);
                self.after_transition(effects)
            }
            SessionEvent::FetchCompleted(completion) => {
                let effects = self.orchestrator.fetch_completed(completion);
                self.progress.set_target(self.orchestrator.progress());
                self.after_transition(effects)
            }
            SessionEvent::Tick => {
                if self.orchestrator.phase() == Phase::AwaitingCatalog {
                    self.spinner.tick();
                }
                self.input.tick();
                self.progress.tick();
                Vec::new()
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }

        let interrupt =
            key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        if interrupt || key.code == KeyCode::Esc {
            tracing::info!(phase = ?self.orchestrator.phase(), "Session cancelled by user");
            return vec![Command::Quit];
        }

        if key.code == KeyCode::Enter {
            if self.orchestrator.accepts_query() {
                return self.submit();
            }
            return Vec::new();
        }

        self.input.handle_key(&key);
        Vec::new()
    }

    fn after_transition(&mut self, effects: Vec<Effect>) -> Vec<Command> {
        let mut commands: Vec<_> = effects.into_iter().map(Command::Run).collect();
        if self.orchestrator.is_finished() && self.exit_when_finished {
            tracing::info!("Batch ended, exiting");
            commands.push(Command::Quit);
        }
        commands
    }

    /// One-line description of how the last batch ended
    pub fn summary(&self) -> Option<String> {
        match self.orchestrator.finish_reason()? {
            FinishReason::Completed => {
                let batch = self.orchestrator.batch()?;
                Some(format!(
                    "saved {}, failed {} of {}",
                    batch.saved(),
                    batch.failed(),
                    batch.total()
                ))
            }
            FinishReason::NoResults => Some("no results".to_string()),
            FinishReason::Failed(message) => Some(message.clone()),
        }
    }

    /// Render the current state
    ///
    /// Pure: calling it twice without an intervening update yields the same text.
    pub fn view(&self) -> String {
        let pad = self.layout.pad();
        let theme = &self.theme;
        let input = format!("{}{}", pad, self.input.view(theme));

        match self.orchestrator.phase() {
            Phase::Idle => input,
            Phase::AwaitingCatalog => format!(
                "{}{} {}",
                pad,
                self.spinner.view(),
                theme.dim(self.orchestrator.pending_query().unwrap_or_default())
            ),
            Phase::Downloading => format!(
                "{}\n\n{}{}\n{}{}\n\n{}\n",
                input,
                pad,
                self.progress.view(theme),
                pad,
                theme.dim(&self.orchestrator.current_name().unwrap_or_default()),
                ui::render_log(self.orchestrator.log(), theme, &pad)
            ),
            Phase::Finished => {
                let summary = self.summary().unwrap_or_default();
                let summary = match self.orchestrator.finish_reason() {
                    Some(FinishReason::Failed(_)) => theme.paint(&summary, colors::ERROR),
                    Some(FinishReason::Completed)
                        if self.orchestrator.batch().is_some_and(|b| b.failed() == 0) =>
                    {
                        theme.paint(&summary, colors::OK)
                    }
                    _ => theme.dim(&summary),
                };
                let hint = format!("{}{}\n", pad, theme.dim(FINISHED_HINT));

                if self.orchestrator.batch().is_some() {
                    format!(
                        "{}\n\n{}{}\n{}{}\n\n{}{}",
                        input,
                        pad,
                        self.progress.view(theme),
                        pad,
                        summary,
                        ui::render_log(self.orchestrator.log(), theme, &pad),
                        hint
                    )
                } else {
                    format!("{}\n\n{}{}\n{}", input, pad, summary, hint)
                }
            }
        }
    }
}

/// Hand every [`Command::Run`] to `executor`, returning whether a [`Command::Quit`] was seen
pub(crate) fn dispatch(executor: &EffectExecutor, commands: Vec<Command>) -> bool {
    let mut quit = false;
    for command in commands {
        match command {
            Command::Run(effect) => executor.execute(effect),
            Command::Quit => quit = true,
        }
    }
    quit
}
