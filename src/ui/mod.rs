//! Presentation widgets and layout for the inline terminal view.
//!
//! Everything here renders to plain `String`s; the session decides when to
//! draw them.

mod input;
mod progress;
mod spinner;
pub mod style;

pub use input::{PLACEHOLDER, PROMPT, TextInput};
pub use progress::ProgressBar;
pub use spinner::{FRAMES as SPINNER_FRAMES, Spinner};
pub use style::Theme;

use crate::config::UiConfig;
use crate::orchestrator::RecentLog;
use style::colors;

/// Marker for a saved file
pub const OK_MARK: &str = "✓";

/// Marker for a failed file
pub const ERROR_MARK: &str = "✗";

/// Horizontal layout of the view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    padding: u16,
    max_width: u16,
    width: u16,
}

impl Layout {
    /// Layout before the first resize event
    pub fn new(config: &UiConfig) -> Self {
        let width = config
            .max_width
            .saturating_sub(config.padding.saturating_mul(2))
            .saturating_sub(4)
            .max(1);
        Self {
            padding: config.padding,
            max_width: config.max_width,
            width,
        }
    }

    /// Fit the content width to a terminal `screen_width` columns wide
    pub fn resize(&mut self, screen_width: u16) {
        let available = screen_width.saturating_sub(self.padding.saturating_mul(2));
        self.width = available.min(self.max_width).max(1);
    }

    /// Content width in columns
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Left padding
    pub fn pad(&self) -> String {
        " ".repeat(usize::from(self.padding))
    }
}

/// One line per entry in `log`: `[✓] name` or `[✗] name`, oldest first
pub fn render_log(log: &RecentLog, theme: &Theme, pad: &str) -> String {
    let mut out = String::new();
    for (name, outcome) in log.entries() {
        let mark = if outcome.is_ok() {
            theme.paint(OK_MARK, colors::OK)
        } else {
            theme.paint(ERROR_MARK, colors::ERROR)
        };
        out.push_str(&format!("{}[{}] {}\n", pad, mark, theme.dim(name)));
    }
    out
}
