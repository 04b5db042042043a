//! Gradient progress bar with eased animation.
//!
//! The orchestrator's progress jumps by `1/total` per item; the bar moves a
//! fraction of the remaining distance on every tick so the jump reads as a
//! slide.

use super::style::{Theme, blend, colors};

const FULL: char = '█';
const EMPTY: char = '░';

/// Width of the percentage suffix, e.g. `" 100%"`
const PERCENT_WIDTH: usize = 5;

/// Fraction of the remaining distance covered per tick
const EASE: f64 = 0.35;

/// Distance below which the animation snaps to its target
const SNAP: f64 = 0.001;

/// Animated progress bar
#[derive(Clone, Debug)]
pub struct ProgressBar {
    width: usize,
    target: f64,
    shown: f64,
}

impl ProgressBar {
    /// Empty bar spanning `width` columns including the percentage
    pub fn new(width: usize) -> Self {
        Self {
            width,
            target: 0.0,
            shown: 0.0,
        }
    }

    /// Total width in columns
    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    /// Fraction the bar animates towards
    pub fn set_target(&mut self, fraction: f64) {
        self.target = fraction.clamp(0.0, 1.0);
    }

    /// Jump back to empty without animating
    pub fn reset(&mut self) {
        self.target = 0.0;
        self.shown = 0.0;
    }

    /// Fraction currently drawn
    pub fn shown(&self) -> f64 {
        self.shown
    }

    /// Whether further ticks would change the drawing
    pub fn is_animating(&self) -> bool {
        self.shown != self.target
    }

    /// Advance the animation by one frame
    pub fn tick(&mut self) {
        if !self.is_animating() {
            return;
        }
        self.shown += (self.target - self.shown) * EASE;
        if (self.target - self.shown).abs() < SNAP {
            self.shown = self.target;
        }
    }

    /// Render the bar followed by the percentage
    pub fn view(&self, theme: &Theme) -> String {
        let bar_width = self.width.saturating_sub(PERCENT_WIDTH).max(1);
        let filled = ((bar_width as f64 * self.shown).round() as usize).min(bar_width);

        let mut out = String::new();
        for i in 0..filled {
            let t = if bar_width > 1 {
                i as f64 / (bar_width - 1) as f64
            } else {
                0.0
            };
            let color = blend(colors::GRADIENT_START, colors::GRADIENT_END, t);
            out.push_str(&theme.paint(&FULL.to_string(), color));
        }
        let empty: String = std::iter::repeat_n(EMPTY, bar_width - filled).collect();
        out.push_str(&theme.paint(&empty, colors::EMPTY));

        out.push_str(&format!(" {:>3.0}%", self.shown * 100.0));
        out
    }
}
