//! Colors and text painting.

use crossterm::style::{Attribute, Color, Stylize};

/// Palette used by every widget
pub mod colors {
    use crossterm::style::Color;

    /// Secondary text: file names, placeholder, pending query
    pub const DIM: Color = Color::Rgb {
        r: 0x62,
        g: 0x62,
        b: 0x62,
    };
    /// Successful fetch marker
    pub const OK: Color = Color::Rgb {
        r: 0x50,
        g: 0xFA,
        b: 0x7B,
    };
    /// Failed fetch marker and error messages
    pub const ERROR: Color = Color::Rgb {
        r: 0xFF,
        g: 0x55,
        b: 0x55,
    };
    /// Left end of the progress gradient
    pub const GRADIENT_START: Color = Color::Rgb {
        r: 0x8B,
        g: 0xE9,
        b: 0xFD,
    };
    /// Right end of the progress gradient
    pub const GRADIENT_END: Color = Color::Rgb {
        r: 0xFF,
        g: 0x79,
        b: 0xC6,
    };
    /// Unfilled part of the progress bar
    pub const EMPTY: Color = Color::Rgb {
        r: 0x60,
        g: 0x60,
        b: 0x60,
    };
}

/// Whether views carry ANSI colors
///
/// Headless output and tests use [`Theme::plain`], which renders the same
/// text without escape sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    colored: bool,
}

impl Theme {
    /// Theme emitting ANSI colors
    pub fn colored() -> Self {
        Self { colored: true }
    }

    /// Theme emitting bare text
    pub fn plain() -> Self {
        Self { colored: false }
    }

    /// Whether ANSI colors are emitted
    pub fn is_colored(&self) -> bool {
        self.colored
    }

    /// `text` in `color`
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.colored {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// `text` in [`colors::DIM`]
    pub fn dim(&self, text: &str) -> String {
        self.paint(text, colors::DIM)
    }

    /// `text` with foreground and background swapped (the input cursor)
    pub fn reverse(&self, text: &str) -> String {
        if self.colored {
            text.attribute(Attribute::Reverse).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::colored()
    }
}

/// Linear blend between two RGB colors, `t` clamped to `[0.0, 1.0]`
///
/// Non-RGB colors are returned unchanged from `start`.
pub fn blend(start: Color, end: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    match (start, end) {
        (
            Color::Rgb {
                r: r1,
                g: g1,
                b: b1,
            },
            Color::Rgb {
                r: r2,
                g: g2,
                b: b2,
            },
        ) => {
            let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
            Color::Rgb {
                r: mix(r1, r2),
                g: mix(g1, g2),
                b: mix(b1, b2),
            }
        }
        _ => start,
    }
}
