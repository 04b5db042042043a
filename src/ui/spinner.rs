//! Braille dot spinner shown while a lookup is outstanding.

/// Animation frames, one per tick
pub const FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Spinner state
#[derive(Clone, Debug, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    /// Advance to the next frame
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % FRAMES.len();
    }

    /// Back to the first frame
    pub fn reset(&mut self) {
        self.frame = 0;
    }

    /// Current frame
    pub fn view(&self) -> &'static str {
        FRAMES[self.frame % FRAMES.len()]
    }
}
