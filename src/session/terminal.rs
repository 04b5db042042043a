//! Interactive driver: raw-mode terminal, inline redraws.

use crossterm::event::{Event, EventStream};
use crossterm::{cursor, queue, terminal};
use futures::StreamExt;
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{Command, EffectExecutor, Session, SessionEvent, dispatch};
use crate::error::{Error, Result};

fn terminal_error(context: &str, e: io::Error) -> Error {
    Error::Terminal(format!("{}: {}", context, e))
}

/// Raw mode and a hidden cursor for as long as it lives
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().map_err(|e| terminal_error("failed to enable raw mode", e))?;
        let guard = Self;
        let mut stdout = io::stdout();
        queue!(stdout, cursor::Hide)
            .and_then(|_| stdout.flush())
            .map_err(|e| terminal_error("failed to hide cursor", e))?;
        Ok(guard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = queue!(stdout, cursor::Show);
        let _ = stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}

/// Redraws the view in place below the shell prompt
struct InlineRenderer<W: Write> {
    out: W,
    last: Option<String>,
    lines: u16,
}

impl<W: Write> InlineRenderer<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            lines: 0,
        }
    }

    fn draw(&mut self, view: &str) -> io::Result<()> {
        if self.last.as_deref() == Some(view) {
            return Ok(());
        }

        queue!(self.out, cursor::MoveToColumn(0))?;
        if self.lines > 1 {
            queue!(self.out, cursor::MoveUp(self.lines - 1))?;
        }
        queue!(self.out, terminal::Clear(terminal::ClearType::FromCursorDown))?;

        let lines: Vec<&str> = view.split('\n').collect();
        write!(self.out, "{}", lines.join("\r\n"))?;
        self.out.flush()?;

        self.lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        self.last = Some(view.to_string());
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        write!(self.out, "\r\n")?;
        self.out.flush()
    }
}

/// Run the interactive session until the user quits or the batch ends with
/// `exit_when_finished` set
///
/// With `submit_immediately` the pre-filled query is submitted before the
/// first key press.
///
/// # Errors
/// Returns [`Error::Terminal`] if the terminal cannot be put into raw mode,
/// read from or drawn to.
pub async fn run_terminal(
    session: &mut Session,
    executor: &EffectExecutor,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    tick: Duration,
    submit_immediately: bool,
) -> Result<()> {
    let _guard = RawModeGuard::enable()?;
    let mut renderer = InlineRenderer::new(io::stdout());
    let draw_error = |e| terminal_error("failed to draw", e);

    if let Ok((width, height)) = terminal::size() {
        session.update(SessionEvent::Resize { width, height });
    }
    let mut quit = submit_immediately && dispatch(executor, session.submit());
    renderer.draw(&session.view()).map_err(draw_error)?;

    let mut input = EventStream::new();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while !quit {
        let commands = tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => session.update(SessionEvent::Key(key)),
                Some(Ok(Event::Resize(width, height))) => {
                    session.update(SessionEvent::Resize { width, height })
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => return Err(terminal_error("failed to read input", e)),
                None => vec![Command::Quit],
            },
            Some(event) = events.recv() => session.update(event),
            _ = ticker.tick() => session.update(SessionEvent::Tick),
        };

        quit = dispatch(executor, commands);
        renderer.draw(&session.view()).map_err(draw_error)?;
    }

    executor.abandon();
    renderer.finish().map_err(draw_error)?;
    tracing::info!("Session ended");
    Ok(())
}
