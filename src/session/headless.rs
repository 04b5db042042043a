//! Line-oriented driver for non-interactive output.

use std::future::Future;
use std::io::Write;
use tokio::sync::mpsc;

use super::{EffectExecutor, Session, SessionEvent, dispatch};
use crate::error::Result;
use crate::types::Outcome;
use crate::ui::{ERROR_MARK, OK_MARK};

/// Run one batch for `query` without a terminal UI
///
/// Prints one line per attempted item and a summary line to `out`. Returns
/// once the batch ends, the event channel closes, or SIGINT/SIGTERM arrives.
pub async fn run_headless<W: Write>(
    session: &mut Session,
    executor: &EffectExecutor,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    query: &str,
    out: &mut W,
) -> Result<()> {
    run_until(session, executor, events, query, out, wait_for_signal()).await
}

/// [`run_headless`] with an arbitrary shutdown trigger in place of SIGINT/SIGTERM
pub(crate) async fn run_until<W: Write>(
    session: &mut Session,
    executor: &EffectExecutor,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    query: &str,
    out: &mut W,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    // Polled across iterations so a signal during update or dispatch is kept
    tokio::pin!(shutdown);

    session.set_query(query);
    if dispatch(executor, session.submit()) {
        return Ok(());
    }

    loop {
        if session.orchestrator().is_finished() {
            if let Some(summary) = session.summary() {
                writeln!(out, "{}", summary)?;
            }
            break;
        }

        let event = tokio::select! {
            event = events.recv() => event,
            _ = &mut shutdown => {
                executor.abandon();
                writeln!(out, "interrupted")?;
                break;
            }
        };
        let Some(event) = event else {
            break;
        };

        let cursor = session.orchestrator().cursor();
        let commands = session.update(event);
        if session.orchestrator().cursor() > cursor
            && let Some((name, outcome)) = session.orchestrator().log().entries().last()
        {
            match outcome {
                Outcome::Saved { bytes } => {
                    writeln!(out, "[{}] {} ({} bytes)", OK_MARK, name, bytes)?
                }
                Outcome::Failed { error } => writeln!(out, "[{}] {}: {}", ERROR_MARK, name, error)?,
            }
        }

        if dispatch(executor, commands) && !session.orchestrator().is_finished() {
            executor.abandon();
            break;
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C signal");
            } else {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
