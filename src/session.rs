//! Session runtime: the single task that owns a [`Workbench`].
//!
//! DESIGN
//! ======
//! All workbench mutation happens on one task, so panel, clock and selection
//! state need no locks. Callers talk to it through a cloneable
//! [`SessionHandle`]; the only other task is the [`Ticker`], which posts
//! ticks into the same `select!` loop.
//!
//! LIFECYCLE
//! =========
//! 1. `spawn_session` moves the workbench onto its task
//! 2. commands arrive on the input channel → dispatch → reply frame
//! 3. after every event the ticker is armed or disarmed to follow the clock
//! 4. shutdown (or every handle dropped) → ticker dropped → workbench returned
//!
//! Ticks from a disarmed ticker carry an old generation and are discarded.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::{Data, Frame};
use crate::services::command::Command;
use crate::services::ticker::{Tick, Ticker};
use crate::workbench::{Workbench, WorkbenchSnapshot};

const INPUT_CAPACITY: usize = 64;
/// Ticks beyond this backlog are dropped by the ticker.
const TICK_CAPACITY: usize = 4;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session closed")]
    Closed,
}

impl crate::frame::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        "E_SESSION_CLOSED"
    }
}

enum SessionInput {
    Command { command: Command, reply: oneshot::Sender<Frame> },
    Subscribe { sink: mpsc::Sender<Frame>, ack: oneshot::Sender<Uuid> },
    Unsubscribe(Uuid),
    Snapshot(oneshot::Sender<WorkbenchSnapshot>),
    Shutdown,
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionInput>,
    sink_capacity: usize,
}

impl std::fmt::Debug for SessionInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command { command, .. } => f.debug_tuple("Command").field(&command.kind).finish(),
            Self::Subscribe { .. } => f.write_str("Subscribe"),
            Self::Unsubscribe(id) => f.debug_tuple("Unsubscribe").field(id).finish(),
            Self::Snapshot(_) => f.write_str("Snapshot"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl SessionHandle {
    /// Dispatch a command and wait for its reply frame (`done` or `error`).
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] when the session task has stopped.
    pub async fn dispatch(&self, command: Command) -> Result<Frame, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionInput::Command { command, reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Subscribe a new bounded frame sink. Returns its id and receiver.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] when the session task has stopped.
    pub async fn subscribe(&self) -> Result<(Uuid, mpsc::Receiver<Frame>), SessionError> {
        let (sink, frames) = mpsc::channel(self.sink_capacity);
        let (ack, rx) = oneshot::channel();
        self.send(SessionInput::Subscribe { sink, ack }).await?;
        let id = rx.await.map_err(|_| SessionError::Closed)?;
        Ok((id, frames))
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] when the session task has stopped.
    pub async fn unsubscribe(&self, id: Uuid) -> Result<(), SessionError> {
        self.send(SessionInput::Unsubscribe(id)).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] when the session task has stopped.
    pub async fn snapshot(&self) -> Result<WorkbenchSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionInput::Snapshot(reply)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Ask the session to stop. The join handle yields the workbench.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] when the session task has already stopped.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionInput::Shutdown).await
    }

    async fn send(&self, input: SessionInput) -> Result<(), SessionError> {
        self.tx.send(input).await.map_err(|_| SessionError::Closed)
    }
}

// =============================================================================
// RUNTIME
// =============================================================================

/// Move `workbench` onto its own task. The tick period comes from the
/// workbench config.
#[must_use]
pub fn spawn_session(workbench: Workbench) -> (SessionHandle, JoinHandle<Workbench>) {
    let (tx, rx) = mpsc::channel(INPUT_CAPACITY);
    let handle = SessionHandle { tx, sink_capacity: workbench.config().sink_capacity };
    let task = tokio::spawn(run_session(workbench, rx));
    (handle, task)
}

struct TickerSlot {
    period: Duration,
    tx: mpsc::Sender<Tick>,
    generation: u64,
    active: Option<Ticker>,
}

impl TickerSlot {
    /// Arm when the clock runs, disarm when it does not.
    fn sync(&mut self, running: bool) {
        match (running, self.active.is_some()) {
            (true, false) => {
                self.generation += 1;
                self.active = Some(Ticker::spawn(self.generation, self.period, self.tx.clone()));
            }
            (false, true) => self.active = None,
            _ => {}
        }
    }

    fn is_current(&self, tick: &Tick) -> bool {
        self.active.as_ref().is_some_and(|t| t.generation() == tick.generation)
    }
}

async fn run_session(mut workbench: Workbench, mut rx: mpsc::Receiver<SessionInput>) -> Workbench {
    let (tick_tx, mut tick_rx) = mpsc::channel(TICK_CAPACITY);
    let mut ticker = TickerSlot { period: workbench.config().tick_period, tx: tick_tx, generation: 0, active: None };

    info!(dataset = workbench.dataset().map_or("-", |d| d.id.as_str()), "session: started");

    loop {
        tokio::select! {
            input = rx.recv() => {
                let Some(input) = input else { break };
                debug!(input = ?input, "session: input");
                match input {
                    SessionInput::Command { command, reply } => {
                        let frame = handle_command(&mut workbench, &command);
                        if reply.send(frame).is_err() {
                            debug!(kind = %command.kind, "session: reply receiver dropped");
                        }
                    }
                    SessionInput::Subscribe { sink, ack } => {
                        let id = workbench.subscribe_sink(sink);
                        if ack.send(id).is_err() {
                            workbench.unsubscribe_sink(id);
                        }
                    }
                    SessionInput::Unsubscribe(id) => {
                        if !workbench.unsubscribe_sink(id) {
                            debug!(sink = %id, "session: unsubscribe of unknown sink");
                        }
                    }
                    SessionInput::Snapshot(reply) => {
                        if reply.send(workbench.snapshot()).is_err() {
                            debug!("session: snapshot receiver dropped");
                        }
                    }
                    SessionInput::Shutdown => break,
                }
            }
            Some(tick) = tick_rx.recv() => {
                if ticker.is_current(&tick) {
                    if let Err(err) = workbench.on_tick(tick.delta) {
                        warn!(error = %err, "session: tick rejected");
                    }
                } else {
                    debug!(generation = tick.generation, "session: stale tick ignored");
                }
            }
        }
        ticker.sync(workbench.clock().is_running());
    }

    ticker.active = None;
    info!("session: stopped");
    workbench
}

/// Run one command and build its reply frame.
fn handle_command(workbench: &mut Workbench, command: &Command) -> Frame {
    let request = Frame::request(format!("command:{}", command.kind), Data::new())
        .with_dataset_id(workbench.dataset().map(|d| d.id.as_str()));
    match workbench.dispatch(command) {
        Ok(data) => request.done_with(data),
        Err(err) => request.error_from(&err),
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
