//! Session Controller
//!
//! Drives one generation attempt at a time: validate, synthesize, deliver. All
//! state lives in a single controller task; public methods, delivery ticks and
//! observer notifications are serialized through its command channel, so session
//! state is never mutated from two places at once and observers see updates in
//! a total order.
//!
//! Submitting while a session is generating cancels that session first. A
//! cancelled session produces no further updates.

use crate::binder::Synthesizer;
use crate::delivery::{CancelHandle, DeliveryScheduler};
use crate::error::ApiError;
use crate::export::{ExportAdapter, ExportKind, ExportOutcome};
use crate::session::{ErrorKind, GenerationSession, SessionStatus};
use crate::template::TemplateRegistry;
use crate::types::{GenerationRequest, SessionId};
use futures::Stream;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Observer invoked on every session state or buffer change.
pub type UpdateCallback = Box<dyn Fn(&GenerationSession) + Send + Sync + 'static>;

enum Command {
    Submit {
        request: GenerationRequest,
        reply: oneshot::Sender<SessionId>,
    },
    Cancel {
        reply: oneshot::Sender<Option<SessionId>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Option<GenerationSession>>,
    },
    Observe(UpdateCallback),
    Delivered {
        session: SessionId,
        end: usize,
    },
    DeliveryDone {
        session: SessionId,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running controller. Cheap to clone; all clones drive the same
/// controller.
#[derive(Clone)]
pub struct SessionController {
    commands: mpsc::UnboundedSender<Command>,
    updates: watch::Receiver<Option<GenerationSession>>,
    exporter: ExportAdapter,
}

impl SessionController {
    /// Start a controller task on the current tokio runtime.
    pub fn spawn(
        registry: Arc<TemplateRegistry>,
        synthesizer: Arc<dyn Synthesizer>,
        scheduler: DeliveryScheduler,
        exporter: ExportAdapter,
    ) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (updates_tx, updates) = watch::channel(None);

        let task = ControllerTask {
            registry,
            synthesizer,
            scheduler,
            commands: commands.downgrade(),
            current: None,
            delivery: None,
            observers: Vec::new(),
            updates: updates_tx,
        };
        tokio::spawn(task.run(receiver));

        Self {
            commands,
            updates,
            exporter,
        }
    }

    /// Start a new session for `request`, preempting any session in flight.
    ///
    /// Returns once the session exists; delivery continues in the background.
    pub async fn submit(&self, request: GenerationRequest) -> Result<SessionId, ApiError> {
        self.call(|reply| Command::Submit { request, reply }).await
    }

    /// Cancel the active session. Returns its id if one was generating.
    ///
    /// After this returns, observers see no further growth of that session.
    pub async fn cancel(&self) -> Result<Option<SessionId>, ApiError> {
        self.call(|reply| Command::Cancel { reply }).await
    }

    /// Cancel anything in flight and return to `Idle`.
    pub async fn reset(&self) -> Result<(), ApiError> {
        self.call(|reply| Command::Reset { reply }).await
    }

    /// Latest snapshot of the active session, if any.
    pub async fn current(&self) -> Result<Option<GenerationSession>, ApiError> {
        self.call(|reply| Command::Snapshot { reply }).await
    }

    pub async fn status(&self) -> Result<SessionStatus, ApiError> {
        Ok(self
            .current()
            .await?
            .map(|session| session.status())
            .unwrap_or(SessionStatus::Idle))
    }

    /// Register an observer. It runs on the controller task and must not block.
    ///
    /// Observers cannot be removed; each one lives as long as the controller.
    pub fn on_update<F>(&self, callback: F) -> Result<(), ApiError>
    where
        F: Fn(&GenerationSession) + Send + Sync + 'static,
    {
        self.commands
            .send(Command::Observe(Box::new(callback)))
            .map_err(|_| ApiError::ControllerClosed)
    }

    /// Latest-value view of the active session. `None` while idle.
    pub fn subscribe(&self) -> watch::Receiver<Option<GenerationSession>> {
        self.updates.clone()
    }

    /// Session snapshots published after this call, as a stream.
    ///
    /// Intermediate snapshots may be skipped by a slow consumer; the latest one
    /// is always delivered.
    pub fn updates(&self) -> impl Stream<Item = GenerationSession> + Send + 'static {
        let mut rx = self.subscribe();
        rx.borrow_and_update();
        futures::stream::unfold(rx, |mut rx| async move {
            loop {
                rx.changed().await.ok()?;
                let snapshot = rx.borrow_and_update().clone();
                if let Some(session) = snapshot {
                    return Some((session, rx));
                }
            }
        })
    }

    /// Wait until the active session reaches a terminal state.
    ///
    /// Returns `NoActiveSession` straight away while idle (before the first
    /// submission or after `reset`). `submit` publishes before it returns, so
    /// calling this after a submit always sees that session.
    pub async fn wait_until_settled(&self) -> Result<GenerationSession, ApiError> {
        let mut rx = self.subscribe();
        if rx.borrow_and_update().is_none() {
            return Err(ApiError::NoActiveSession);
        }
        let settled = rx
            .wait_for(|snapshot| snapshot.as_ref().is_some_and(GenerationSession::is_terminal))
            .await
            .map_err(|_| ApiError::ControllerClosed)?;
        settled.clone().ok_or(ApiError::ControllerClosed)
    }

    /// Export the active session's delivered text. Session state is unaffected.
    pub async fn export_current(&self, kind: ExportKind) -> Result<ExportOutcome, ApiError> {
        match self.current().await? {
            Some(session) => Ok(self.exporter.export(kind, &session)?),
            None => Ok(ExportOutcome::NothingToExport),
        }
    }

    pub fn exporter(&self) -> &ExportAdapter {
        &self.exporter
    }

    /// Cancel anything in flight and stop the controller task.
    pub async fn shutdown(&self) -> Result<(), ApiError> {
        self.call(|reply| Command::Shutdown { reply }).await
    }

    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ApiError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| ApiError::ControllerClosed)?;
        response.await.map_err(|_| ApiError::ControllerClosed)
    }
}

struct ControllerTask {
    registry: Arc<TemplateRegistry>,
    synthesizer: Arc<dyn Synthesizer>,
    scheduler: DeliveryScheduler,
    // Weak so the channel closes once every handle and delivery is gone.
    commands: mpsc::WeakUnboundedSender<Command>,
    current: Option<GenerationSession>,
    delivery: Option<CancelHandle>,
    observers: Vec<UpdateCallback>,
    updates: watch::Sender<Option<GenerationSession>>,
}

impl ControllerTask {
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Command>) {
        debug!("Session controller started");
        while let Some(command) = receiver.recv().await {
            match command {
                Command::Submit { request, reply } => {
                    let id = self.submit(request);
                    let _ = reply.send(id);
                }
                Command::Cancel { reply } => {
                    let cancelled = self.cancel_active();
                    let _ = reply.send(cancelled);
                }
                Command::Reset { reply } => {
                    self.cancel_active();
                    self.current = None;
                    self.updates.send_replace(None);
                    debug!("Session controller reset to idle");
                    let _ = reply.send(());
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.current.clone());
                }
                Command::Observe(callback) => self.observers.push(callback),
                Command::Delivered { session, end } => self.on_delivered(&session, end),
                Command::DeliveryDone { session } => self.on_delivery_done(&session),
                Command::Shutdown { reply } => {
                    self.cancel_active();
                    let _ = reply.send(());
                    break;
                }
            }
        }
        if let Some(delivery) = self.delivery.take() {
            delivery.cancel();
        }
        debug!("Session controller stopped");
    }

    fn submit(&mut self, request: GenerationRequest) -> SessionId {
        if let Some(preempted) = self.cancel_active() {
            info!(session_id = %preempted, "Session preempted by new submission");
        }

        let mut session = GenerationSession::new(Arc::new(request));
        let id = session.id().clone();
        let category = session.request().category;
        info!(session_id = %id, category = %category, "Session submitted");
        self.replace(session.clone());

        if !session.request().has_details() {
            session.fail(ErrorKind::EmptyInput, "project details are required");
            warn!(session_id = %id, "Session rejected: empty project details");
            self.replace(session);
            return id;
        }

        let template = self.registry.lookup(category);
        let text = match self.synthesizer.synthesize(template, session.request()) {
            Ok(text) => text,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Session failed during synthesis");
                session.fail(ErrorKind::BindFailed, e.to_string());
                self.replace(session);
                return id;
            }
        };

        let full_text: Arc<str> = Arc::from(text);
        session.begin_generating(Arc::clone(&full_text));
        if full_text.is_empty() {
            session.complete();
            info!(session_id = %id, "Session completed with empty document");
            self.replace(session);
            return id;
        }
        debug!(session_id = %id, total = full_text.len(), "Delivery starting");
        self.replace(session);
        self.delivery = Some(self.start_delivery(id.clone(), full_text));
        id
    }

    fn start_delivery(&self, id: SessionId, full_text: Arc<str>) -> CancelHandle {
        let chunk_tx = self.commands.upgrade();
        let done_tx = self.commands.upgrade();
        let chunk_id = id.clone();
        self.scheduler.start_delivery(
            full_text,
            move |prefix| {
                if let Some(tx) = &chunk_tx {
                    let _ = tx.send(Command::Delivered {
                        session: chunk_id.clone(),
                        end: prefix.len(),
                    });
                }
            },
            move || {
                if let Some(tx) = done_tx {
                    let _ = tx.send(Command::DeliveryDone { session: id });
                }
            },
        )
    }

    fn cancel_active(&mut self) -> Option<SessionId> {
        if let Some(delivery) = self.delivery.take() {
            delivery.cancel();
        }
        let session = self.current.as_mut()?;
        if !session.cancel() {
            return None;
        }
        let id = session.id().clone();
        info!(
            session_id = %id,
            delivered = session.delivered_len(),
            total = session.full_text().len(),
            "Session cancelled"
        );
        self.publish();
        Some(id)
    }

    fn on_delivered(&mut self, id: &SessionId, end: usize) {
        let Some(session) = self.current.as_mut().filter(|s| s.id() == id) else {
            return;
        };
        if !session.advance_to(end) {
            return;
        }
        if session.status() == SessionStatus::Completed {
            info!(session_id = %id, total = end, "Session completed");
            self.delivery = None;
        }
        self.publish();
    }

    fn on_delivery_done(&mut self, id: &SessionId) {
        let Some(session) = self.current.as_mut().filter(|s| s.id() == id) else {
            return;
        };
        // Normally already completed by the final chunk.
        if session.status() == SessionStatus::Generating {
            session.complete();
            info!(session_id = %id, "Session completed");
            self.publish();
        }
        self.delivery = None;
    }

    fn replace(&mut self, session: GenerationSession) {
        self.current = Some(session);
        self.publish();
    }

    fn publish(&self) {
        let Some(session) = &self.current else {
            return;
        };
        for observer in &self.observers {
            observer(session);
        }
        self.updates.send_replace(Some(session.clone()));
    }
}
