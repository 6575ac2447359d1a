//! Session lifetime
//!
//! A session owns the coordinator task and the engines' event wiring. It is
//! created once per conversation screen and ended with [`SessionHandle::shutdown`]
//! (or by dropping the handle).

use super::{Collaborators, TurnCoordinator, TurnPolicy, TurnSnapshot};
use crate::events::{EventSink, SessionEvent};
use crate::language::{Language, LanguageMode};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct SessionHandle {
    sink: EventSink,
    state: watch::Receiver<TurnSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Attach the engines and spawn the coordinator. Must run inside a tokio runtime.
    pub fn start(services: Collaborators, policy: TurnPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(tx);
        services.speech.attach(sink.clone());
        services.tts.attach(sink.clone());

        let (snapshot_tx, state) = watch::channel(TurnSnapshot::default());
        let coordinator = TurnCoordinator::new(services, policy, snapshot_tx);
        let task = tokio::spawn(coordinator.run(rx));

        Self {
            sink,
            state,
            task: Some(task),
        }
    }

    /// Mic button: start listening, or stop when already listening
    pub fn press_mic(&self) -> bool {
        self.sink.send(SessionEvent::MicPressed)
    }

    /// Start listening; a no-op while already listening
    pub fn start_listening(&self) -> bool {
        self.sink.send(SessionEvent::StartListening)
    }

    pub fn stop(&self) -> bool {
        self.sink.send(SessionEvent::Stop)
    }

    pub fn configure(&self, mode: LanguageMode, language: Language) -> bool {
        self.sink.send(SessionEvent::Configure { mode, language })
    }

    /// Inject any session event
    pub fn send(&self, event: SessionEvent) -> bool {
        self.sink.send(event)
    }

    /// Sink for engines created after the session started
    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    pub fn snapshot(&self) -> TurnSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TurnSnapshot> {
        self.state.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    /// Returns `None` on timeout or once the session is gone.
    pub async fn wait_for<F>(&self, predicate: F, timeout: Duration) -> Option<TurnSnapshot>
    where
        F: FnMut(&TurnSnapshot) -> bool,
    {
        let mut state = self.state.clone();
        let snapshot = match tokio::time::timeout(timeout, state.wait_for(predicate)).await {
            Ok(Ok(snapshot)) => Some(snapshot.clone()),
            Ok(Err(_)) => None,
            Err(_) => {
                debug!("Timed out waiting for session state");
                None
            }
        };
        snapshot
    }

    /// End the session: detach the engines and wait for the coordinator to exit
    pub async fn shutdown(mut self) {
        self.sink.send(SessionEvent::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("⚠️ Session task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.sink.send(SessionEvent::Shutdown);
        }
    }
}
