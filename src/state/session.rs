//! Session context shared by the panel, the connection task and the countdowns

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::{LogEntry, LogPanel, LogStyle, SlotSnapshot, Tick, TimerSlot};
use crate::{
    error::SessionError,
    protocol::{Command, Notice, SlotId},
    tasks::spawn_countdown,
};

/// Lifecycle of the single backend connection; `Closed` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Everything the panel renders, published on every change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelSnapshot {
    pub backend: String,
    pub connection: ConnectionState,
    pub slots: Vec<SlotSnapshot>,
    pub log: Vec<LogEntry>,
}

/// The one session context of the process.
///
/// Locks are never held across an `.await`. When more than one is taken,
/// a slot lock is always taken before the connection, outbound and log locks.
#[derive(Debug)]
pub struct Session {
    backend_uri: String,
    started_at: Instant,
    /// One entry per slot, indexed by `SlotId::index`
    slots: Vec<Mutex<TimerSlot>>,
    log: Mutex<LogPanel>,
    connection: Mutex<ConnectionState>,
    /// Queue drained by the connection task; `None` once torn down
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    snapshot_tx: watch::Sender<PanelSnapshot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    /// Create the session and the receiving end of its outbound queue
    pub fn new(backend_uri: impl Into<String>) -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let backend_uri = backend_uri.into();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let slots = SlotId::all().map(|id| Mutex::new(TimerSlot::new(id))).collect();
        let (snapshot_tx, _) = watch::channel(PanelSnapshot {
            backend: backend_uri.clone(),
            connection: ConnectionState::Connecting,
            slots: Vec::new(),
            log: Vec::new(),
        });

        let session = Arc::new(Self {
            backend_uri,
            started_at: Instant::now(),
            slots,
            log: Mutex::new(LogPanel::new()),
            connection: Mutex::new(ConnectionState::Connecting),
            outbound: Mutex::new(Some(outbound_tx)),
            snapshot_tx,
        });
        session.publish();
        (session, outbound_rx)
    }

    pub fn backend_uri(&self) -> &str {
        &self.backend_uri
    }

    pub fn connection_state(&self) -> ConnectionState {
        *lock(&self.connection)
    }

    fn slot(&self, id: SlotId) -> MutexGuard<'_, TimerSlot> {
        lock(&self.slots[id.index()])
    }

    /// Resolve a user-supplied slot index
    pub fn slot_id(&self, index: usize) -> Result<SlotId, SessionError> {
        SlotId::new(index).ok_or(SessionError::UnknownSlot(index))
    }

    /// Arm slot `id` on the backend and start its local countdown.
    ///
    /// Rejected while the slot's Set control is disabled.
    pub fn set(self: &Arc<Self>, id: SlotId, seconds: u64) -> Result<(), SessionError> {
        let result = {
            let mut slot = self.slot(id);
            if !slot.set_enabled() {
                Err(SessionError::SetDisabled(id))
            } else {
                self.transmit(&Command::Set { slot: id, seconds }).map(|()| {
                    slot.disable_set();
                    self.start_countdown(&mut slot, seconds);
                })
            }
        };
        if result.is_ok() {
            info!("Slot {} set for {}s", id, seconds);
        }
        self.publish();
        result
    }

    /// Ask the backend to cancel slot `id`; local state waits for confirmation
    pub fn cancel(&self, id: SlotId) -> Result<(), SessionError> {
        let result = self.transmit(&Command::Cancel { slot: id });
        if result.is_ok() {
            info!("Cancel requested for slot {}", id);
        }
        self.publish();
        result
    }

    /// Re-arm slot `id` and restart its local countdown from `seconds`
    pub fn reset(self: &Arc<Self>, id: SlotId, seconds: u64) -> Result<(), SessionError> {
        let result = {
            let mut slot = self.slot(id);
            self.transmit(&Command::Reset { slot: id, seconds }).map(|()| {
                if slot.stop_countdown() {
                    debug!("Stopped running countdown for slot {}", id);
                }
                self.start_countdown(&mut slot, seconds);
            })
        };
        if result.is_ok() {
            info!("Slot {} reset to {}s", id, seconds);
        }
        self.publish();
        result
    }

    fn start_countdown(self: &Arc<Self>, slot: &mut TimerSlot, seconds: u64) {
        let remaining_ms = i64::try_from(seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
        slot.remember_seconds(seconds);
        let generation = slot.begin_countdown(remaining_ms);
        let handle = spawn_countdown(Arc::downgrade(self), slot.id(), generation);
        slot.attach_countdown(handle);
    }

    /// Log and transmit a raw message to the backend.
    ///
    /// Only an open connection accepts messages; before it opens and after it
    /// closes they are rejected and logged as not sent.
    pub fn send(&self, message: &str) -> Result<(), SessionError> {
        let result = self.transmit_raw(message);
        self.publish();
        result
    }

    fn transmit(&self, command: &Command) -> Result<(), SessionError> {
        self.transmit_raw(&command.to_string())
    }

    fn transmit_raw(&self, message: &str) -> Result<(), SessionError> {
        let open = self.connection_state() == ConnectionState::Open;
        let queued = open
            && lock(&self.outbound)
                .as_ref()
                .is_some_and(|tx| tx.send(message.to_string()).is_ok());

        if queued {
            self.push_log(LogStyle::Info, format!("SENT: {}", message));
            debug!("Queued message {:?}", message);
            Ok(())
        } else {
            self.push_unsent(message);
            Err(SessionError::Disconnected)
        }
    }

    /// Record a message that was queued but never reached the backend
    pub fn message_lost(&self, message: &str) {
        self.push_unsent(message);
        self.publish();
    }

    fn push_unsent(&self, message: &str) {
        warn!("Dropping message {:?}: backend connection is not open", message);
        self.push_log(LogStyle::Error, format!("NOT SENT: {}", message));
    }

    /// Handle one inbound text frame from the backend
    pub fn handle_message(&self, raw: &str) {
        self.push_log(LogStyle::Response, format!("RESPONSE: {}", raw));

        match Notice::decode(raw) {
            Ok(notice) => self.apply(notice),
            Err(e) => warn!("Ignoring malformed message {:?}: {}", raw, e),
        }
        self.publish();
    }

    /// Apply a decoded notice to the matching slot
    pub fn apply(&self, notice: Notice) {
        match notice {
            Notice::CancelDone(id) => {
                info!("Backend confirmed cancel of slot {}", id);
                self.slot(id).confirm_cancelled();
            }
            Notice::CallbackExecuted(id) => {
                info!("Backend executed callback for slot {}", id);
                self.slot(id).confirm_executed();
            }
            Notice::Acknowledged { verb, slot } => {
                debug!("Backend acknowledged {} for slot {}", verb, slot);
            }
            Notice::Unrecognized => {
                debug!("Unrecognized message from backend");
            }
        }
    }

    /// Advance the countdown of `id`; called by its countdown task
    pub fn tick(&self, id: SlotId, generation: u64) -> Tick {
        let tick = self.slot(id).tick(generation);
        self.publish();
        tick
    }

    pub fn connection_opened(&self) {
        *lock(&self.connection) = ConnectionState::Open;
        info!("Connected to backend at {}", self.backend_uri);
        self.push_log(LogStyle::Info, "CONNECTED");
        self.publish();
    }

    /// Record a connection-level error; the caller follows with `connection_closed`
    pub fn connection_failed(&self, reason: &str) {
        warn!("Backend connection error: {}", reason);
        self.push_log(LogStyle::Error, format!("ERROR: {}", reason));
        self.publish();
    }

    /// Mark the connection closed for the rest of the session
    pub fn connection_closed(&self) {
        {
            let mut state = lock(&self.connection);
            if *state == ConnectionState::Closed {
                return;
            }
            *state = ConnectionState::Closed;
        }
        lock(&self.outbound).take();
        info!("Disconnected from backend");
        self.push_log(LogStyle::Error, "DISCONNECTED");
        self.publish();
    }

    /// Stop every countdown and close the outbound queue
    pub fn teardown(&self) {
        info!("Tearing down session");
        for id in SlotId::all() {
            self.slot(id).stop_countdown();
        }
        lock(&self.outbound).take();
        self.publish();
    }

    fn push_log(&self, style: LogStyle, text: impl Into<String>) {
        lock(&self.log).push(LogEntry::new(style, text));
    }

    pub fn slot_snapshot(&self, id: SlotId) -> SlotSnapshot {
        self.slot(id).snapshot()
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            backend: self.backend_uri.clone(),
            connection: self.connection_state(),
            slots: SlotId::all().map(|id| self.slot_snapshot(id)).collect(),
            log: lock(&self.log).to_vec(),
        }
    }

    /// Watch the panel state; a new snapshot is published on every change
    pub fn subscribe(&self) -> watch::Receiver<PanelSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    /// Time since the session was created, formatted for display
    pub fn uptime(&self) -> String {
        let secs = self.started_at.elapsed().as_secs();
        let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::DisplayState;

    fn slot(index: usize) -> SlotId {
        SlotId::new(index).unwrap()
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut sent = Vec::new();
        while let Ok(message) = rx.try_recv() {
            sent.push(message);
        }
        sent
    }

    fn open_session() -> (Arc<Session>, mpsc::UnboundedReceiver<String>) {
        let (session, rx) = Session::new("ws://localhost:7654");
        session.connection_opened();
        (session, rx)
    }

    fn log_texts(session: &Session) -> Vec<String> {
        session.snapshot().log.into_iter().map(|e| e.text).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn set_sends_command_and_starts_countdown_on_every_slot() {
        let (session, mut rx) = open_session();

        for id in SlotId::all() {
            session.set(id, 3).unwrap();
            assert_eq!(drain(&mut rx), vec![format!("SET:{}:3", id)]);

            let snapshot = session.slot_snapshot(id);
            assert_eq!(snapshot.status, DisplayState::Active);
            assert_eq!(snapshot.remaining_ms, 3_000);
            assert!(!snapshot.set_enabled);
            assert!(snapshot.counting);
        }
        assert_eq!(log_texts(&session).last().map(String::as_str), Some("SENT: SET:4:3"));
    }

    #[tokio::test(start_paused = true)]
    async fn set_is_rejected_while_disabled() {
        let (session, mut rx) = open_session();
        session.set(slot(1), 10).unwrap();
        drain(&mut rx);

        assert_eq!(session.set(slot(1), 10), Err(SessionError::SetDisabled(slot(1))));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_sends_command_without_local_change() {
        let (session, mut rx) = open_session();

        for id in SlotId::all() {
            let before = session.slot_snapshot(id);
            session.cancel(id).unwrap();
            assert_eq!(drain(&mut rx), vec![format!("CANCEL:{}:", id)]);
            assert_eq!(session.slot_snapshot(id), before);
        }
    }

    #[tokio::test]
    async fn cancel_confirmation_on_inactive_slot_is_a_no_op() {
        let (session, _rx) = Session::new("ws://localhost:7654");
        let before = session.slot_snapshot(slot(3));

        session.handle_message("CANCEL DONE:3");
        assert_eq!(session.slot_snapshot(slot(3)), before);
        assert_eq!(session.slot_snapshot(slot(3)).status, DisplayState::NotActive);
        assert_eq!(log_texts(&session), vec!["RESPONSE: CANCEL DONE:3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_confirmation_stops_the_countdown() {
        let (session, _rx) = open_session();
        session.set(slot(0), 10).unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(session.slot_snapshot(slot(0)).status, DisplayState::Remaining(9_800));

        session.handle_message("CANCEL DONE:0");
        tokio::time::sleep(Duration::from_millis(200)).await;

        let snapshot = session.slot_snapshot(slot(0));
        assert_eq!(snapshot.status, DisplayState::NotActive);
        assert_eq!(snapshot.remaining_ms, 9_800);
        assert!(snapshot.set_enabled);
        assert!(!snapshot.counting);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_executed_after_local_expiry() {
        let (session, mut rx) = open_session();
        session.set(slot(2), 3).unwrap();
        assert_eq!(drain(&mut rx), vec!["SET:2:3"]);

        tokio::time::sleep(Duration::from_millis(3_150)).await;
        assert_eq!(session.slot_snapshot(slot(2)).status, DisplayState::Expiring);

        session.handle_message("CALLBACK EXECUTED:2");
        let snapshot = session.slot_snapshot(slot(2));
        assert_eq!(snapshot.status, DisplayState::CallbackExecuted);
        assert!(snapshot.set_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_executed_before_local_expiry() {
        let (session, _rx) = open_session();
        session.set(slot(2), 3).unwrap();
        tokio::time::sleep(Duration::from_millis(1_050)).await;

        session.handle_message("CALLBACK EXECUTED:2");
        tokio::time::sleep(Duration::from_millis(500)).await;

        let snapshot = session.slot_snapshot(slot(2));
        assert_eq!(snapshot.status, DisplayState::CallbackExecuted);
        assert!(snapshot.set_enabled);
        assert!(!snapshot.counting);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_replaces_the_running_countdown() {
        let (session, mut rx) = open_session();
        session.set(slot(0), 10).unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        let first_generation = session.slot(slot(0)).generation();

        session.reset(slot(0), 5).unwrap();
        assert_eq!(drain(&mut rx), vec!["SET:0:10", "RESET:0:5"]);
        assert_eq!(session.slot_snapshot(slot(0)).remaining_ms, 5_000);
        assert_eq!(session.slot(slot(0)).generation(), first_generation + 1);

        // Only the new countdown ticks: one tick at +100ms, none from the old one.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(session.slot_snapshot(slot(0)).status, DisplayState::Remaining(4_900));
        assert!(!session.slot_snapshot(slot(0)).set_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_and_unknown_messages_are_inert() {
        let (session, _rx) = open_session();
        session.set(slot(1), 10).unwrap();
        let before = session.slot_snapshot(slot(1));

        for raw in ["CANCEL DONE:12", "CALLBACK EXECUTED:9", "CANCEL DONE", "SET DONE:1", "hello"] {
            session.handle_message(raw);
        }

        assert_eq!(session.slot_snapshot(slot(1)), before);
        assert_eq!(log_texts(&session).len(), 6);
        assert_eq!(log_texts(&session).last().map(String::as_str), Some("RESPONSE: hello"));
    }

    #[tokio::test]
    async fn sends_after_close_are_rejected_and_logged() {
        let (session, mut rx) = open_session();
        session.connection_closed();

        assert_eq!(session.cancel(slot(0)), Err(SessionError::Disconnected));
        assert_eq!(session.set(slot(0), 5), Err(SessionError::Disconnected));
        assert!(drain(&mut rx).is_empty());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.connection, ConnectionState::Closed);
        assert_eq!(snapshot.slots[0].status, DisplayState::NotActive);
        assert!(snapshot.slots[0].set_enabled);
        assert_eq!(
            log_texts(&session),
            vec!["CONNECTED", "DISCONNECTED", "NOT SENT: CANCEL:0:", "NOT SENT: SET:0:5"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn actions_before_open_are_rejected_without_local_change() {
        let (session, mut rx) = Session::new("ws://localhost:7654");
        assert_eq!(session.connection_state(), ConnectionState::Connecting);

        assert_eq!(session.set(slot(0), 3), Err(SessionError::Disconnected));
        assert_eq!(session.reset(slot(1), 3), Err(SessionError::Disconnected));
        assert_eq!(session.send("CANCEL:2:"), Err(SessionError::Disconnected));
        assert!(drain(&mut rx).is_empty());

        let snapshot = session.slot_snapshot(slot(0));
        assert_eq!(snapshot.status, DisplayState::NotActive);
        assert!(snapshot.set_enabled);
        assert!(!snapshot.counting);
        assert_eq!(
            log_texts(&session),
            vec!["NOT SENT: SET:0:3", "NOT SENT: RESET:1:3", "NOT SENT: CANCEL:2:"]
        );
    }

    #[tokio::test]
    async fn raw_send_on_open_connection_is_queued() {
        let (session, mut rx) = open_session();
        session.send("RESET:4:1").unwrap();
        assert_eq!(drain(&mut rx), vec!["RESET:4:1"]);
        assert_eq!(log_texts(&session), vec!["CONNECTED", "SENT: RESET:4:1"]);
    }

    #[test]
    fn lost_message_is_logged_as_not_sent() {
        let (session, _rx) = open_session();
        session.message_lost("SET:1:9");
        assert_eq!(log_texts(&session).last().map(String::as_str), Some("NOT SENT: SET:1:9"));
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_countdowns_and_closes_the_queue() {
        let (session, mut rx) = open_session();
        session.set(slot(0), 10).unwrap();
        session.set(slot(4), 10).unwrap();
        drain(&mut rx);

        session.teardown();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(session.snapshot().slots.iter().all(|s| !s.counting));
        assert_eq!(session.slot_snapshot(slot(0)).status, DisplayState::Active);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn subscribers_see_published_changes() {
        let (session, _rx) = Session::new("ws://localhost:7654");
        let mut updates = session.subscribe();

        session.connection_opened();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().connection, ConnectionState::Open);
    }
}
