//! Async race driver
//!
//! Owns the session and serialises every mutation through one `select!`
//! loop: intents arrive on a channel, ticks come from a single interval
//! bound to the session's live clock handle, and a snapshot is published
//! after each step.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::core::error::{DerbyError, Result};
use crate::race::speed::SpeedSource;
use crate::session::{ClockHandle, Intent, Session, Snapshot};
use crate::store::KeyValueStore;

const INTENT_CHANNEL_CAPACITY: usize = 64;

/// Presentation-side handle: forward intents, watch snapshots
#[derive(Clone)]
pub struct DriverHandle {
    intents: mpsc::Sender<Intent>,
    snapshots: watch::Receiver<Snapshot>,
}

impl DriverHandle {
    pub async fn send(&self, intent: Intent) -> Result<()> {
        self.intents
            .send(intent)
            .await
            .map_err(|_| DerbyError::DriverClosed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

pub struct RaceDriver<S, K> {
    session: Session<S, K>,
    intents: mpsc::Receiver<Intent>,
    snapshots: watch::Sender<Snapshot>,
}

impl<S, K> RaceDriver<S, K>
where
    S: SpeedSource + Send + 'static,
    K: KeyValueStore + 'static,
{
    pub fn new(session: Session<S, K>) -> (Self, DriverHandle) {
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        let driver = Self {
            session,
            intents: intent_rx,
            snapshots: snapshot_tx,
        };
        let handle = DriverHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
        };
        (driver, handle)
    }

    /// Spawn the driver on the current runtime. The task ends, returning
    /// the session, once every `DriverHandle` is dropped.
    pub fn spawn(session: Session<S, K>) -> (DriverHandle, JoinHandle<Session<S, K>>) {
        let (driver, handle) = Self::new(session);
        (handle, tokio::spawn(driver.run()))
    }

    pub async fn run(self) -> Session<S, K> {
        let Self {
            mut session,
            mut intents,
            snapshots,
        } = self;
        let mut timer: Option<(ClockHandle, Interval)> = None;

        loop {
            sync_timer(&session, &mut timer);

            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => {
                        let snapshot = session.apply(intent);
                        snapshots.send_replace(snapshot);
                    }
                    None => break,
                },
                handle = next_tick(&mut timer) => {
                    session.tick_from(handle);
                    snapshots.send_replace(session.snapshot());
                }
            }
        }

        tracing::debug!("Intent channel closed, race driver stopping");
        session
    }
}

/// Keep at most one interval alive, matching the session's live handle
fn sync_timer<S, K>(session: &Session<S, K>, timer: &mut Option<(ClockHandle, Interval)>)
where
    S: SpeedSource,
    K: KeyValueStore,
{
    let live = session.clock().handle();
    if timer.as_ref().map(|(handle, _)| *handle) == live {
        return;
    }

    *timer = live.map(|handle| {
        let period = session.clock().period();
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        (handle, interval)
    });
}

async fn next_tick(timer: &mut Option<(ClockHandle, Interval)>) -> ClockHandle {
    match timer {
        Some((handle, interval)) => {
            interval.tick().await;
            *handle
        }
        None => std::future::pending().await,
    }
}
