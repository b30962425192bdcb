//! Session state machine
//!
//! menu -> racing <-> paused, racing -> finished, paused/finished -> menu.
//! Intents without a transition from the current mode are ignored.

use crate::core::config::GameConfig;
use crate::core::types::{HorseId, Mode, Tick};
use crate::race::constants::{is_bet_option, DEFAULT_BALANCE, DEFAULT_BET};
use crate::race::settlement::{settle, Settlement, Wager, Wallet};
use crate::race::speed::SpeedSource;
use crate::race::track::Track;
use crate::session::clock::{ClockHandle, RaceClock};
use crate::session::intent::{Intent, Outcome};
use crate::session::snapshot::Snapshot;
use crate::store::{persist_balance, restore_balance, KeyValueStore};

/// A single player's session, alive for the whole run
pub struct Session<S, K> {
    mode: Mode,
    selected_horse: Option<HorseId>,
    track: Track,
    winner: Option<HorseId>,
    wallet: Wallet,
    bet_amount: u64,
    winnings: Option<u64>,
    races_run: u64,
    clock: RaceClock,
    speeds: S,
    store: K,
    balance_key: String,
}

impl<S: SpeedSource, K: KeyValueStore> Session<S, K> {
    /// Open a session, restoring the balance from `store`
    pub fn new(speeds: S, store: K, config: &GameConfig) -> Self {
        let balance = restore_balance(&store, &config.balance_key);
        tracing::info!(balance, "Session opened");

        Self {
            mode: Mode::Menu,
            selected_horse: None,
            track: Track::new(),
            winner: None,
            wallet: Wallet::new(balance),
            bet_amount: DEFAULT_BET,
            winnings: None,
            races_run: 0,
            clock: RaceClock::new(config.tick_period()),
            speeds,
            store,
            balance_key: config.balance_key.clone(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected_horse(&self) -> Option<HorseId> {
        self.selected_horse
    }

    pub fn winner(&self) -> Option<HorseId> {
        self.winner
    }

    pub fn balance(&self) -> u64 {
        self.wallet.balance()
    }

    pub fn bet_amount(&self) -> u64 {
        self.bet_amount
    }

    pub fn winnings(&self) -> Option<u64> {
        self.winnings
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn clock(&self) -> &RaceClock {
        &self.clock
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            selected_horse: self.selected_horse,
            positions: *self.track.positions(),
            winner: self.winner,
            balance: self.wallet.balance(),
            bet_amount: self.bet_amount,
            winnings: self.winnings,
            tick: self.track.tick(),
            races_run: self.races_run,
        }
    }

    /// Apply an intent and return the resulting snapshot
    pub fn apply(&mut self, intent: Intent) -> Snapshot {
        let outcome = match intent {
            Intent::SelectHorse(index) => self.select_horse(index),
            Intent::SelectBet(amount) => self.select_bet(amount),
            Intent::Start => self.start(),
            Intent::Pause => self.pause(),
            Intent::Resume => self.resume(),
            Intent::Exit => self.exit(),
            Intent::ResetBalance => self.reset_balance(),
        };
        if outcome == Outcome::Ignored {
            tracing::debug!(?intent, mode = %self.mode, "Intent ignored");
        }
        self.snapshot()
    }

    pub fn select_horse(&mut self, index: usize) -> Outcome {
        if self.mode != Mode::Menu {
            return Outcome::Ignored;
        }
        match HorseId::new(index) {
            Some(horse) => {
                self.selected_horse = Some(horse);
                Outcome::Applied
            }
            None => Outcome::Ignored,
        }
    }

    pub fn select_bet(&mut self, amount: u64) -> Outcome {
        if self.mode != Mode::Menu || !is_bet_option(amount) || !self.wallet.can_afford(amount) {
            return Outcome::Ignored;
        }
        self.bet_amount = amount;
        Outcome::Applied
    }

    /// Take the stake and begin a fresh race
    pub fn start(&mut self) -> Outcome {
        if self.mode != Mode::Menu {
            return Outcome::Ignored;
        }
        let Some(horse) = self.selected_horse else {
            return Outcome::Ignored;
        };
        if !self.wallet.debit(self.bet_amount) {
            return Outcome::Ignored;
        }
        self.persist();

        self.track.reset();
        self.winner = None;
        self.winnings = None;
        self.races_run += 1;
        self.mode = Mode::Racing;
        let handle = self.clock.start();

        tracing::info!(
            race = self.races_run,
            %horse,
            bet = self.bet_amount,
            balance = self.wallet.balance(),
            generation = handle.generation(),
            "Race started"
        );
        Outcome::Applied
    }

    pub fn pause(&mut self) -> Outcome {
        if self.mode != Mode::Racing {
            return Outcome::Ignored;
        }
        self.clock.stop();
        self.mode = Mode::Paused;
        tracing::debug!(tick = self.track.tick(), "Race paused");
        Outcome::Applied
    }

    /// Continue the paused race over the retained positions. The stake is not
    /// taken again and the track is not reset.
    pub fn resume(&mut self) -> Outcome {
        if self.mode != Mode::Paused {
            return Outcome::Ignored;
        }
        self.mode = Mode::Racing;
        let handle = self.clock.start();
        tracing::debug!(tick = self.track.tick(), generation = handle.generation(), "Race resumed");
        Outcome::Applied
    }

    /// Back to the menu from the pause or result screen. Leaving a paused
    /// race forfeits the stake.
    pub fn exit(&mut self) -> Outcome {
        match self.mode {
            Mode::Paused => {
                self.clock.stop();
                tracing::info!(race = self.races_run, "Race abandoned");
            }
            Mode::Finished => {
                self.winner = None;
                self.winnings = None;
            }
            Mode::Menu | Mode::Racing => return Outcome::Ignored,
        }
        self.selected_horse = None;
        self.mode = Mode::Menu;
        Outcome::Applied
    }

    pub fn reset_balance(&mut self) -> Outcome {
        if self.mode != Mode::Menu {
            return Outcome::Ignored;
        }
        self.wallet.set(DEFAULT_BALANCE);
        self.persist();
        tracing::info!(balance = DEFAULT_BALANCE, "Balance reset");
        Outcome::Applied
    }

    /// Run one race tick. Returns the settlement when this tick produced a
    /// winner; outside `racing` nothing moves.
    pub fn tick(&mut self) -> Option<Settlement> {
        if self.mode != Mode::Racing {
            return None;
        }
        let winner = self.track.advance(&mut self.speeds)?;
        Some(self.finish(winner))
    }

    /// Tick only if `handle` is still the live clock handle. A stale timer
    /// firing after a pause or restart is dropped.
    pub fn tick_from(&mut self, handle: ClockHandle) -> Option<Settlement> {
        if !self.clock.is_current(handle) {
            tracing::debug!(generation = handle.generation(), "Stale clock tick dropped");
            return None;
        }
        self.tick()
    }

    /// Ticks run in the current race
    pub fn race_tick(&self) -> Tick {
        self.track.tick()
    }

    fn finish(&mut self, winner: HorseId) -> Settlement {
        self.clock.stop();

        let settlement = match self.selected_horse {
            Some(horse) => settle(
                &Wager {
                    horse,
                    amount: self.bet_amount,
                },
                winner,
            ),
            None => Settlement {
                winner,
                winnings: None,
            },
        };

        if let Some(winnings) = settlement.winnings {
            self.wallet.credit(winnings);
            self.persist();
        }

        self.winner = Some(winner);
        self.winnings = settlement.winnings;
        self.mode = Mode::Finished;

        tracing::info!(
            race = self.races_run,
            %winner,
            ticks = self.track.tick(),
            winnings = settlement.winnings.unwrap_or(0),
            balance = self.wallet.balance(),
            "Race finished"
        );
        settlement
    }

    /// Write the balance through to the store. A failed write is logged and
    /// the game carries on with the in-memory balance.
    fn persist(&mut self) {
        if let Err(e) = persist_balance(&mut self.store, &self.balance_key, self.wallet.balance()) {
            tracing::error!(error = %e, "Failed to persist balance");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::constants::HORSE_COUNT;
    use crate::race::speed::{RngSpeeds, ScriptedSpeeds};
    use crate::store::MemoryStore;

    type TestSession = Session<ScriptedSpeeds, MemoryStore>;

    fn session_with(speeds: ScriptedSpeeds) -> TestSession {
        Session::new(speeds, MemoryStore::new(), &GameConfig::default())
    }

    fn run_until_finished<S: SpeedSource, K: KeyValueStore>(session: &mut Session<S, K>) -> Settlement {
        loop {
            if let Some(settlement) = session.tick() {
                return settlement;
            }
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let session = session_with(ScriptedSpeeds::constant(1.0));
        let snap = session.snapshot();
        assert_eq!(snap.mode, Mode::Menu);
        assert_eq!(snap.balance, 100);
        assert_eq!(snap.bet_amount, 10);
        assert_eq!(snap.selected_horse, None);
        assert_eq!(snap.positions, [0.0; HORSE_COUNT]);
        assert!(!snap.can_start());
    }

    #[test]
    fn test_balance_restored_from_store() {
        let store = MemoryStore::with_entry("horseRaceBalance", "40");
        let session = Session::new(RngSpeeds::seeded(1), store, &GameConfig::default());
        assert_eq!(session.balance(), 40);
    }

    #[test]
    fn test_start_requires_selected_horse() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        assert_eq!(session.start(), Outcome::Ignored);
        assert_eq!(session.mode(), Mode::Menu);
        assert_eq!(session.balance(), 100);
        assert!(!session.clock().is_running());
    }

    #[test]
    fn test_start_deducts_bet_and_persists() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        session.select_horse(1);
        session.select_bet(50);
        assert_eq!(session.start(), Outcome::Applied);
        assert_eq!(session.mode(), Mode::Racing);
        assert_eq!(session.balance(), 50);
        assert!(session.clock().is_running());
        assert_eq!(session.store().get("horseRaceBalance").unwrap().as_deref(), Some("50"));
    }

    #[test]
    fn test_select_bet_rejected_above_balance() {
        let store = MemoryStore::with_entry("horseRaceBalance", "40");
        let mut session = Session::new(ScriptedSpeeds::constant(1.0), store, &GameConfig::default());
        assert_eq!(session.select_bet(50), Outcome::Ignored);
        assert_eq!(session.bet_amount(), 10);
        assert_eq!(session.select_bet(10), Outcome::Applied);
    }

    #[test]
    fn test_select_bet_rejects_unlisted_amount() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        assert_eq!(session.select_bet(20), Outcome::Ignored);
        assert_eq!(session.bet_amount(), 10);
    }

    #[test]
    fn test_select_horse_out_of_range_ignored() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        assert_eq!(session.select_horse(HORSE_COUNT), Outcome::Ignored);
        assert_eq!(session.selected_horse(), None);
    }

    #[test]
    fn test_tie_resolves_to_lowest_lane_and_loses() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        session.select_horse(2);
        session.select_bet(10);
        session.start();

        let settlement = run_until_finished(&mut session);

        assert_eq!(settlement.winner, HorseId::new(0).unwrap());
        assert_eq!(session.winner(), HorseId::new(0));
        assert_eq!(session.race_tick(), 100);
        assert_eq!(session.mode(), Mode::Finished);
        assert_eq!(session.winnings(), None);
        assert_eq!(session.balance(), 90);
        assert!(!session.clock().is_running());
    }

    #[test]
    fn test_backed_horse_wins_six_times_stake() {
        let mut session = session_with(ScriptedSpeeds::repeating([0.5, 0.5, 0.5, 1.9, 0.5, 0.5]));
        session.select_horse(3);
        session.start();

        let settlement = run_until_finished(&mut session);

        assert_eq!(settlement.winner, HorseId::new(3).unwrap());
        assert_eq!(session.winnings(), Some(60));
        assert_eq!(session.balance(), 150);
        assert_eq!(session.snapshot().player_won(), Some(true));
        assert_eq!(session.store().get("horseRaceBalance").unwrap().as_deref(), Some("150"));
    }

    #[test]
    fn test_pause_resume_keeps_positions_and_stake() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        session.select_horse(0);
        session.start();
        for _ in 0..10 {
            session.tick();
        }
        let before = session.snapshot();

        assert_eq!(session.pause(), Outcome::Applied);
        assert!(!session.clock().is_running());
        assert!(session.tick().is_none());
        assert_eq!(session.snapshot().positions, before.positions);

        assert_eq!(session.resume(), Outcome::Applied);
        let after = session.snapshot();
        assert_eq!(after.mode, Mode::Racing);
        assert_eq!(after.positions, before.positions);
        assert_eq!(after.balance, before.balance);
        assert_eq!(after.tick, 10);
        assert_eq!(after.races_run, 1);
    }

    #[test]
    fn test_pause_and_resume_only_from_their_modes() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        assert_eq!(session.pause(), Outcome::Ignored);
        assert_eq!(session.resume(), Outcome::Ignored);
        session.select_horse(0);
        session.start();
        assert_eq!(session.resume(), Outcome::Ignored);
        assert_eq!(session.exit(), Outcome::Ignored);
        assert_eq!(session.mode(), Mode::Racing);
    }

    #[test]
    fn test_resume_retires_paused_clock_handle() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        session.select_horse(0);
        session.start();
        let first = session.clock().handle().unwrap();
        session.pause();
        session.resume();
        let second = session.clock().handle().unwrap();

        assert_ne!(first, second);
        assert!(session.tick_from(first).is_none());
        assert_eq!(session.race_tick(), 0);
        session.tick_from(second);
        assert_eq!(session.race_tick(), 1);
    }

    #[test]
    fn test_exit_from_paused_clears_selection_and_forfeits() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        session.select_horse(4);
        session.start();
        session.tick();
        session.pause();

        assert_eq!(session.exit(), Outcome::Applied);
        assert_eq!(session.mode(), Mode::Menu);
        assert_eq!(session.selected_horse(), None);
        assert_eq!(session.balance(), 90);
        assert!(!session.clock().is_running());
    }

    #[test]
    fn test_exit_from_finished_clears_result_only() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        session.select_horse(0);
        session.select_bet(50);
        session.start();
        run_until_finished(&mut session);
        assert_eq!(session.winnings(), Some(300));
        assert_eq!(session.balance(), 350);

        assert_eq!(session.exit(), Outcome::Applied);
        let snap = session.snapshot();
        assert_eq!(snap.mode, Mode::Menu);
        assert_eq!(snap.selected_horse, None);
        assert_eq!(snap.winner, None);
        assert_eq!(snap.winnings, None);
        assert_eq!(snap.balance, 350);
        assert_eq!(snap.bet_amount, 50);
    }

    #[test]
    fn test_reset_balance_only_from_menu() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        session.select_horse(5);
        session.start();
        assert_eq!(session.reset_balance(), Outcome::Ignored);
        assert_eq!(session.balance(), 90);

        session.pause();
        session.exit();
        assert_eq!(session.reset_balance(), Outcome::Applied);
        assert_eq!(session.balance(), 100);
        assert_eq!(session.store().get("horseRaceBalance").unwrap().as_deref(), Some("100"));
    }

    #[test]
    fn test_start_refused_when_bet_exceeds_balance() {
        let store = MemoryStore::with_entry("horseRaceBalance", "60");
        let mut session = Session::new(ScriptedSpeeds::constant(1.0), store, &GameConfig::default());
        session.select_horse(2);
        session.select_bet(50);
        session.start();
        run_until_finished(&mut session);
        session.exit();

        // 10 left, bet still 50
        assert_eq!(session.balance(), 10);
        session.select_horse(2);
        assert!(!session.snapshot().can_start());
        assert_eq!(session.start(), Outcome::Ignored);
        assert_eq!(session.balance(), 10);
    }

    #[test]
    fn test_selection_locked_outside_menu() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        session.select_horse(0);
        session.start();
        assert_eq!(session.select_horse(3), Outcome::Ignored);
        assert_eq!(session.select_bet(50), Outcome::Ignored);
        assert_eq!(session.selected_horse(), HorseId::new(0));
    }

    #[test]
    fn test_apply_returns_snapshot() {
        let mut session = session_with(ScriptedSpeeds::constant(1.0));
        let snap = session.apply(Intent::SelectHorse(3));
        assert_eq!(snap.selected_horse, HorseId::new(3));
        let snap = session.apply(Intent::Start);
        assert_eq!(snap.mode, Mode::Racing);
        assert_eq!(snap.balance, 90);
    }
}
