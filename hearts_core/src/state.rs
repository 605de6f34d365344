//! In-memory hearts state with a time-based cache guard.
//!
//! A single `HeartsState` lives for the duration of a user session. Every
//! field mirrors a server-authoritative value; the merge methods never
//! compute hearts locally, they only copy what the server returned. The
//! derived views (`total_hearts`, `is_low_hearts`, `can_play`,
//! `recovery_countdown`) are recomputed on read and never stored.

use crate::{ConsecutiveOutcome, HeartsSnapshot, LoseOutcome, RecoveryCountdown, RewardOutcome};
use chrono::{DateTime, Duration, Utc};

/// How long a successful fetch stays fresh before the guard allows another
pub const CACHE_TIMEOUT_MS: i64 = 30_000;

/// Mirrored hearts state for the current session.
///
/// Values are stored exactly as the server sends them, without clamping.
/// A fresh state assumes a full-hearted newbie until the first fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct HeartsState {
    pub current_hearts: i32,
    pub max_hearts: i32,
    pub bonus_hearts: i32,
    pub next_recovery_time: Option<DateTime<Utc>>,
    pub is_newbie: bool,
    pub newbie_protection_count: i32,
    pub consecutive_correct: i32,
    /// Stamped only by a successful authoritative fetch
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for HeartsState {
    fn default() -> Self {
        Self {
            current_hearts: 5,
            max_hearts: 5,
            bonus_hearts: 0,
            next_recovery_time: None,
            is_newbie: true,
            newbie_protection_count: 3,
            consecutive_correct: 0,
            last_update: None,
        }
    }
}

impl HeartsState {
    /// Decide whether a fetch should hit the network.
    ///
    /// Always fetch when forced or when no authoritative data has ever been
    /// loaded; otherwise only once the cached data is older than
    /// [`CACHE_TIMEOUT_MS`].
    pub fn should_fetch(&self, force: bool, now: DateTime<Utc>) -> bool {
        if force {
            return true;
        }

        match self.last_update {
            None => true,
            Some(last) => {
                now.signed_duration_since(last) >= Duration::milliseconds(CACHE_TIMEOUT_MS)
            }
        }
    }

    /// Overwrite all mirrored fields from an authoritative snapshot and
    /// stamp the cache
    pub fn apply_snapshot(&mut self, snapshot: &HeartsSnapshot, now: DateTime<Utc>) {
        self.current_hearts = snapshot.current_hearts;
        self.max_hearts = snapshot.max_hearts;
        self.bonus_hearts = snapshot.bonus_hearts;
        self.next_recovery_time = snapshot.next_recovery_time;
        self.is_newbie = snapshot.is_newbie;
        self.newbie_protection_count = snapshot.newbie_protection_count;
        self.consecutive_correct = snapshot.consecutive_correct;
        self.last_update = Some(now);
    }

    /// Merge a lose-heart outcome.
    ///
    /// Nothing changes on `success: false`. On success, hearts fields
    /// overwrite when present; `newbie_protection_remaining` updates only
    /// when the server explicitly included it.
    pub fn apply_lose(&mut self, outcome: &LoseOutcome) {
        if !outcome.success {
            return;
        }

        if let Some(current) = outcome.current_hearts {
            self.current_hearts = current;
        }
        if let Some(bonus) = outcome.bonus_hearts {
            self.bonus_hearts = bonus;
        }
        if let Some(remaining) = outcome.newbie_protection_remaining {
            self.newbie_protection_count = remaining;
        }
    }

    /// Merge a reward outcome. Nothing changes on `success: false`.
    pub fn apply_reward(&mut self, outcome: &RewardOutcome) {
        if !outcome.success {
            return;
        }

        if let Some(current) = outcome.current_hearts {
            self.current_hearts = current;
        }
        if let Some(bonus) = outcome.bonus_hearts {
            self.bonus_hearts = bonus;
        }
        if let Some(consecutive) = outcome.consecutive_correct {
            self.consecutive_correct = consecutive;
        }
    }

    /// Merge a consecutive-correct outcome. Nothing changes on
    /// `success: false`.
    pub fn apply_consecutive(&mut self, outcome: &ConsecutiveOutcome) {
        if !outcome.success {
            return;
        }

        if let Some(consecutive) = outcome.consecutive_correct {
            self.consecutive_correct = consecutive;
        }
    }

    /// Return to the pre-fetch defaults (logout/session end)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// Natural hearts plus the bonus pool
    pub fn total_hearts(&self) -> i32 {
        self.current_hearts + self.bonus_hearts
    }

    /// Whether the UI should warn the user they are running low
    pub fn is_low_hearts(&self) -> bool {
        self.total_hearts() <= 2
    }

    /// Whether the user has any hearts left to spend
    pub fn can_play(&self) -> bool {
        self.total_hearts() > 0
    }

    /// Time remaining until the next natural recovery tick.
    ///
    /// `None` when no recovery is scheduled, hearts are already full, or
    /// the scheduled time has passed. Computed purely from the last-fetched
    /// `next_recovery_time` and the given clock, so it can drift from
    /// server truth between polls.
    pub fn recovery_countdown(&self, now: DateTime<Utc>) -> Option<RecoveryCountdown> {
        let recovery = self.next_recovery_time?;
        if self.current_hearts >= self.max_hearts {
            return None;
        }

        let diff = recovery.signed_duration_since(now);
        if diff <= Duration::zero() {
            return None;
        }

        Some(RecoveryCountdown {
            hours: diff.num_hours(),
            minutes: diff.num_minutes() % 60,
            seconds: diff.num_seconds() % 60,
            total: diff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> HeartsSnapshot {
        HeartsSnapshot {
            current_hearts: 3,
            max_hearts: 5,
            bonus_hearts: 2,
            next_recovery_time: None,
            is_newbie: false,
            newbie_protection_count: 0,
            consecutive_correct: 4,
        }
    }

    #[test]
    fn test_default_state_is_full_hearted_newbie() {
        let state = HeartsState::default();

        assert_eq!(state.current_hearts, 5);
        assert_eq!(state.max_hearts, 5);
        assert_eq!(state.bonus_hearts, 0);
        assert!(state.is_newbie);
        assert_eq!(state.newbie_protection_count, 3);
        assert_eq!(state.consecutive_correct, 0);
        assert!(state.last_update.is_none());
    }

    #[test]
    fn test_should_fetch_when_never_fetched() {
        let state = HeartsState::default();
        assert!(state.should_fetch(false, Utc::now()));
    }

    #[test]
    fn test_should_not_fetch_while_fresh() {
        let now = Utc::now();
        let mut state = HeartsState::default();
        state.apply_snapshot(&snapshot(), now);

        assert!(!state.should_fetch(false, now + Duration::milliseconds(29_999)));
    }

    #[test]
    fn test_should_fetch_once_stale() {
        let now = Utc::now();
        let mut state = HeartsState::default();
        state.apply_snapshot(&snapshot(), now);

        assert!(state.should_fetch(false, now + Duration::milliseconds(CACHE_TIMEOUT_MS)));
    }

    #[test]
    fn test_force_overrides_freshness() {
        let now = Utc::now();
        let mut state = HeartsState::default();
        state.apply_snapshot(&snapshot(), now);

        assert!(state.should_fetch(true, now));
    }

    #[test]
    fn test_apply_snapshot_overwrites_everything() {
        let now = Utc::now();
        let mut state = HeartsState::default();
        state.apply_snapshot(&snapshot(), now);

        assert_eq!(state.current_hearts, 3);
        assert_eq!(state.bonus_hearts, 2);
        assert!(!state.is_newbie);
        assert_eq!(state.consecutive_correct, 4);
        assert_eq!(state.last_update, Some(now));
    }

    #[test]
    fn test_snapshot_values_stored_without_clamping() {
        // The server is authoritative even if a value looks out of range
        let mut odd = snapshot();
        odd.current_hearts = 9;
        odd.max_hearts = 5;

        let mut state = HeartsState::default();
        state.apply_snapshot(&odd, Utc::now());

        assert_eq!(state.current_hearts, 9);
    }

    #[test]
    fn test_apply_lose_merges_present_fields_only() {
        let mut state = HeartsState::default();
        state.apply_lose(&LoseOutcome {
            success: true,
            hearts_lost: Some(1),
            remaining_hearts: Some(4),
            current_hearts: Some(3),
            bonus_hearts: Some(1),
            newbie_protection_remaining: None,
            message: None,
        });

        assert_eq!(state.current_hearts, 3);
        assert_eq!(state.bonus_hearts, 1);
        // Field absent -> untouched
        assert_eq!(state.newbie_protection_count, 3);
    }

    #[test]
    fn test_apply_lose_updates_protection_when_present() {
        let mut state = HeartsState::default();
        state.apply_lose(&LoseOutcome {
            success: true,
            hearts_lost: Some(0),
            remaining_hearts: Some(5),
            current_hearts: None,
            bonus_hearts: None,
            newbie_protection_remaining: Some(2),
            message: Some("protected".into()),
        });

        assert_eq!(state.newbie_protection_count, 2);
        assert_eq!(state.current_hearts, 5);
    }

    #[test]
    fn test_rejected_outcomes_leave_state_untouched() {
        let mut state = HeartsState::default();
        let before = state.clone();

        state.apply_lose(&LoseOutcome {
            success: false,
            hearts_lost: None,
            remaining_hearts: None,
            current_hearts: Some(0),
            bonus_hearts: Some(0),
            newbie_protection_remaining: Some(0),
            message: Some("No hearts left".into()),
        });
        state.apply_reward(&RewardOutcome {
            success: false,
            hearts_rewarded: None,
            remaining_hearts: None,
            current_hearts: Some(0),
            bonus_hearts: Some(0),
            consecutive_correct: Some(0),
            message: None,
        });
        state.apply_consecutive(&ConsecutiveOutcome {
            success: false,
            consecutive_correct: Some(99),
        });

        assert_eq!(state, before);
    }

    #[test]
    fn test_apply_reward_overwrites_reward_fields() {
        let mut state = HeartsState::default();
        state.apply_reward(&RewardOutcome {
            success: true,
            hearts_rewarded: Some(1),
            remaining_hearts: Some(6),
            current_hearts: Some(5),
            bonus_hearts: Some(1),
            consecutive_correct: Some(10),
            message: Some("streak!".into()),
        });

        assert_eq!(state.current_hearts, 5);
        assert_eq!(state.bonus_hearts, 1);
        assert_eq!(state.consecutive_correct, 10);
    }

    #[test]
    fn test_total_hearts_is_derived() {
        let mut state = HeartsState::default();
        assert_eq!(state.total_hearts(), 5);

        state.apply_reward(&RewardOutcome {
            success: true,
            hearts_rewarded: Some(1),
            remaining_hearts: None,
            current_hearts: Some(5),
            bonus_hearts: Some(3),
            consecutive_correct: Some(20),
            message: None,
        });
        assert_eq!(state.total_hearts(), 8);
    }

    #[test]
    fn test_low_hearts_and_can_play_thresholds() {
        let mut state = HeartsState {
            current_hearts: 2,
            bonus_hearts: 0,
            ..HeartsState::default()
        };
        assert!(state.is_low_hearts());
        assert!(state.can_play());

        state.current_hearts = 0;
        assert!(!state.can_play());

        // Bonus hearts count toward both views
        state.bonus_hearts = 3;
        assert!(state.can_play());
        assert!(!state.is_low_hearts());
    }

    #[test]
    fn test_recovery_countdown_breakdown() {
        let now = Utc::now();
        let state = HeartsState {
            current_hearts: 4,
            next_recovery_time: Some(now + Duration::seconds(3_725)),
            ..HeartsState::default()
        };

        let countdown = state.recovery_countdown(now).unwrap();
        assert_eq!(countdown.hours, 1);
        assert_eq!(countdown.minutes, 2);
        assert_eq!(countdown.seconds, 5);
        assert_eq!(countdown.total, Duration::seconds(3_725));
    }

    #[test]
    fn test_no_countdown_when_full_or_elapsed() {
        let now = Utc::now();

        let full = HeartsState {
            next_recovery_time: Some(now + Duration::minutes(10)),
            ..HeartsState::default()
        };
        assert!(full.recovery_countdown(now).is_none());

        let elapsed = HeartsState {
            current_hearts: 2,
            next_recovery_time: Some(now - Duration::seconds(1)),
            ..HeartsState::default()
        };
        assert!(elapsed.recovery_countdown(now).is_none());

        let unscheduled = HeartsState {
            current_hearts: 2,
            next_recovery_time: None,
            ..HeartsState::default()
        };
        assert!(unscheduled.recovery_countdown(now).is_none());
    }

    #[test]
    fn test_reset_returns_to_defaults() {
        let mut state = HeartsState::default();
        state.apply_snapshot(&snapshot(), Utc::now());

        state.reset();

        assert_eq!(state, HeartsState::default());
    }
}
