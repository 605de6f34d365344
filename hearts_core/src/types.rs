//! Wire types for the hearts API.
//!
//! This module defines the request and response bodies exchanged with the
//! backend:
//! - Difficulty, action and reward enums
//! - The lose-heart action with its two calling shapes
//! - Authoritative snapshots and per-mutation outcomes

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Enums
// ============================================================================

/// Exercise difficulty as reported by the answering UI
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Server-side accounting path for a heart loss
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoseActionType {
    WrongAnswer,
    ViewOriginal,
}

/// Reason a heart (or streak credit) is being awarded
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    #[default]
    CorrectAnswer,
    PerfectCourse,
    Achievement,
}

// ============================================================================
// Lose Action
// ============================================================================

/// The two calling shapes of the lose-heart operation.
///
/// Both variants go through the same endpoint with identical network
/// semantics; they differ only in the accounting path the server applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoseAction {
    /// The user answered incorrectly at the given difficulty
    WrongAnswer {
        difficulty: Difficulty,
        practice_mode: bool,
    },
    /// The user revealed the reference/original text. Difficulty is not
    /// meaningful for this path and is normalized to `Normal` on the wire.
    ViewOriginal,
}

impl LoseAction {
    /// Build the wire request for this action
    pub fn to_request(self) -> LoseRequest {
        match self {
            LoseAction::WrongAnswer {
                difficulty,
                practice_mode,
            } => LoseRequest {
                difficulty,
                is_practice_mode: practice_mode,
                action_type: LoseActionType::WrongAnswer,
            },
            LoseAction::ViewOriginal => LoseRequest {
                difficulty: Difficulty::Normal,
                is_practice_mode: false,
                action_type: LoseActionType::ViewOriginal,
            },
        }
    }
}

// ============================================================================
// Request Bodies
// ============================================================================

/// Body of `POST /user/hearts/lose`
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoseRequest {
    pub difficulty: Difficulty,
    pub is_practice_mode: bool,
    pub action_type: LoseActionType,
}

/// Body of `POST /user/hearts/reward`
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardRequest {
    #[serde(rename = "type")]
    pub reward_type: RewardType,
}

/// Body of `POST /hearts/consecutive`
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsecutiveRequest {
    pub increment: bool,
}

// ============================================================================
// Response Bodies
// ============================================================================

/// Authoritative hearts snapshot returned by `GET /user/hearts`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeartsSnapshot {
    pub current_hearts: i32,
    pub max_hearts: i32,
    #[serde(default)]
    pub bonus_hearts: i32,
    #[serde(default, deserialize_with = "deserialize_recovery_time")]
    pub next_recovery_time: Option<DateTime<Utc>>,
    pub is_newbie: bool,
    pub newbie_protection_count: i32,
    pub consecutive_correct: i32,
}

/// Outcome of a lose-heart request.
///
/// Only `current_hearts`, `bonus_hearts`, and `newbie_protection_remaining`
/// are merged into local state (and only when present). The remaining fields
/// exist so callers can inspect what the server actually did, including
/// domain-level rejections carried in `message`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoseOutcome {
    pub success: bool,
    #[serde(default)]
    pub hearts_lost: Option<i32>,
    #[serde(default)]
    pub remaining_hearts: Option<i32>,
    #[serde(default)]
    pub current_hearts: Option<i32>,
    #[serde(default)]
    pub bonus_hearts: Option<i32>,
    #[serde(default)]
    pub newbie_protection_remaining: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of a reward-heart request.
///
/// On success the server always includes `current_hearts`, `bonus_hearts`,
/// and `consecutive_correct`; they are optional here only so rejection
/// bodies (`success: false`) still decode.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardOutcome {
    pub success: bool,
    #[serde(default)]
    pub hearts_rewarded: Option<i32>,
    #[serde(default)]
    pub remaining_hearts: Option<i32>,
    #[serde(default)]
    pub current_hearts: Option<i32>,
    #[serde(default)]
    pub bonus_hearts: Option<i32>,
    #[serde(default)]
    pub consecutive_correct: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of a consecutive-correct update
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsecutiveOutcome {
    pub success: bool,
    #[serde(default)]
    pub consecutive_correct: Option<i32>,
}

/// Accept the backend's recovery timestamps.
///
/// The server emits naive UTC (`datetime.isoformat()`, no offset); RFC 3339
/// with an explicit offset is accepted as well.
fn deserialize_recovery_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) => parse_utc_timestamp(&text).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid recovery timestamp: {}", text))
        }),
    }
}

fn parse_utc_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.with_timezone(&Utc));
    }
    // Offset-less form, taken as UTC
    text.parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}

/// Time remaining until the next natural heart recovery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryCountdown {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total: chrono::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_original_normalizes_difficulty() {
        let request = LoseAction::ViewOriginal.to_request();

        assert_eq!(request.difficulty, Difficulty::Normal);
        assert_eq!(request.action_type, LoseActionType::ViewOriginal);
        assert!(!request.is_practice_mode);
    }

    #[test]
    fn test_wrong_answer_forwards_arguments() {
        let request = LoseAction::WrongAnswer {
            difficulty: Difficulty::Hard,
            practice_mode: true,
        }
        .to_request();

        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["difficulty"], "hard");
        assert_eq!(json["is_practice_mode"], true);
        assert_eq!(json["action_type"], "wrong_answer");
    }

    #[test]
    fn test_reward_request_uses_type_key() {
        let json = serde_json::to_value(RewardRequest {
            reward_type: RewardType::default(),
        })
        .unwrap();

        assert_eq!(json["type"], "correct_answer");
    }

    #[test]
    fn test_snapshot_defaults_optional_fields() {
        // bonus_hearts and next_recovery_time may be omitted by the server
        let snapshot: HeartsSnapshot = serde_json::from_str(
            r#"{
                "current_hearts": 4,
                "max_hearts": 5,
                "next_recovery_time": null,
                "is_newbie": false,
                "newbie_protection_count": 0,
                "consecutive_correct": 7
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.bonus_hearts, 0);
        assert!(snapshot.next_recovery_time.is_none());
    }

    #[test]
    fn test_snapshot_decodes_offsetless_recovery_time() {
        // The backend sends naive UTC timestamps with no offset
        let snapshot: HeartsSnapshot = serde_json::from_str(
            r#"{
                "current_hearts": 4,
                "max_hearts": 5,
                "bonus_hearts": 0,
                "next_recovery_time": "2026-08-23T12:34:56.123456",
                "is_newbie": false,
                "newbie_protection_count": 0,
                "consecutive_correct": 7
            }"#,
        )
        .unwrap();

        let expected = chrono::NaiveDate::from_ymd_opt(2026, 8, 23)
            .unwrap()
            .and_hms_micro_opt(12, 34, 56, 123_456)
            .unwrap()
            .and_utc();
        assert_eq!(snapshot.next_recovery_time, Some(expected));
    }

    #[test]
    fn test_snapshot_accepts_rfc3339_recovery_time() {
        let snapshot: HeartsSnapshot = serde_json::from_str(
            r#"{
                "current_hearts": 4,
                "max_hearts": 5,
                "next_recovery_time": "2026-08-23T12:34:56Z",
                "is_newbie": false,
                "newbie_protection_count": 0,
                "consecutive_correct": 0
            }"#,
        )
        .unwrap();

        assert!(snapshot.next_recovery_time.is_some());
    }

    #[test]
    fn test_snapshot_rejects_garbage_recovery_time() {
        let result = serde_json::from_str::<HeartsSnapshot>(
            r#"{
                "current_hearts": 4,
                "max_hearts": 5,
                "next_recovery_time": "soon",
                "is_newbie": false,
                "newbie_protection_count": 0,
                "consecutive_correct": 0
            }"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_rejection_outcome_decodes_without_heart_fields() {
        let outcome: LoseOutcome =
            serde_json::from_str(r#"{"success": false, "message": "No hearts left"}"#).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("No hearts left"));
        assert!(outcome.current_hearts.is_none());
    }
}
