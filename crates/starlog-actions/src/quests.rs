//! Quest progress tracking.
//!
//! Folds domain events into progress against the static catalog. The
//! tracker only ever touches quest entries; granting the reward experience
//! on claim is the caller's job.

use starlog_types::{QuestProgress, QuestStatus};
use starlog_world::QuestDef;
use starlog_world::quests as catalog;

use crate::error::ActionsError;

/// Apply one event to one quest.
///
/// No-op unless the quest is active and `event_type` is its target. Progress
/// is capped at the target value and the quest completes on reaching it.
/// Negative amounts count as zero.
pub fn fold_event(
    progress: &QuestProgress,
    def: &QuestDef,
    event_type: &str,
    amount: i64,
) -> QuestProgress {
    if progress.status != QuestStatus::Active || event_type != def.target_event_type {
        return progress.clone();
    }
    let value = progress
        .progress
        .saturating_add(amount.max(0))
        .min(def.target_value);
    let status = if value >= def.target_value {
        QuestStatus::Completed
    } else {
        QuestStatus::Active
    };
    QuestProgress {
        quest_id: progress.quest_id.clone(),
        status,
        progress: value,
    }
}

/// Apply one event to every quest in `quests`.
///
/// Returns the new list and the ids of quests that completed on this event.
/// Entries whose id is not in the catalog are passed through unchanged.
pub fn fold_all(
    quests: &[QuestProgress],
    event_type: &str,
    amount: i64,
) -> (Vec<QuestProgress>, Vec<String>) {
    let mut completed = Vec::new();
    let folded = quests
        .iter()
        .map(|q| {
            let Some(def) = catalog::get(&q.quest_id) else {
                return q.clone();
            };
            let next = fold_event(q, def, event_type, amount);
            if q.status != QuestStatus::Completed && next.status == QuestStatus::Completed {
                completed.push(next.quest_id.clone());
            }
            next
        })
        .collect();
    (folded, completed)
}

/// Move a completed quest to claimed.
pub fn claim(progress: &QuestProgress) -> Result<QuestProgress, ActionsError> {
    if progress.status != QuestStatus::Completed {
        return Err(ActionsError::QuestNotClaimable {
            quest_id: progress.quest_id.clone(),
            status: progress.status,
        });
    }
    Ok(QuestProgress {
        status: QuestStatus::Claimed,
        ..progress.clone()
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    fn ticks_def() -> &'static QuestDef {
        catalog::get("q_ticks_3").unwrap()
    }

    #[test]
    fn matching_event_advances_progress() {
        let q = fold_event(&QuestProgress::fresh("q_ticks_3"), ticks_def(), "tick_done", 1);
        assert_eq!(q.progress, 1);
        assert_eq!(q.status, QuestStatus::Active);
    }

    #[test]
    fn other_event_types_are_ignored() {
        let start = QuestProgress::fresh("q_ticks_3");
        let q = fold_event(&start, ticks_def(), "doctor_ok", 1);
        assert_eq!(q, start);
    }

    #[test]
    fn progress_caps_at_target_and_completes() {
        let mut q = QuestProgress::fresh("q_ticks_3");
        for _ in 0..3 {
            q = fold_event(&q, ticks_def(), "tick_done", 1);
        }
        assert_eq!(q.status, QuestStatus::Completed);
        assert_eq!(q.progress, 3);

        let after = fold_event(&q, ticks_def(), "tick_done", 1);
        assert_eq!(after, q);

        let burst = fold_event(&QuestProgress::fresh("q_ticks_3"), ticks_def(), "tick_done", 10);
        assert_eq!(burst.progress, 3);
    }

    #[test]
    fn negative_amount_does_not_regress() {
        let q = QuestProgress {
            quest_id: "q_ticks_3".to_owned(),
            status: QuestStatus::Active,
            progress: 2,
        };
        assert_eq!(fold_event(&q, ticks_def(), "tick_done", -5).progress, 2);
    }

    #[test]
    fn fold_all_reports_new_completions_once() {
        let quests = starlog_world::normalize_quests(&[]);
        let (quests, done) = fold_all(&quests, "doctor_ok", 1);
        assert_eq!(done, vec!["q_doctor_once".to_owned()]);

        let (_, again) = fold_all(&quests, "doctor_ok", 1);
        assert!(again.is_empty());
    }

    #[test]
    fn claim_only_from_completed() {
        let active = QuestProgress::fresh("q_ticks_3");
        assert!(matches!(
            claim(&active),
            Err(ActionsError::QuestNotClaimable { status: QuestStatus::Active, .. })
        ));

        let done = QuestProgress {
            status: QuestStatus::Completed,
            progress: 3,
            ..active
        };
        let claimed = claim(&done).unwrap();
        assert_eq!(claimed.status, QuestStatus::Claimed);
        assert!(claim(&claimed).is_err());
    }
}
