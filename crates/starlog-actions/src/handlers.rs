//! Action executors.
//!
//! Each executor assumes its action already passed validation and policy.
//! Executors are pure: the same state and parameters always produce the
//! same [`Transition`], with no clock, filesystem, or other ambient input.

use starlog_types::{GameEvent, GameState, TICK_DONE};
use starlog_world::quests as catalog;
use starlog_world::sectors;

use crate::config::GameplayConfig;
use crate::error::ActionsError;
use crate::progression;
use crate::quests;
use crate::rng::Rng;

/// Achievement unlocked by the first tick of a game.
pub const FIRST_DAY_ACHIEVEMENT: &str = "First Day";

/// Output of an executor or of the rules pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The next state.
    pub state: GameState,
    /// Human-readable narration.
    pub trace_lines: Vec<String>,
    /// Domain events, in the order they happened.
    pub events: Vec<GameEvent>,
}

impl Transition {
    /// A transition that changes nothing.
    pub const fn unchanged(state: GameState) -> Self {
        Self {
            state,
            trace_lines: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// Fold an event into the state's quests, recording completions.
fn fold_quests(
    state: &mut GameState,
    event_type: &str,
    amount: i64,
    trace_lines: &mut Vec<String>,
    events: &mut Vec<GameEvent>,
) {
    let (folded, completed) = quests::fold_all(&state.quests, event_type, amount);
    state.quests = folded;
    for quest_id in completed {
        let title = catalog::get(&quest_id).map_or(quest_id.as_str(), |def| def.title);
        trace_lines.push(format!("QUEST COMPLETE: {title}"));
        events.push(GameEvent::QuestCompleted { quest_id });
    }
}

/// Advance the simulation one day.
///
/// The seed is `seed` when given, else the state's `last_seed`. One draw
/// from the generator decides whether a hull anomaly fires.
pub fn execute_tick(state: &GameState, seed: Option<i64>, config: &GameplayConfig) -> Transition {
    let seed = seed.unwrap_or(state.last_seed);
    let (_, roll) = Rng::seed(seed.unsigned_abs()).next_float01();
    let anomaly = roll < config.anomaly_chance;

    let day0 = state.day;
    let day1 = day0.saturating_add(1);
    let hull_delta = if anomaly {
        0_i64.saturating_sub(config.anomaly_hull_loss)
    } else {
        0
    };
    let power_delta = 0_i64.saturating_sub(config.power_loss_per_tick);
    let xp1 = state.player.xp.saturating_add(config.xp_per_tick);
    let level0 = state.player.level;
    let level1 = progression::level_from_xp(xp1, config.xp_level_base);

    let mut next = state.clone();
    next.day = day1;
    next.last_seed = seed;
    next.ship.hull = state.ship.hull.saturating_add(hull_delta);
    next.ship.power = state.ship.power.saturating_add(power_delta);
    next.player.xp = xp1;
    next.player.level = level1;

    let mut trace_lines = vec![format!("Day {day0} -> {day1}")];
    if anomaly {
        trace_lines.push(format!("- hull: {hull_delta} (anomaly)"));
    }
    trace_lines.push(format!("- power: {power_delta}"));
    trace_lines.push(format!("+XP {} (xp={xp1}, lvl={level1})", config.xp_per_tick));
    if level1 > level0 {
        trace_lines.push(format!("ACHIEVEMENT: Promotion: level {level1}"));
    }

    let mut events = vec![GameEvent::TickDone {
        amount: 1,
        day: day1,
    }];

    if day0 == 0 && day1 == 1 && !next.has_achievement(FIRST_DAY_ACHIEVEMENT) {
        next.achievements.push(FIRST_DAY_ACHIEVEMENT.to_owned());
        trace_lines.push(format!("ACHIEVEMENT: {FIRST_DAY_ACHIEVEMENT}"));
        events.push(GameEvent::AchievementUnlocked {
            name: FIRST_DAY_ACHIEVEMENT.to_owned(),
        });
    }

    fold_quests(&mut next, TICK_DONE, 1, &mut trace_lines, &mut events);

    Transition {
        state: next,
        trace_lines,
        events,
    }
}

/// Relocate the ship to `sector`.
///
/// # Errors
///
/// Returns [`ActionsError::World`] if `sector` is not registered.
pub fn execute_move(state: &GameState, sector: &str) -> Result<Transition, ActionsError> {
    let target = sectors::require(sector)?;
    let mut next = state.clone();
    next.ship.sector = target.name.to_owned();
    Ok(Transition {
        trace_lines: vec![format!(
            "SECTOR MOVE: {} -> {}",
            state.ship.sector, target.name
        )],
        events: vec![GameEvent::SectorMoved {
            sector: target.name.to_owned(),
        }],
        state: next,
    })
}

/// Claim a completed quest, granting its reward experience.
///
/// Quest status change and experience grant happen in one transition.
pub fn execute_claim(
    state: &GameState,
    quest_id: &str,
    config: &GameplayConfig,
) -> Result<Transition, ActionsError> {
    let def = catalog::require(quest_id)?;
    let (index, progress) = state
        .quests
        .iter()
        .enumerate()
        .find(|(_, q)| q.quest_id == quest_id)
        .ok_or_else(|| ActionsError::QuestMissing {
            quest_id: quest_id.to_owned(),
        })?;
    let claimed = quests::claim(progress)?;

    let mut next = state.clone();
    if let Some(slot) = next.quests.get_mut(index) {
        *slot = claimed;
    }
    let level0 = next.player.level;
    next.player.xp = next.player.xp.saturating_add(def.reward_xp);
    next.player.level = progression::level_from_xp(next.player.xp, config.xp_level_base);

    let mut trace_lines = vec![format!(
        "QUEST CLAIMED: {} (+{} XP, xp={})",
        def.title, def.reward_xp, next.player.xp
    )];
    if next.player.level > level0 {
        trace_lines.push(format!("ACHIEVEMENT: Promotion: level {}", next.player.level));
    }

    Ok(Transition {
        state: next,
        trace_lines,
        events: vec![GameEvent::QuestClaimed {
            quest_id: quest_id.to_owned(),
            reward_xp: def.reward_xp,
        }],
    })
}

/// Fold an externally observed event (diagnostics passed, advisor queried)
/// into quest progress. Nothing else about the state changes.
pub fn apply_signal(state: &GameState, event_type: &str, amount: i64) -> Transition {
    let mut next = state.clone();
    let mut trace_lines = Vec::new();
    let mut events = Vec::new();
    fold_quests(&mut next, event_type, amount, &mut trace_lines, &mut events);
    Transition {
        state: next,
        trace_lines,
        events,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use starlog_types::QuestStatus;

    use super::*;

    #[test]
    fn seed_123_tick_from_default_state() {
        let state = starlog_world::default_state();
        let t = execute_tick(&state, Some(123), &GameplayConfig::default());

        assert_eq!(t.state.day, 1);
        assert_eq!(t.state.ship.hull, 99);
        assert_eq!(t.state.ship.power, 99);
        assert_eq!(t.state.player.xp, 5);
        assert_eq!(t.state.player.level, 1);
        assert_eq!(t.state.last_seed, 123);
        assert!(t.events.contains(&GameEvent::TickDone { amount: 1, day: 1 }));
        assert_eq!(t.trace_lines[0], "Day 0 -> 1");
        assert_eq!(t.trace_lines[1], "- hull: -1 (anomaly)");
    }

    #[test]
    fn tick_is_deterministic() {
        let state = starlog_world::default_state();
        let cfg = GameplayConfig::default();
        assert_eq!(execute_tick(&state, Some(42), &cfg), execute_tick(&state, Some(42), &cfg));
    }

    #[test]
    fn seed_zero_draws_zero_and_always_hits_positive_chance() {
        let state = starlog_world::default_state();
        let t = execute_tick(&state, Some(0), &GameplayConfig::default());
        assert_eq!(t.state.ship.hull, 99);

        let calm = GameplayConfig {
            anomaly_chance: 0.0,
            ..GameplayConfig::default()
        };
        let t = execute_tick(&state, Some(0), &calm);
        assert_eq!(t.state.ship.hull, 100);
        assert!(!t.trace_lines.iter().any(|l| l.contains("anomaly")));
    }

    #[test]
    fn missing_seed_reuses_last_seed() {
        let mut state = starlog_world::default_state();
        state.last_seed = 123;
        let cfg = GameplayConfig::default();
        let implicit = execute_tick(&state, None, &cfg);
        let explicit = execute_tick(&state, Some(123), &cfg);
        assert_eq!(implicit, explicit);
    }

    #[test]
    fn first_day_achievement_unlocks_once() {
        let cfg = GameplayConfig::default();
        let t1 = execute_tick(&starlog_world::default_state(), Some(5), &cfg);
        assert_eq!(t1.state.achievements, vec![FIRST_DAY_ACHIEVEMENT.to_owned()]);
        assert!(t1.events.contains(&GameEvent::AchievementUnlocked {
            name: FIRST_DAY_ACHIEVEMENT.to_owned()
        }));

        let t2 = execute_tick(&t1.state, Some(5), &cfg);
        assert_eq!(t2.state.achievements.len(), 1);
    }

    #[test]
    fn level_up_is_narrated() {
        let mut state = starlog_world::default_state();
        state.player.xp = 8;
        let t = execute_tick(&state, Some(1), &GameplayConfig::default());
        assert_eq!(t.state.player.level, 2);
        assert!(
            t.trace_lines
                .contains(&"ACHIEVEMENT: Promotion: level 2".to_owned())
        );
    }

    #[test]
    fn third_tick_completes_tick_quest() {
        let cfg = GameplayConfig::default();
        let mut state = starlog_world::default_state();
        let mut completed_events = 0;
        for seed in 1..=4 {
            let t = execute_tick(&state, Some(seed), &cfg);
            completed_events += t
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::QuestCompleted { .. }))
                .count();
            state = t.state;
        }
        let quest = state.quest("q_ticks_3").unwrap();
        assert_eq!(quest.status, QuestStatus::Completed);
        assert_eq!(quest.progress, 3);
        assert_eq!(completed_events, 1);
    }

    #[test]
    fn move_changes_only_the_sector() {
        let state = starlog_world::default_state();
        let t = execute_move(&state, "AIRI").unwrap();
        assert_eq!(t.state.ship.sector, "AIRI");
        assert_eq!(t.state.ship.hull, state.ship.hull);
        assert_eq!(t.state.ship.power, state.ship.power);
        assert_eq!(t.state.day, state.day);
        assert_eq!(
            t.events,
            vec![GameEvent::SectorMoved {
                sector: "AIRI".to_owned()
            }]
        );
        assert_eq!(t.trace_lines, vec!["SECTOR MOVE: Mostek -> AIRI".to_owned()]);
    }

    #[test]
    fn move_to_unregistered_sector_is_an_error() {
        let err = execute_move(&starlog_world::default_state(), "Drydock").unwrap_err();
        assert_eq!(
            err,
            ActionsError::World {
                source: starlog_world::WorldError::SectorNotFound("Drydock".to_owned())
            }
        );
    }

    #[test]
    fn claim_grants_reward_and_levels() {
        let cfg = GameplayConfig::default();
        let done = apply_signal(&starlog_world::default_state(), "doctor_ok", 1);
        assert!(done.events.contains(&GameEvent::QuestCompleted {
            quest_id: "q_doctor_once".to_owned()
        }));

        let t = execute_claim(&done.state, "q_doctor_once", &cfg).unwrap();
        assert_eq!(t.state.player.xp, 10);
        assert_eq!(t.state.player.level, 2);
        assert_eq!(
            t.state.quest("q_doctor_once").unwrap().status,
            QuestStatus::Claimed
        );
        assert_eq!(
            t.events,
            vec![GameEvent::QuestClaimed {
                quest_id: "q_doctor_once".to_owned(),
                reward_xp: 10
            }]
        );

        assert!(matches!(
            execute_claim(&t.state, "q_doctor_once", &cfg),
            Err(ActionsError::QuestNotClaimable { .. })
        ));
    }

    #[test]
    fn claim_of_unknown_quest_fails() {
        let err = execute_claim(
            &starlog_world::default_state(),
            "q_legacy",
            &GameplayConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ActionsError::World { .. }));
    }

    #[test]
    fn signal_of_unrelated_type_changes_nothing() {
        let state = starlog_world::default_state();
        let t = apply_signal(&state, "ping", 1);
        assert_eq!(t.state, state);
        assert!(t.events.is_empty());
    }
}
