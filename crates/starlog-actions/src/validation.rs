//! Structural validation of states and action parameters.
//!
//! Both checks collect every violation instead of stopping at the first,
//! so a caller can report a broken save file in one pass.
//!
//! Raw requests (an action name plus a JSON parameter map) are turned into a
//! typed [`Action`] by [`parse_action`]; typed actions are then checked by
//! [`validate_params`] regardless of where they came from.

use std::collections::BTreeSet;

use starlog_types::{
    Action, ActionError, ActionKind, GameState, ParamError, Parameters, SCHEMA_VERSION, STAT_MAX,
    STAT_MIN, StructuralError,
};
use starlog_world::MAX_SECTOR_NAME_CHARS;
use starlog_world::quests as catalog;

use crate::config::GameplayConfig;
use crate::progression;

/// Letters outside ASCII that sector names may use.
const EXTRA_SECTOR_LETTERS: &str = "ĄąĆćĘęŁłŃńÓóŚśŹźŻż";

fn is_sector_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.') || EXTRA_SECTOR_LETTERS.contains(c)
}

/// Check a sector name against the sector grammar.
///
/// The name is trimmed first; it must then be non-empty, at most
/// [`MAX_SECTOR_NAME_CHARS`] characters, and drawn from ASCII letters,
/// digits, space, `_`, `-`, `.`, and the Polish diacritic letters. Returns
/// one message per violated rule.
pub fn sector_name_problems(name: &str) -> Vec<&'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return vec!["sector cannot be empty"];
    }
    let mut problems = Vec::new();
    if trimmed.chars().count() > MAX_SECTOR_NAME_CHARS {
        problems.push("sector too long (max 40)");
    }
    if !trimmed.chars().all(is_sector_char) {
        problems.push("sector has forbidden characters");
    }
    problems
}

/// Check every invariant of `state`.
///
/// The level is checked against the curve scaled by `config.xp_level_base`.
pub fn validate_state(state: &GameState, config: &GameplayConfig) -> Vec<StructuralError> {
    let mut errors = Vec::new();

    if state.schema_version != SCHEMA_VERSION {
        errors.push(StructuralError::InvalidSchemaVersion {
            found: state.schema_version,
            expected: SCHEMA_VERSION,
        });
    }
    if state.day < 0 {
        errors.push(StructuralError::InvalidDay { day: state.day });
    }
    if !(STAT_MIN..=STAT_MAX).contains(&state.ship.hull) {
        errors.push(StructuralError::InvalidHull {
            hull: state.ship.hull,
        });
    }
    if !(STAT_MIN..=STAT_MAX).contains(&state.ship.power) {
        errors.push(StructuralError::InvalidPower {
            power: state.ship.power,
        });
    }
    if !sector_name_problems(&state.ship.sector).is_empty() {
        errors.push(StructuralError::InvalidSector {
            sector: state.ship.sector.clone(),
        });
    }
    if state.player.xp < 0 {
        errors.push(StructuralError::InvalidXp {
            xp: state.player.xp,
        });
    }
    let expected = progression::level_from_xp(state.player.xp.max(0), config.xp_level_base);
    if state.player.level < 1 || state.player.level != expected {
        errors.push(StructuralError::InvalidLevel {
            level: state.player.level,
            expected,
        });
    }
    if state.last_seed < 0 {
        errors.push(StructuralError::InvalidLastSeed {
            last_seed: state.last_seed,
        });
    }
    for quest in &state.quests {
        if !catalog::contains(&quest.quest_id) {
            errors.push(StructuralError::UnknownQuest {
                quest_id: quest.quest_id.clone(),
            });
        }
        if quest.progress < 0 {
            errors.push(StructuralError::InvalidQuestProgress {
                quest_id: quest.quest_id.clone(),
                progress: quest.progress,
            });
        }
    }
    let mut seen = BTreeSet::new();
    for name in &state.achievements {
        if !seen.insert(name.as_str()) {
            errors.push(StructuralError::DuplicateAchievement { name: name.clone() });
        }
    }

    errors
}

/// Check the parameters of a typed action.
pub fn validate_params(action: &Action) -> Vec<ParamError> {
    match action {
        Action::Tick { seed: Some(seed) } if *seed < 0 => vec![ParamError::InvalidSeed {
            detail: format!("seed must be >= 0, got {seed}"),
        }],
        Action::Tick { .. } => Vec::new(),
        Action::Move { sector } => sector_name_problems(sector)
            .into_iter()
            .map(|detail| ParamError::InvalidSector {
                detail: detail.to_owned(),
            })
            .collect(),
        Action::Claim { quest_id } if quest_id.trim().is_empty() => {
            vec![ParamError::InvalidQuestId {
                detail: "quest_id cannot be empty".to_owned(),
            }]
        }
        Action::Claim { .. } => Vec::new(),
    }
}

/// Turn a raw request into a typed [`Action`].
///
/// Unknown names yield [`ActionError::UnknownAction`]. Parameters of the
/// wrong JSON type yield the matching [`ParamError`]. Range checks are left
/// to [`validate_params`].
pub fn parse_action(name: &str, parameters: &Parameters) -> Result<Action, Vec<ActionError>> {
    let Some(kind) = ActionKind::from_name(name) else {
        return Err(vec![ActionError::UnknownAction {
            action: name.to_owned(),
        }]);
    };

    match kind {
        ActionKind::Tick => match parameters.get("seed") {
            None | Some(serde_json::Value::Null) => Ok(Action::Tick { seed: None }),
            Some(value) => value.as_i64().map_or_else(
                || {
                    Err(vec![ParamError::InvalidSeed {
                        detail: format!("seed must be a non-negative integer, got {value}"),
                    }
                    .into()])
                },
                |seed| Ok(Action::Tick { seed: Some(seed) }),
            ),
        },
        ActionKind::Move => match parameters.get("sector") {
            Some(serde_json::Value::String(sector)) => Ok(Action::Move {
                sector: sector.clone(),
            }),
            Some(other) => Err(vec![ParamError::InvalidSector {
                detail: format!("sector must be a string, got {other}"),
            }
            .into()]),
            None => Err(vec![ParamError::InvalidSector {
                detail: "sector cannot be empty".to_owned(),
            }
            .into()]),
        },
        ActionKind::Claim => match parameters.get("quest_id") {
            Some(serde_json::Value::String(quest_id)) => Ok(Action::Claim {
                quest_id: quest_id.clone(),
            }),
            _ => Err(vec![ParamError::InvalidQuestId {
                detail: "quest_id must be a non-empty string".to_owned(),
            }
            .into()]),
        },
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
    use serde_json::json;

    use super::*;

    fn params(value: serde_json::Value) -> Parameters {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn default_state_is_valid() {
        let state = starlog_world::default_state();
        assert!(validate_state(&state, &GameplayConfig::default()).is_empty());
    }

    #[test]
    fn reports_every_violation() {
        let mut state = starlog_world::default_state();
        state.day = -1;
        state.ship.hull = 101;
        state.ship.power = -3;
        state.player.xp = -1;
        state.last_seed = -9;

        let errors = validate_state(&state, &GameplayConfig::default());
        assert!(errors.contains(&StructuralError::InvalidDay { day: -1 }));
        assert!(errors.contains(&StructuralError::InvalidHull { hull: 101 }));
        assert!(errors.contains(&StructuralError::InvalidPower { power: -3 }));
        assert!(errors.contains(&StructuralError::InvalidXp { xp: -1 }));
        assert!(errors.contains(&StructuralError::InvalidLastSeed { last_seed: -9 }));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn level_must_follow_the_curve() {
        let mut state = starlog_world::default_state();
        state.player.xp = 30;
        let errors = validate_state(&state, &GameplayConfig::default());
        assert_eq!(
            errors,
            vec![StructuralError::InvalidLevel {
                level: 1,
                expected: 3
            }]
        );

        state.player.level = 0;
        state.player.xp = 0;
        let errors = validate_state(&state, &GameplayConfig::default());
        assert_eq!(
            errors,
            vec![StructuralError::InvalidLevel {
                level: 0,
                expected: 1
            }]
        );
    }

    #[test]
    fn unknown_quests_and_duplicate_achievements() {
        let mut state = starlog_world::default_state();
        state
            .quests
            .push(starlog_types::QuestProgress::fresh("q_legacy"));
        state.achievements = vec!["First Day".to_owned(), "First Day".to_owned()];

        let errors = validate_state(&state, &GameplayConfig::default());
        assert!(errors.contains(&StructuralError::UnknownQuest {
            quest_id: "q_legacy".to_owned()
        }));
        assert!(errors.contains(&StructuralError::DuplicateAchievement {
            name: "First Day".to_owned()
        }));
    }

    #[test]
    fn sector_grammar() {
        assert!(sector_name_problems("Sektor A-1").is_empty());
        assert!(sector_name_problems("Łódź.Żółw_2").is_empty());
        assert_eq!(sector_name_problems("   "), vec!["sector cannot be empty"]);
        assert_eq!(
            sector_name_problems("bad/name"),
            vec!["sector has forbidden characters"]
        );
        let long = "x".repeat(41);
        assert_eq!(sector_name_problems(&long), vec!["sector too long (max 40)"]);
        assert!(sector_name_problems(&"x".repeat(40)).is_empty());
    }

    #[test]
    fn invalid_state_sector_is_reported() {
        let mut state = starlog_world::default_state();
        state.ship.sector = "<script>".to_owned();
        let errors = validate_state(&state, &GameplayConfig::default());
        assert_eq!(
            errors,
            vec![StructuralError::InvalidSector {
                sector: "<script>".to_owned()
            }]
        );
    }

    #[test]
    fn param_checks() {
        assert!(validate_params(&Action::Tick { seed: None }).is_empty());
        assert!(validate_params(&Action::Tick { seed: Some(0) }).is_empty());
        assert!(matches!(
            validate_params(&Action::Tick { seed: Some(-1) }).as_slice(),
            [ParamError::InvalidSeed { .. }]
        ));
        assert!(matches!(
            validate_params(&Action::Move {
                sector: String::new()
            })
            .as_slice(),
            [ParamError::InvalidSector { .. }]
        ));
        assert!(matches!(
            validate_params(&Action::Claim {
                quest_id: " ".to_owned()
            })
            .as_slice(),
            [ParamError::InvalidQuestId { .. }]
        ));
    }

    #[test]
    fn parse_raw_requests() {
        assert_eq!(
            parse_action("tick", &params(json!({"seed": 123}))).unwrap(),
            Action::Tick { seed: Some(123) }
        );
        assert_eq!(
            parse_action("tick", &Parameters::new()).unwrap(),
            Action::Tick { seed: None }
        );
        assert_eq!(
            parse_action("move", &params(json!({"sector": "AIRI"}))).unwrap(),
            Action::Move {
                sector: "AIRI".to_owned()
            }
        );
    }

    #[test]
    fn parse_rejects_wrong_types_and_unknown_names() {
        let errors = parse_action("tick", &params(json!({"seed": "abc"}))).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ActionError::Param {
                error: ParamError::InvalidSeed { .. }
            }]
        ));

        let errors = parse_action("tick", &params(json!({"seed": 1.5}))).unwrap_err();
        assert_eq!(errors.len(), 1);

        let errors = parse_action("move", &params(json!({"sector": 7}))).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ActionError::Param {
                error: ParamError::InvalidSector { .. }
            }]
        ));

        let errors = parse_action("warp", &Parameters::new()).unwrap_err();
        assert_eq!(
            errors,
            vec![ActionError::UnknownAction {
                action: "warp".to_owned()
            }]
        );
    }
}
