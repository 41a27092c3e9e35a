//! Level catalog
//!
//! Built-in level rules plus loading of user-supplied rule sets from JSON.
//! Index 0 is always endless mode; story levels unlock in order.

use crate::consts::TICKS_PER_SECOND;
use crate::sim::hazards::HazardWeights;
use crate::sim::progression::{EnabledSystems, LevelRule, LevelRuleError, Objective};

const SECONDS: u64 = TICKS_PER_SECOND as u64;

/// The built-in levels, in unlock order
pub fn catalog() -> Vec<LevelRule> {
    vec![
        LevelRule::endless(),
        LevelRule {
            name: "First Steps".to_string(),
            objective: Objective::Distance,
            target_distance: 100.0,
            systems: EnabledSystems {
                hazards: true,
                bird: false,
            },
            hazard_weights: HazardWeights {
                explosive: 0,
                ..HazardWeights::default()
            },
        },
        LevelRule {
            name: "Against the Clock".to_string(),
            objective: Objective::TimeBoxed {
                limit_ticks: 90 * SECONDS,
            },
            target_distance: 300.0,
            systems: EnabledSystems::default(),
            hazard_weights: HazardWeights {
                accelerate: 4,
                ..HazardWeights::default()
            },
        },
        LevelRule {
            name: "Steady Hands".to_string(),
            objective: Objective::SteadyBalance {
                target_ticks: 6 * SECONDS,
            },
            target_distance: 200.0,
            systems: EnabledSystems::default(),
            hazard_weights: HazardWeights {
                steady: 4,
                ..HazardWeights::default()
            },
        },
        LevelRule {
            name: "Clockwork Skies".to_string(),
            objective: Objective::KillCount { target: 3 },
            target_distance: 0.0,
            systems: EnabledSystems {
                hazards: false,
                bird: true,
            },
            hazard_weights: HazardWeights::default(),
        },
        LevelRule {
            name: "Gauntlet".to_string(),
            objective: Objective::Distance,
            target_distance: 500.0,
            systems: EnabledSystems {
                hazards: true,
                bird: true,
            },
            hazard_weights: HazardWeights {
                explosive: 2,
                ..HazardWeights::default()
            },
        },
    ]
}

/// Look up a built-in level
pub fn level(index: usize) -> Option<LevelRule> {
    catalog().into_iter().nth(index)
}

/// Parse a JSON array of level rules, validating every entry
pub fn load_levels_json(json: &str) -> Result<Vec<LevelRule>, LevelRuleError> {
    let rules: Vec<LevelRule> = serde_json::from_str(json)?;
    if rules.is_empty() {
        return Err(LevelRuleError::NoLevels);
    }
    for rule in &rules {
        if let Err(e) = rule.validate() {
            log::warn!("Rejected level config: {e}");
            return Err(e);
        }
    }
    log::info!("Loaded {} level(s) from JSON", rules.len());
    Ok(rules)
}
