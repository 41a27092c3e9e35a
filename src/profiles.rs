//! Player profiles
//!
//! One record per player name: best distance, unlocked levels, lifetime kills.
//! Written only when a run's verdict changes.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StoreError};
use crate::sim::progression::LevelVerdict;
use crate::sim::state::RunSummary;

/// Storage key prefix for profile records
pub const PROFILE_KEY_PREFIX: &str = "tightrope.profile.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    /// Best floor(distance) over all runs
    pub best_distance: u64,
    /// Highest level index the player may start
    pub unlocked_level: usize,
    pub total_kills: u32,
    pub runs: u32,
}

impl PlayerProfile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            best_distance: 0,
            // Endless and the first story level are always open
            unlocked_level: 1,
            total_kills: 0,
            runs: 0,
        }
    }

    pub fn is_unlocked(&self, level_index: usize) -> bool {
        level_index <= self.unlocked_level
    }

    /// Fold a finished run into the record. Returns true if it set a new best.
    pub fn record_run(&mut self, level_index: usize, run: &RunSummary) -> bool {
        self.runs += 1;
        self.total_kills += run.kills;
        if run.verdict == LevelVerdict::Success && level_index >= self.unlocked_level {
            self.unlocked_level = level_index + 1;
            log::info!("{} unlocked level {}", self.name, self.unlocked_level);
        }
        let distance = run.distance.floor() as u64;
        if distance > self.best_distance {
            self.best_distance = distance;
            true
        } else {
            false
        }
    }
}

/// Profiles backed by a key-value store
pub struct ProfileBook<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProfileBook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn key(name: &str) -> String {
        format!("{PROFILE_KEY_PREFIX}{name}")
    }

    /// Load a profile, or start a fresh one
    pub fn load(&self, name: &str) -> Result<PlayerProfile, StoreError> {
        let profile = self.store.load_json::<PlayerProfile>(&Self::key(name))?;
        Ok(profile.unwrap_or_else(|| {
            log::info!("No profile for {name}, starting fresh");
            PlayerProfile::new(name)
        }))
    }

    pub fn save(&mut self, profile: &PlayerProfile) -> Result<(), StoreError> {
        self.store.save_json(&Self::key(&profile.name), profile)
    }

    /// Record a finished run for `name` and persist it. A run still in progress is
    /// not recorded and the stored profile comes back untouched.
    pub fn record_run(
        &mut self,
        name: &str,
        level_index: usize,
        run: &RunSummary,
    ) -> Result<PlayerProfile, StoreError> {
        let mut profile = self.load(name)?;
        if !run.verdict.is_terminal() {
            log::warn!("Not recording an unfinished run for {name}");
            return Ok(profile);
        }
        if profile.record_run(level_index, run) {
            log::info!("New best distance for {name}: {}", profile.best_distance);
        }
        if let Err(e) = self.save(&profile) {
            log::warn!("Could not save profile for {name}: {e}");
            return Err(e);
        }
        Ok(profile)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
