//! Tunables and the move-timing source.
//!
//! Everything here is plain data with serde defaults so a bout can be
//! described by a partial JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::components::protocol::{AttackRequest, FinisherRequest, MoveTiming};
use crate::components::{FighterId, MoveId};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Per-fighter tuning
// ---------------------------------------------------------------------------

/// Frame counts and modifiers the states read from the context.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterTuning {
    /// Set on every ATTACK_RECOVERY exit.
    pub attack_cooldown_frames: u32,
    /// Upper bound on a single BLOCKING stint.
    pub max_block_frames: u32,
    pub taunt_frames: u32,
    pub taunt_momentum: u32,
    pub comeback_momentum_bonus: u32,
    /// Extra stun, in percent, for getting hit mid-taunt.
    pub taunt_stun_penalty_percent: u32,
    pub get_up_frames: u32,
    pub get_up_frames_per_knockdown: u32,
    pub max_get_up_frames: u32,
    pub comeback_get_up_bonus: u32,
    /// KNOCKED_DOWN duration when a finisher impact forces a knockdown.
    pub finisher_knockdown_frames: u32,
    /// STUNNED duration after a FINISHER_LOCKED timeout.
    pub lock_fallback_stun_frames: u32,
}

impl Default for FighterTuning {
    fn default() -> Self {
        Self {
            attack_cooldown_frames: 6,
            max_block_frames: 45,
            taunt_frames: 60,
            taunt_momentum: 10,
            comeback_momentum_bonus: 5,
            taunt_stun_penalty_percent: 50,
            get_up_frames: 20,
            get_up_frames_per_knockdown: 4,
            max_get_up_frames: 40,
            comeback_get_up_bonus: 6,
            finisher_knockdown_frames: 60,
            lock_fallback_stun_frames: 12,
        }
    }
}

impl FighterTuning {
    /// Stun applied to a taunting fighter that gets hit.
    pub fn taunt_stun(&self, stun_frames: u32) -> u32 {
        let extra = u64::from(stun_frames) * u64::from(self.taunt_stun_penalty_percent) / 100;
        stun_frames.saturating_add(u32::try_from(extra).unwrap_or(u32::MAX))
    }

    /// GETTING_UP duration: slower after each knockdown, faster in a comeback.
    pub fn get_up_duration(&self, knockdown_count: u32, comeback_active: bool) -> u32 {
        let base = self
            .get_up_frames
            .saturating_add(knockdown_count.saturating_mul(self.get_up_frames_per_knockdown));
        let base = base.min(self.max_get_up_frames);
        if comeback_active {
            base.saturating_sub(self.comeback_get_up_bonus).max(1)
        } else {
            base.max(1)
        }
    }

    /// Momentum granted by a completed taunt.
    pub fn momentum_for_taunt(&self, comeback_active: bool) -> u32 {
        if comeback_active {
            self.taunt_momentum.saturating_add(self.comeback_momentum_bonus)
        } else {
            self.taunt_momentum
        }
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveSpec {
    pub windup_frames: u32,
    pub active_frames: u32,
    pub recovery_frames: u32,
    pub damage: u32,
    pub stun_frames: u32,
    /// Maximum distance along the fight axis at which the move connects.
    pub reach: f32,
    /// `Some(frames)` turns a connected hit into a knockdown.
    #[serde(default)]
    pub knockdown_frames: Option<u32>,
    /// Combo window opened after a connected hit; 0 disables chaining.
    #[serde(default)]
    pub combo_window_frames: u32,
}

impl MoveSpec {
    pub fn timing(&self) -> MoveTiming {
        MoveTiming::new(self.windup_frames, self.active_frames, self.recovery_frames)
    }
}

/// Move-timing source: frame data per move id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveTable {
    moves: BTreeMap<String, MoveSpec>,
}

impl Default for MoveTable {
    fn default() -> Self {
        let mut moves = BTreeMap::new();
        let mut add = |name: &str, spec: MoveSpec| {
            moves.insert(name.to_owned(), spec);
        };
        add(
            "jab",
            MoveSpec {
                windup_frames: 3,
                active_frames: 2,
                recovery_frames: 4,
                damage: 5,
                stun_frames: 10,
                reach: 1.2,
                knockdown_frames: None,
                combo_window_frames: 8,
            },
        );
        add(
            "cross",
            MoveSpec {
                windup_frames: 6,
                active_frames: 3,
                recovery_frames: 8,
                damage: 9,
                stun_frames: 14,
                reach: 1.4,
                knockdown_frames: None,
                combo_window_frames: 6,
            },
        );
        add(
            "hook",
            MoveSpec {
                windup_frames: 9,
                active_frames: 3,
                recovery_frames: 12,
                damage: 12,
                stun_frames: 18,
                reach: 1.0,
                knockdown_frames: None,
                combo_window_frames: 0,
            },
        );
        add(
            "uppercut",
            MoveSpec {
                windup_frames: 12,
                active_frames: 4,
                recovery_frames: 18,
                damage: 16,
                stun_frames: 0,
                reach: 0.9,
                knockdown_frames: Some(50),
                combo_window_frames: 0,
            },
        );
        Self { moves }
    }
}

impl MoveTable {
    pub fn get(&self, move_id: &str) -> Option<&MoveSpec> {
        self.moves.get(move_id)
    }

    pub fn insert(&mut self, move_id: impl Into<String>, spec: MoveSpec) {
        self.moves.insert(move_id.into(), spec);
    }

    pub fn contains(&self, move_id: &str) -> bool {
        self.moves.contains_key(move_id)
    }

    /// Build the `REQUEST_ATTACK` payload for `move_id`.
    pub fn attack_request(
        &self,
        move_id: &str,
        target: Option<FighterId>,
    ) -> Result<AttackRequest, ConfigError> {
        let spec = self
            .get(move_id)
            .ok_or_else(|| ConfigError::UnknownMove(move_id.to_owned()))?;
        Ok(AttackRequest {
            move_id: MoveId::from(move_id),
            target,
            timing: spec.timing(),
        })
    }
}

/// Frame data and outcome of the scripted finisher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinisherSpec {
    pub move_id: String,
    pub setup_frames: u32,
    pub impact_frames: u32,
    pub recovery_frames: u32,
    pub damage: u32,
    pub stun_frames: u32,
    pub knockdown_forced: bool,
}

impl Default for FinisherSpec {
    fn default() -> Self {
        Self {
            move_id: "finisher".to_owned(),
            setup_frames: 48,
            impact_frames: 30,
            recovery_frames: 42,
            damage: 32,
            stun_frames: 20,
            knockdown_forced: true,
        }
    }
}

impl FinisherSpec {
    pub fn request(&self, target: Option<FighterId>) -> FinisherRequest {
        FinisherRequest {
            move_id: MoveId::from(self.move_id.as_str()),
            target,
            setup_frames: self.setup_frames,
            impact_frames: self.impact_frames,
            recovery_frames: self.recovery_frames,
        }
    }
}

// ---------------------------------------------------------------------------
// Bout
// ---------------------------------------------------------------------------

/// Per-fighter construction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    pub name: String,
    /// State name the machine starts in. Anything but `IDLE` is meant for
    /// test rigs; an unknown name aborts construction.
    pub initial_state: String,
    pub start_x: f32,
    pub health: u32,
    pub tuning: FighterTuning,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            name: "fighter".to_owned(),
            initial_state: "IDLE".to_owned(),
            start_x: 0.0,
            health: 100,
            tuning: FighterTuning::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoutConfig {
    pub fighters: [FighterConfig; 2],
    pub moves: MoveTable,
    pub finisher: FinisherSpec,
    pub max_ticks: u32,
}

impl Default for BoutConfig {
    fn default() -> Self {
        Self {
            fighters: [
                FighterConfig {
                    name: "red".to_owned(),
                    start_x: -1.0,
                    ..FighterConfig::default()
                },
                FighterConfig {
                    name: "blue".to_owned(),
                    start_x: 1.0,
                    ..FighterConfig::default()
                },
            ],
            moves: MoveTable::default(),
            finisher: FinisherSpec::default(),
            max_ticks: 600,
        }
    }
}

impl BoutConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_json(path.as_ref())
    }
}

/// Read and parse a JSON file.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
