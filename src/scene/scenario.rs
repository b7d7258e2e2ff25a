//! Scripted bouts.
//!
//! A [`Scenario`] stands in for the decision layer: a timeline of intents per
//! fighter, fed to a [`Bout`] at fixed ticks, plus optional expectations about
//! each fighter's state after a tick has run. Cues for tick `t` are queued
//! before tick `t` is simulated; expectations for tick `t` are checked right
//! after it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::components::FighterEvent;
use crate::config::{load_json, BoutConfig};
use crate::error::ConfigError;
use crate::states::StateId;
use crate::systems::{Bout, BoutReport};

/// What a fighter wants to do. Translated into a [`FighterEvent`] using the
/// bout's move table and finisher spec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Attack { move_id: String },
    Combo { move_id: String },
    Block,
    Idle,
    Taunt,
    Move { target_x: f32, speed: f32 },
    Finisher,
    /// Counter the opponent's finisher. Delivered to the opponent, whose
    /// setup is what gets broken.
    CounterFinisher { stun_frames: u32 },
    /// Raw event for this fighter, bypassing translation.
    Event { event: FighterEvent },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub tick: u32,
    pub fighter: usize,
    #[serde(flatten)]
    pub intent: Intent,
}

/// Expected fighter state after `tick` has been simulated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    pub tick: u32,
    pub fighter: usize,
    pub state: String,
    #[serde(default)]
    pub timer: Option<u32>,
    #[serde(default)]
    pub cooldown: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: BoutConfig,
    pub ticks: u32,
    #[serde(default)]
    pub cues: Vec<Cue>,
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

/// A failed expectation, with what was observed instead.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mismatch {
    pub tick: u32,
    pub fighter: usize,
    pub expected: String,
    pub observed: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: String,
    pub mismatches: Vec<Mismatch>,
    pub report: BoutReport,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl Intent {
    /// The fighter that receives the translated event, given the cue's fighter.
    fn recipient(&self, fighter: usize) -> usize {
        match self {
            Intent::CounterFinisher { .. } => 1 - fighter,
            _ => fighter,
        }
    }

    fn to_event(&self, bout: &Bout, fighter: usize) -> Result<FighterEvent, ConfigError> {
        let config = bout.config();
        let target = Some(bout.opponent_id(fighter));
        let event = match self {
            Intent::Attack { move_id } => {
                FighterEvent::RequestAttack(config.moves.attack_request(move_id, target)?)
            }
            Intent::Combo { move_id } => {
                FighterEvent::RequestComboAttack(config.moves.attack_request(move_id, target)?)
            }
            Intent::Block => FighterEvent::RequestBlock,
            Intent::Idle => FighterEvent::RequestIdle,
            Intent::Taunt => FighterEvent::RequestTaunt,
            Intent::Move { target_x, speed } => FighterEvent::RequestMove {
                target_x: *target_x,
                speed: *speed,
            },
            Intent::Finisher => FighterEvent::RequestFinisher(config.finisher.request(target)),
            Intent::CounterFinisher { stun_frames } => FighterEvent::CounterFinisher {
                stun_frames: *stun_frames,
            },
            Intent::Event { event } => event.clone(),
        };
        Ok(event)
    }
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let scenario: Self = load_json(path.as_ref())?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Look up a built-in scenario by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "jab" => Some(jab()),
            "interrupt" => Some(interrupt()),
            "finisher" => Some(finisher()),
            "counter" => Some(counter()),
            "combo" => Some(combo()),
            "exchange" => Some(exchange()),
            _ => None,
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["jab", "interrupt", "finisher", "counter", "combo", "exchange"]
    }

    /// State names must parse and moves must exist. A typo here is a wiring
    /// bug, not something to discover halfway through a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for expectation in &self.expectations {
            check_fighter(expectation.fighter)?;
            StateId::from_name(&expectation.state)?;
        }
        for fighter in &self.config.fighters {
            StateId::from_name(&fighter.initial_state)?;
        }
        for cue in &self.cues {
            check_fighter(cue.fighter)?;
            match &cue.intent {
                Intent::Attack { move_id } | Intent::Combo { move_id }
                    if !self.config.moves.contains(move_id) =>
                {
                    return Err(ConfigError::UnknownMove(move_id.clone()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Run the scenario to completion and check every expectation.
    pub fn run(&self) -> Result<ScenarioOutcome, ConfigError> {
        self.validate()?;
        let mut bout = Bout::new(self.config.clone())?;
        let mut mismatches = Vec::new();

        for tick in 1..=self.ticks {
            for cue in self.cues.iter().filter(|c| c.tick == tick) {
                let event = cue.intent.to_event(&bout, cue.fighter)?;
                debug!(tick, fighter = cue.fighter, event = event.name(), "cue");
                bout.push_event(cue.intent.recipient(cue.fighter), event);
            }

            bout.step();

            for expectation in self.expectations.iter().filter(|e| e.tick == tick) {
                if let Some(mismatch) = check(&bout, expectation)? {
                    warn!(
                        scenario = %self.name,
                        tick,
                        fighter = mismatch.fighter,
                        expected = %mismatch.expected,
                        observed = %mismatch.observed,
                        "expectation failed"
                    );
                    mismatches.push(mismatch);
                }
            }
        }

        Ok(ScenarioOutcome {
            scenario: self.name.clone(),
            mismatches,
            report: bout.report(),
        })
    }
}

fn check_fighter(fighter: usize) -> Result<(), ConfigError> {
    if fighter < 2 {
        Ok(())
    } else {
        Err(ConfigError::UnknownFighter(fighter))
    }
}

fn check(bout: &Bout, expectation: &Expectation) -> Result<Option<Mismatch>, ConfigError> {
    let expected_state = StateId::from_name(&expectation.state)?;
    let Some(snap) = bout.snapshot(expectation.fighter) else {
        return Ok(None);
    };

    let state_ok = snap.state == expected_state;
    let timer_ok = expectation.timer.map_or(true, |t| t == snap.state_timer);
    let cooldown_ok = expectation
        .cooldown
        .map_or(true, |c| c == snap.attack_cooldown);
    if state_ok && timer_ok && cooldown_ok {
        return Ok(None);
    }

    Ok(Some(Mismatch {
        tick: expectation.tick,
        fighter: expectation.fighter,
        expected: describe(&expectation.state, expectation.timer, expectation.cooldown),
        observed: describe(
            snap.state.name(),
            Some(snap.state_timer),
            Some(snap.attack_cooldown),
        ),
    }))
}

fn describe(state: &str, timer: Option<u32>, cooldown: Option<u32>) -> String {
    let mut out = state.to_owned();
    if let Some(t) = timer {
        out.push_str(&format!(" timer={t}"));
    }
    if let Some(c) = cooldown {
        out.push_str(&format!(" cooldown={c}"));
    }
    out
}

// ---------------------------------------------------------------------------
// Built-ins
// ---------------------------------------------------------------------------

fn cue(tick: u32, fighter: usize, intent: Intent) -> Cue {
    Cue {
        tick,
        fighter,
        intent,
    }
}

fn expect_state(tick: u32, fighter: usize, state: StateId, timer: Option<u32>) -> Expectation {
    Expectation {
        tick,
        fighter,
        state: state.name().to_owned(),
        timer,
        cooldown: None,
    }
}

fn attack(move_id: &str) -> Intent {
    Intent::Attack {
        move_id: move_id.to_owned(),
    }
}

/// Fighters one unit apart, inside every default move's reach.
fn close_config() -> BoutConfig {
    let mut config = BoutConfig::default();
    config.fighters[0].start_x = -0.5;
    config.fighters[1].start_x = 0.5;
    config
}

fn jab() -> Scenario {
    let mut config = BoutConfig::default();
    config.fighters[0].start_x = -4.0;
    config.fighters[1].start_x = 4.0;
    let mut settled = expect_state(9, 0, StateId::Idle, Some(0));
    settled.cooldown = Some(6);
    Scenario {
        name: "jab".to_owned(),
        description: "A 3/2/4 jab thrown at nobody: windup, active, recovery, then the cooldown."
            .to_owned(),
        config,
        ticks: 16,
        cues: vec![cue(1, 0, attack("jab"))],
        expectations: vec![
            expect_state(3, 0, StateId::AttackActive, Some(2)),
            expect_state(5, 0, StateId::AttackRecovery, Some(4)),
            settled,
        ],
    }
}

fn interrupt() -> Scenario {
    Scenario {
        name: "interrupt".to_owned(),
        description: "Red winds up a hook; blue's faster jab lands first and cancels it."
            .to_owned(),
        config: close_config(),
        ticks: 20,
        cues: vec![cue(1, 0, attack("hook")), cue(1, 1, attack("jab"))],
        expectations: vec![
            expect_state(3, 0, StateId::AttackWindup, Some(6)),
            expect_state(4, 0, StateId::Stunned, Some(9)),
            expect_state(4, 1, StateId::AttackActive, Some(1)),
            expect_state(13, 0, StateId::Idle, None),
        ],
    }
}

fn finisher() -> Scenario {
    Scenario {
        name: "finisher".to_owned(),
        description: "Red lands the finisher: blue is locked, floored, and rises slowly."
            .to_owned(),
        config: close_config(),
        ticks: 140,
        cues: vec![cue(1, 0, Intent::Finisher)],
        expectations: vec![
            expect_state(1, 0, StateId::FinisherSetup, Some(47)),
            expect_state(1, 1, StateId::FinisherLocked, Some(77)),
            expect_state(48, 0, StateId::FinisherImpact, Some(30)),
            expect_state(48, 1, StateId::KnockedDown, Some(59)),
            expect_state(78, 0, StateId::AttackRecovery, Some(42)),
            expect_state(107, 1, StateId::GettingUp, Some(24)),
        ],
    }
}

fn counter() -> Scenario {
    Scenario {
        name: "counter".to_owned(),
        description: "Blue counters red's finisher during setup and walks free.".to_owned(),
        config: close_config(),
        ticks: 40,
        cues: vec![
            cue(1, 0, Intent::Finisher),
            cue(10, 1, Intent::CounterFinisher { stun_frames: 15 }),
        ],
        expectations: vec![
            expect_state(9, 1, StateId::FinisherLocked, None),
            expect_state(10, 0, StateId::Stunned, Some(14)),
            expect_state(10, 1, StateId::Idle, Some(0)),
            expect_state(24, 0, StateId::Idle, None),
        ],
    }
}

fn combo() -> Scenario {
    let mut chained = expect_state(10, 0, StateId::AttackWindup, Some(5));
    chained.cooldown = Some(5);
    Scenario {
        name: "combo".to_owned(),
        description: "Red's jab connects, opening a combo window; the cross chains in without waiting out the cooldown."
            .to_owned(),
        config: close_config(),
        ticks: 40,
        cues: vec![
            cue(1, 0, attack("jab")),
            cue(
                10,
                0,
                Intent::Combo {
                    move_id: "cross".to_owned(),
                },
            ),
        ],
        expectations: vec![
            expect_state(3, 1, StateId::Stunned, Some(9)),
            expect_state(9, 0, StateId::ComboWindow, Some(8)),
            chained,
            expect_state(15, 0, StateId::AttackActive, Some(3)),
            expect_state(15, 1, StateId::Stunned, Some(13)),
        ],
    }
}

fn exchange() -> Scenario {
    Scenario {
        name: "exchange".to_owned(),
        description: "A free-form round: footwork, a blocked jab, a taunt punished, an uppercut knockdown."
            .to_owned(),
        config: BoutConfig::default(),
        ticks: 240,
        cues: vec![
            cue(
                1,
                0,
                Intent::Move {
                    target_x: -0.5,
                    speed: 0.1,
                },
            ),
            cue(1, 1, Intent::Block),
            cue(8, 0, attack("jab")),
            cue(30, 1, Intent::Taunt),
            cue(32, 0, attack("cross")),
            cue(70, 0, attack("uppercut")),
            cue(120, 1, attack("hook")),
            cue(150, 0, Intent::Block),
            cue(170, 1, Intent::Taunt),
        ],
        expectations: Vec::new(),
    }
}
