//! The match loop.
//!
//! A [`Bout`] owns the hecs world holding both fighters and drives one
//! simulation tick at a time:
//!
//! 1. sync comeback and knockdown count into each machine,
//! 2. update fighter 0 then fighter 1, reducing their actions as they come
//!    (combat resolution, finisher relays, stats),
//! 3. integrate movement and stop fighters that reached their target.
//!
//! Relayed events land on the opponent's queue immediately, so fighter 1
//! reacts to fighter 0 within the same tick and fighter 0 reacts to fighter 1
//! on the next.

use hecs::{Entity, World};
use serde::Serialize;
use tracing::{debug, info};

use crate::components::{BoutStats, Corner, FighterAction, FighterEvent, FighterId, Health};
use crate::config::BoutConfig;
use crate::error::ConfigError;
use crate::fsm::FighterMachine;
use crate::scene::prefabs::spawn_fighter;
use crate::states::StateId;
use crate::systems::combat::{
    relay_finisher_lock, resolve_finisher_counter, resolve_finisher_impact, resolve_strike,
    StrikeOutcome,
};
use crate::systems::movement::movement_system;

/// One action in the bout-wide log, stamped with the tick that produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoggedAction {
    pub tick: u32,
    #[serde(flatten)]
    pub action: FighterAction,
}

/// Outcome of one active phase, as resolved by the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoggedStrike {
    pub tick: u32,
    pub attacker: FighterId,
    pub move_id: Option<String>,
    pub outcome: StrikeOutcome,
}

/// Point-in-time view of one fighter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FighterSnapshot {
    pub id: FighterId,
    pub name: String,
    pub state: StateId,
    pub state_timer: u32,
    pub attack_cooldown: u32,
    pub position_x: f32,
    pub finisher_active: bool,
    pub health: u32,
    pub stats: FighterStats,
}

/// Serializable mirror of [`BoutStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FighterStats {
    pub damage_dealt: u32,
    pub hits_landed: u32,
    pub hits_blocked: u32,
    pub knockdowns_suffered: u32,
    pub momentum: u32,
    pub finishers_landed: u32,
    pub finishers_countered: u32,
}

impl From<BoutStats> for FighterStats {
    fn from(s: BoutStats) -> Self {
        Self {
            damage_dealt: s.damage_dealt,
            hits_landed: s.hits_landed,
            hits_blocked: s.hits_blocked,
            knockdowns_suffered: s.knockdowns_suffered,
            momentum: s.momentum,
            finishers_landed: s.finishers_landed,
            finishers_countered: s.finishers_countered,
        }
    }
}

/// End-of-run summary.
#[derive(Clone, Debug, Serialize)]
pub struct BoutReport {
    pub ticks: u32,
    pub fighters: Vec<FighterSnapshot>,
    /// Actions each fighter emitted, in fighter order.
    pub action_counts: Vec<usize>,
    pub strikes: Vec<LoggedStrike>,
    pub log: Vec<LoggedAction>,
}

pub struct Bout {
    world: World,
    fighters: [Entity; 2],
    ids: [FighterId; 2],
    config: BoutConfig,
    tick: u32,
    log: Vec<LoggedAction>,
    strikes: Vec<LoggedStrike>,
}

impl Bout {
    /// Spawn both fighters. Fighter ids are their corner index.
    pub fn new(config: BoutConfig) -> Result<Self, ConfigError> {
        let mut world = World::new();
        let ids = [FighterId(0), FighterId(1)];
        let red = spawn_fighter(&mut world, ids[0], ids[1], &config.fighters[0])?;
        let blue = spawn_fighter(&mut world, ids[1], ids[0], &config.fighters[1])?;
        info!(
            red = %config.fighters[0].name,
            blue = %config.fighters[1].name,
            max_ticks = config.max_ticks,
            "bout started"
        );
        Ok(Self {
            world,
            fighters: [red, blue],
            ids,
            config,
            tick: 0,
            log: Vec::new(),
            strikes: Vec::new(),
        })
    }

    pub fn config(&self) -> &BoutConfig {
        &self.config
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn fighter_id(&self, index: usize) -> FighterId {
        self.ids[index]
    }

    pub fn opponent_id(&self, index: usize) -> FighterId {
        self.ids[1 - index]
    }

    pub fn log(&self) -> &[LoggedAction] {
        &self.log
    }

    pub fn strikes(&self) -> &[LoggedStrike] {
        &self.strikes
    }

    /// Queue an event on fighter `index`'s machine.
    pub fn push_event(&mut self, index: usize, event: FighterEvent) {
        if let Ok(mut fsm) = self.world.get::<&mut FighterMachine>(self.fighters[index]) {
            fsm.push_event(event);
        }
    }

    /// Read-only access to fighter `index`'s machine.
    pub fn machine(&self, index: usize) -> Option<hecs::Ref<'_, FighterMachine>> {
        self.world.get::<&FighterMachine>(self.fighters[index]).ok()
    }

    pub fn snapshot(&self, index: usize) -> Option<FighterSnapshot> {
        let entity = self.fighters[index];
        let corner = self.world.get::<&Corner>(entity).ok()?;
        let fsm = self.world.get::<&FighterMachine>(entity).ok()?;
        let health = self.world.get::<&Health>(entity).ok()?;
        let stats = self.world.get::<&BoutStats>(entity).ok()?;
        Some(FighterSnapshot {
            id: corner.id,
            name: corner.name.clone(),
            state: fsm.state(),
            state_timer: fsm.state_timer(),
            attack_cooldown: fsm.attack_cooldown(),
            position_x: fsm.position_x(),
            finisher_active: fsm.is_finisher_active(),
            health: health.current,
            stats: FighterStats::from(*stats),
        })
    }

    /// A fighter has run out of health.
    pub fn is_over(&self) -> bool {
        self.fighters.iter().any(|&e| {
            self.world
                .get::<&Health>(e)
                .map(|h| h.is_depleted())
                .unwrap_or(false)
        })
    }

    /// Advance the bout by one tick.
    pub fn step(&mut self) {
        self.tick += 1;

        for index in 0..2 {
            let actions = self.update_fighter(index);
            for action in actions {
                self.reduce(index, &action);
                self.log.push(LoggedAction {
                    tick: self.tick,
                    action,
                });
            }
        }

        for id in movement_system(&mut self.world) {
            if let Some(index) = self.ids.iter().position(|&f| f == id) {
                self.push_event(index, FighterEvent::RequestIdle);
            }
        }
    }

    /// Step until `max_ticks` or a fighter is out of health.
    pub fn run(&mut self) -> BoutReport {
        while self.tick < self.config.max_ticks && !self.is_over() {
            self.step();
        }
        self.report()
    }

    pub fn report(&self) -> BoutReport {
        let fighters: Vec<_> = (0..2).filter_map(|i| self.snapshot(i)).collect();
        let action_counts = self
            .ids
            .iter()
            .map(|&id| self.log.iter().filter(|l| l.action.fighter() == id).count())
            .collect();
        info!(
            ticks = self.tick,
            red_health = fighters.first().map_or(0, |f| f.health),
            blue_health = fighters.get(1).map_or(0, |f| f.health),
            "bout finished"
        );
        BoutReport {
            ticks: self.tick,
            fighters,
            action_counts,
            strikes: self.strikes.clone(),
            log: self.log.clone(),
        }
    }

    fn update_fighter(&mut self, index: usize) -> Vec<FighterAction> {
        let entity = self.fighters[index];
        let comeback = self
            .world
            .get::<&Health>(entity)
            .map(|h| h.is_critical())
            .unwrap_or(false);
        let knockdowns = self
            .world
            .get::<&BoutStats>(entity)
            .map(|s| s.knockdowns_suffered)
            .unwrap_or(0);

        let Ok(mut fsm) = self.world.get::<&mut FighterMachine>(entity) else {
            return Vec::new();
        };
        fsm.set_comeback_active(comeback);
        fsm.set_knockdown_count(knockdowns);
        fsm.update();
        fsm.drain_actions()
    }

    /// Reducer: turn one emitted action into world changes and relays.
    fn reduce(&mut self, index: usize, action: &FighterAction) {
        let entity = self.fighters[index];
        let opponent = self.fighters[1 - index];

        match *action {
            FighterAction::Transition {
                to: StateId::AttackActive,
                ..
            } => {
                let move_id = self
                    .machine(index)
                    .and_then(|fsm| fsm.active_move_id().map(|m| m.to_string()));
                let outcome = resolve_strike(&mut self.world, &self.config.moves, entity, opponent);
                debug!(tick = self.tick, attacker = %self.ids[index], ?move_id, ?outcome, "strike resolved");
                self.strikes.push(LoggedStrike {
                    tick: self.tick,
                    attacker: self.ids[index],
                    move_id,
                    outcome,
                });
            }
            FighterAction::Transition {
                to: StateId::KnockedDown,
                ..
            } => {
                if let Ok(mut stats) = self.world.get::<&mut BoutStats>(entity) {
                    stats.knockdowns_suffered += 1;
                }
            }
            FighterAction::TauntCompleted { momentum, .. } => {
                if let Ok(mut stats) = self.world.get::<&mut BoutStats>(entity) {
                    stats.momentum = stats.momentum.saturating_add(momentum);
                }
            }
            FighterAction::FinisherSetupStart { lock_frames, .. } => {
                relay_finisher_lock(&mut self.world, self.ids[index], opponent, lock_frames);
            }
            FighterAction::FinisherImpactStart { .. } => {
                if self.is_locked_by(1 - index, self.ids[index]) {
                    resolve_finisher_impact(&mut self.world, &self.config.finisher, entity, opponent);
                } else {
                    debug!(tick = self.tick, attacker = %self.ids[index], "finisher impact found no locked target");
                }
            }
            FighterAction::FinisherCountered { .. } => {
                resolve_finisher_counter(&mut self.world, opponent);
            }
            _ => {}
        }
    }

    fn is_locked_by(&self, index: usize, attacker: FighterId) -> bool {
        self.machine(index).is_some_and(|fsm| {
            fsm.state() == StateId::FinisherLocked
                && fsm.context().finisher_attacker_id == Some(attacker)
        })
    }
}
