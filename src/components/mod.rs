pub mod fighter;
pub mod protocol;

use glam::Vec3;

pub use fighter::{FighterContext, FighterId, MoveId};
pub use protocol::{AttackRequest, FighterAction, FighterEvent, FinisherRequest, MoveTiming};

// ---------------------------------------------------------------------------
// Bout-world components (hecs)
// ---------------------------------------------------------------------------
//
// A fighter entity carries: Corner, LocalTransform, Velocity, Health,
// BoutStats and its FighterMachine.

/// Fighter position. The fight axis is x; y and z stay at zero.
pub struct LocalTransform {
    pub position: Vec3,
}

impl LocalTransform {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    pub fn at_x(x: f32) -> Self {
        Self::new(Vec3::new(x, 0.0, 0.0))
    }
}

/// Linear velocity in world units per tick.
pub struct Velocity(pub Vec3);

/// Which fighter this entity is, and who it is facing.
#[derive(Clone, Debug)]
pub struct Corner {
    pub id: FighterId,
    pub name: String,
    pub opponent: FighterId,
}

/// Hit points, owned by the reducer side of the bout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `damage`, saturating at zero.
    pub fn apply_damage(&mut self, damage: u32) {
        self.current = self.current.saturating_sub(damage);
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Below a quarter of max: the comeback flag turns on.
    pub fn is_critical(&self) -> bool {
        u64::from(self.current) * 4 < u64::from(self.max)
    }
}

/// Running tallies the reducer keeps per fighter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoutStats {
    pub damage_dealt: u32,
    pub hits_landed: u32,
    pub hits_blocked: u32,
    pub knockdowns_suffered: u32,
    pub momentum: u32,
    pub finishers_landed: u32,
    pub finishers_countered: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_below_a_quarter() {
        let mut health = Health::new(100);
        health.apply_damage(75);
        assert!(!health.is_critical());
        health.apply_damage(1);
        assert!(health.is_critical());
    }

    #[test]
    fn huge_health_pool_does_not_overflow() {
        let mut health = Health::new(u32::MAX);
        assert!(!health.is_critical());
        health.apply_damage(u32::MAX - 10);
        assert!(health.is_critical());
    }
}
