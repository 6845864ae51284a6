//! Demo components.

use cohort_component::Component;
use glam::Vec3;

/// World-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec3);

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

/// Linear velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity(pub Vec3);

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    #[must_use]
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, clamping at zero. Returns `true` once depleted.
    pub fn damage(&mut self, amount: f32) -> bool {
        self.current = (self.current - amount).max(0.0);
        self.current <= 0.0
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }
}

/// Damage taken per second while attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burning {
    pub damage_per_second: f32,
}

impl Component for Burning {
    fn type_name() -> &'static str {
        "Burning"
    }
}
