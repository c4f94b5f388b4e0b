/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Lower clamp for MoveSpeed writes. Characters cannot be slowed below
    /// this regardless of how many slow effects stack.
    pub move_speed_min: f32,

    /// Upper clamp for MoveSpeed writes. Characters cannot be boosted above
    /// this regardless of source.
    pub move_speed_max: f32,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of modifiers a single gameplay effect may carry.
    pub const MAX_EFFECT_MODIFIERS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MOVE_SPEED_MIN: f32 = 150.0;
    pub const DEFAULT_MOVE_SPEED_MAX: f32 = 1000.0;

    pub fn new() -> Self {
        Self {
            move_speed_min: Self::DEFAULT_MOVE_SPEED_MIN,
            move_speed_max: Self::DEFAULT_MOVE_SPEED_MAX,
        }
    }

    pub fn with_move_speed_bounds(move_speed_min: f32, move_speed_max: f32) -> Self {
        Self {
            move_speed_min,
            move_speed_max,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
