//! Combat balance constants and tunable parameters.
//!
//! Every number the session rolls against lives here so hosts can retune
//! game feel (via TOML, see `combat-content`) without touching rules code.
//! Percentages are stored as fractions in `[0.0, 1.0]`.

/// Tunable parameters for a [`CombatSession`](crate::engine::CombatSession).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Upper bound (exclusive) of the uniform initiative jitter added to speed.
    pub initiative_jitter: f64,

    /// Symmetric damage variance; 0.10 means a ±10% multiplier.
    pub damage_variance: f64,

    /// Multiplier applied to raw damage on a critical hit.
    pub crit_multiplier: f64,

    /// Base critical chance for the player side.
    pub player_crit_chance: f64,

    /// Base critical chance for the opponent side.
    pub opponent_crit_chance: f64,

    /// Weight of "use an ability" in the opponent's turn choice.
    pub ai_ability_chance: f64,

    /// Flee probability before any adjustment.
    pub flee_base_chance: f64,

    /// Flee probability change per point of speed advantage.
    pub flee_speed_factor: f64,

    /// Bound on the absolute speed adjustment.
    pub flee_speed_cap: f64,

    /// Health fraction below which fleeing gets harder.
    pub flee_low_health_threshold: f64,

    /// Penalty applied when under the low-health threshold.
    pub flee_low_health_penalty: f64,

    /// Lower clamp for the final flee probability.
    pub flee_min_chance: f64,

    /// Upper clamp for the final flee probability.
    pub flee_max_chance: f64,

    /// Health fraction at or below which a boss becomes enraged.
    pub enrage_threshold: f64,

    /// Damage bonus (percent) granted by the enrage aura.
    pub enrage_damage_pct: i32,

    /// Cap on the defender's aggregated damage reduction.
    pub max_damage_reduction: f64,

    /// Damage multiplier against a defender vulnerable to the attack's school.
    pub vulnerability_multiplier: f64,

    /// Upper bound on automatic turns resolved inside a single call.
    pub max_automatic_turns: u32,
}

impl CombatConfig {
    pub const DEFAULT_INITIATIVE_JITTER: f64 = 5.0;
    pub const DEFAULT_DAMAGE_VARIANCE: f64 = 0.10;
    pub const DEFAULT_CRIT_MULTIPLIER: f64 = 2.0;
    pub const DEFAULT_PLAYER_CRIT_CHANCE: f64 = 0.10;
    pub const DEFAULT_OPPONENT_CRIT_CHANCE: f64 = 0.05;
    pub const DEFAULT_AI_ABILITY_CHANCE: f64 = 0.40;
    pub const DEFAULT_FLEE_BASE_CHANCE: f64 = 0.50;
    pub const DEFAULT_FLEE_SPEED_FACTOR: f64 = 0.05;
    pub const DEFAULT_FLEE_SPEED_CAP: f64 = 0.25;
    pub const DEFAULT_FLEE_LOW_HEALTH_THRESHOLD: f64 = 0.25;
    pub const DEFAULT_FLEE_LOW_HEALTH_PENALTY: f64 = 0.15;
    pub const DEFAULT_FLEE_MIN_CHANCE: f64 = 0.10;
    pub const DEFAULT_FLEE_MAX_CHANCE: f64 = 0.90;
    pub const DEFAULT_ENRAGE_THRESHOLD: f64 = 0.30;
    pub const DEFAULT_ENRAGE_DAMAGE_PCT: i32 = 50;
    pub const DEFAULT_MAX_DAMAGE_REDUCTION: f64 = 0.90;
    pub const DEFAULT_VULNERABILITY_MULTIPLIER: f64 = 1.5;
    pub const DEFAULT_MAX_AUTOMATIC_TURNS: u32 = 32;

    pub fn new() -> Self {
        Self {
            initiative_jitter: Self::DEFAULT_INITIATIVE_JITTER,
            damage_variance: Self::DEFAULT_DAMAGE_VARIANCE,
            crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            player_crit_chance: Self::DEFAULT_PLAYER_CRIT_CHANCE,
            opponent_crit_chance: Self::DEFAULT_OPPONENT_CRIT_CHANCE,
            ai_ability_chance: Self::DEFAULT_AI_ABILITY_CHANCE,
            flee_base_chance: Self::DEFAULT_FLEE_BASE_CHANCE,
            flee_speed_factor: Self::DEFAULT_FLEE_SPEED_FACTOR,
            flee_speed_cap: Self::DEFAULT_FLEE_SPEED_CAP,
            flee_low_health_threshold: Self::DEFAULT_FLEE_LOW_HEALTH_THRESHOLD,
            flee_low_health_penalty: Self::DEFAULT_FLEE_LOW_HEALTH_PENALTY,
            flee_min_chance: Self::DEFAULT_FLEE_MIN_CHANCE,
            flee_max_chance: Self::DEFAULT_FLEE_MAX_CHANCE,
            enrage_threshold: Self::DEFAULT_ENRAGE_THRESHOLD,
            enrage_damage_pct: Self::DEFAULT_ENRAGE_DAMAGE_PCT,
            max_damage_reduction: Self::DEFAULT_MAX_DAMAGE_REDUCTION,
            vulnerability_multiplier: Self::DEFAULT_VULNERABILITY_MULTIPLIER,
            max_automatic_turns: Self::DEFAULT_MAX_AUTOMATIC_TURNS,
        }
    }

    /// Base critical chance for the given side.
    pub fn base_crit_chance(&self, side: crate::state::Side) -> f64 {
        match side {
            crate::state::Side::Player => self.player_crit_chance,
            crate::state::Side::Opponent => self.opponent_crit_chance,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
