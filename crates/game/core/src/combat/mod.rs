//! Combat resolution formulas.
//!
//! Pure functions only: they read stats and modifiers, draw from the injected
//! random source, and return numbers. Applying the numbers to combatants is
//! the session's job.
//!
//! # Core Functions
//!
//! - `roll_damage`: raw damage, critical roll, variance, multiplier
//! - `elemental_adjust`: vulnerability and flat resistance by school
//! - `check_hit`: untargetable and dodge checks
//! - `crit_chance`: per-side base plus modifiers
//! - `escape_chance`: flee probability
//! - `apply_damage` / `apply_heal`: HP arithmetic (clamped)

pub mod damage;
pub mod flee;
pub mod hit;

pub use damage::{
    DamageRoll, DamageSchool, ElementalAffinity, apply_damage, apply_heal, elemental_adjust,
    mitigate, raw_damage, roll_damage,
};
pub use flee::escape_chance;
pub use hit::{HitCheck, check_hit, crit_chance};
