//! Escape probability.

use crate::config::CombatConfig;

/// Probability that an escape attempt succeeds.
///
/// # Formula
///
/// ```text
/// p  = base + clamp((own_speed - other_speed) × speed_factor, -cap, cap)
/// p -= low_health_penalty        if health_fraction < low_health_threshold
/// p  = clamp(p, min, max)
/// ```
pub fn escape_chance(
    config: &CombatConfig,
    own_speed: f64,
    other_speed: f64,
    health_fraction: f64,
) -> f64 {
    let cap = config.flee_speed_cap.abs();
    let speed_adjustment = ((own_speed - other_speed) * config.flee_speed_factor).clamp(-cap, cap);

    let mut chance = config.flee_base_chance + speed_adjustment;
    if health_fraction < config.flee_low_health_threshold {
        chance -= config.flee_low_health_penalty;
    }

    chance.clamp(config.flee_min_chance, config.flee_max_chance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn equal_speed_full_health_uses_base_rate() {
        let config = CombatConfig::default();
        assert!(approx(escape_chance(&config, 10.0, 10.0, 1.0), 0.5));
    }

    #[test]
    fn speed_adjustment_is_bounded() {
        let config = CombatConfig::default();
        assert!(approx(escape_chance(&config, 12.0, 10.0, 1.0), 0.6));
        assert!(approx(escape_chance(&config, 100.0, 10.0, 1.0), 0.75));
        assert!(approx(escape_chance(&config, 0.0, 100.0, 1.0), 0.25));
    }

    #[test]
    fn low_health_makes_escape_harder() {
        let config = CombatConfig::default();
        assert!(approx(escape_chance(&config, 10.0, 10.0, 0.2), 0.35));
        assert!(approx(escape_chance(&config, 0.0, 100.0, 0.1), 0.10));
    }
}
