//! Leveling calculator.
//!
//! Maps a user's cumulative XP to a level and progress-within-level against a
//! fixed cost schedule: level 1 costs 1000 XP and every later level costs 500
//! more than the one before it, up to level 10.

/// XP required to complete level 1.
pub const BASE_LEVEL_XP: u32 = 1000;

/// Additional XP required by each level over the previous one.
pub const LEVEL_XP_STEP: u32 = 500;

/// Highest reachable level; surplus XP past it never levels further.
pub const MAX_LEVEL: u32 = 10;

/// Snapshot of where a cumulative XP total lands on the schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelProgress {
    pub level: u32,
    pub current_level_xp: u32,
    pub required_xp: u32,
    pub percent: f64,
}

/// Resolve a cumulative XP total into level and within-level progress.
///
/// Total function: negative input clamps to level 1 at 0%, and anything at or
/// past the level-10 threshold clamps to level 10 at 100%. Every level's
/// requirement is at least `BASE_LEVEL_XP`, so the percentage never divides
/// by zero.
#[must_use]
pub fn level_progress(total_xp: i64) -> LevelProgress {
    let mut remaining = u64::try_from(total_xp).unwrap_or(0);
    let mut level = 1;

    loop {
        let required = BASE_LEVEL_XP + LEVEL_XP_STEP * (level - 1);

        if level >= MAX_LEVEL {
            return LevelProgress {
                level: MAX_LEVEL,
                current_level_xp: u32::try_from(remaining.min(u64::from(required)))
                    .unwrap_or(required),
                required_xp: required,
                percent: 100.0,
            };
        }

        if remaining < u64::from(required) {
            // remaining < required <= u32::MAX here, the cast cannot lose.
            let current = u32::try_from(remaining).unwrap_or(0);
            return LevelProgress {
                level,
                current_level_xp: current,
                required_xp: required,
                percent: f64::from(current) / f64::from(required) * 100.0,
            };
        }

        remaining -= u64::from(required);
        level += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_xp_is_level_one_at_zero_percent() {
        let p = level_progress(0);
        assert_eq!(p.level, 1);
        assert_eq!(p.current_level_xp, 0);
        assert_eq!(p.required_xp, 1000);
        assert_eq!(p.percent, 0.0);
    }

    #[test]
    fn just_below_first_threshold() {
        let p = level_progress(999);
        assert_eq!(p.level, 1);
        assert_eq!(p.current_level_xp, 999);
        assert_eq!(p.required_xp, 1000);
        assert!((p.percent - 99.9).abs() < 1e-9);
    }

    #[test]
    fn exactly_first_threshold_rolls_into_level_two() {
        let p = level_progress(1000);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_level_xp, 0);
        assert_eq!(p.required_xp, 1500);
        assert_eq!(p.percent, 0.0);
    }

    #[test]
    fn mid_level_progress() {
        // 1000 completes level 1, 750 sits inside level 2's 1500 requirement.
        let p = level_progress(1750);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_level_xp, 750);
        assert_eq!(p.required_xp, 1500);
        assert!((p.percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn surplus_clamps_at_max_level() {
        let p = level_progress(1_000_000);
        assert_eq!(p.level, MAX_LEVEL);
        assert_eq!(p.percent, 100.0);
        assert_eq!(p.required_xp, 5500);
        assert!(p.current_level_xp <= p.required_xp);
    }

    #[test]
    fn negative_xp_clamps_to_level_one() {
        let p = level_progress(-250);
        assert_eq!(p.level, 1);
        assert_eq!(p.current_level_xp, 0);
        assert_eq!(p.percent, 0.0);
    }

    #[test]
    fn schedule_steps_by_five_hundred() {
        // Cumulative thresholds: 1000, 2500, 4500, ...
        assert_eq!(level_progress(2499).level, 2);
        assert_eq!(level_progress(2500).level, 3);
        assert_eq!(level_progress(2500).required_xp, 2000);
    }
}
