//! Level Engine - pure XP -> level/tier mapping.
//!
//! Deterministic and side-effect free: the repository invokes it inside an
//! atomic commit, tests invoke it directly. Threshold sequence with the
//! default policy: 100, 120, 144, 172, ... (each 20% above the last,
//! floored).

use serde::{Deserialize, Serialize};

use crate::core_types::{Level, Xp};

/// Level progression policy.
///
/// All knobs are named configuration so the growth curve is never an inline
/// literal at a call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPolicy {
    /// XP required to go from level 1 to level 2.
    pub base_xp: u64,
    /// Per-level multiplier on the XP requirement.
    pub growth: f64,
    /// Hard level cap; XP past the cap still accumulates.
    pub max_level: Level,
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self {
            base_xp: 100,
            growth: 1.2,
            max_level: 150,
        }
    }
}

/// Outcome of applying experience to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub experience_points: Xp,
    pub level: Level,
    pub leveled_up: bool,
}

/// XP required to advance FROM `level` to the next one.
///
/// `floor(base_xp * growth^(level-1))`, strictly increasing for growth > 1.
/// A tiny relative nudge is applied before flooring so exact-integer powers
/// (e.g. 100 * 1.2^2 = 144) are not truncated by f64 rounding.
pub fn required_experience(policy: &LevelPolicy, level: Level) -> Xp {
    if level <= 1 {
        return policy.base_xp;
    }
    let raw = policy.base_xp as f64 * policy.growth.powi((level - 1) as i32);
    (raw * (1.0 + 1e-12)).floor() as Xp
}

/// Add `gained` XP, then consume thresholds while the account qualifies.
///
/// Handles multi-level jumps in one call: a large gift can cross several
/// levels at once. At `max_level` the level clamps, thresholds stop being
/// consumed, and remaining XP keeps accumulating.
pub fn apply_experience(policy: &LevelPolicy, xp: Xp, level: Level, gained: Xp) -> Progress {
    let mut xp = xp.saturating_add(gained);
    let mut level = level.min(policy.max_level).max(1);
    let mut leveled_up = false;

    while level < policy.max_level {
        let threshold = required_experience(policy, level);
        if xp < threshold {
            break;
        }
        xp -= threshold;
        level += 1;
        leveled_up = true;
    }

    Progress {
        experience_points: xp,
        level,
        leveled_up,
    }
}

/// Cosmetic tier attached to a level.
///
/// Ordered bands, highest qualifying band wins. Names and css classes
/// match the client's badge theme table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CosmeticTier {
    Base,
    Gold,
    Legendary,
}

impl CosmeticTier {
    pub fn theme_name(&self) -> &'static str {
        match self {
            CosmeticTier::Base => "Rookie Badge",
            CosmeticTier::Gold => "Golden Star",
            CosmeticTier::Legendary => "Legendary God",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            CosmeticTier::Base => "badge-gray",
            CosmeticTier::Gold => "badge-gold",
            CosmeticTier::Legendary => "badge-legendary",
        }
    }
}

/// Map a level to its cosmetic tier.
pub fn theme_for(level: Level) -> CosmeticTier {
    if level >= 150 {
        CosmeticTier::Legendary
    } else if level >= 50 {
        CosmeticTier::Gold
    } else {
        CosmeticTier::Base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_experience_sequence() {
        let policy = LevelPolicy::default();
        assert_eq!(required_experience(&policy, 1), 100);
        assert_eq!(required_experience(&policy, 2), 120);
        assert_eq!(required_experience(&policy, 3), 144);
        assert_eq!(required_experience(&policy, 4), 172);
    }

    #[test]
    fn test_required_experience_level_zero_clamps_to_base() {
        let policy = LevelPolicy::default();
        assert_eq!(required_experience(&policy, 0), 100);
    }

    #[test]
    fn test_required_experience_strictly_increasing() {
        let policy = LevelPolicy::default();
        let mut prev = 0;
        for level in 1..policy.max_level {
            let req = required_experience(&policy, level);
            assert!(req > prev, "threshold not increasing at level {}", level);
            prev = req;
        }
    }

    #[test]
    fn test_multi_level_jump() {
        // 250 XP from level 1: consumes 100 then 120, lands at level 3
        // with 30 XP remaining.
        let policy = LevelPolicy::default();
        let p = apply_experience(&policy, 0, 1, 250);
        assert_eq!(p.level, 3);
        assert_eq!(p.experience_points, 30);
        assert!(p.leveled_up);
    }

    #[test]
    fn test_no_level_up_below_threshold() {
        let policy = LevelPolicy::default();
        let p = apply_experience(&policy, 0, 1, 99);
        assert_eq!(p.level, 1);
        assert_eq!(p.experience_points, 99);
        assert!(!p.leveled_up);
    }

    #[test]
    fn test_level_never_decreases_and_never_exceeds_cap() {
        let policy = LevelPolicy {
            base_xp: 10,
            growth: 1.1,
            max_level: 5,
        };
        let p = apply_experience(&policy, 0, 1, u64::MAX / 2);
        assert_eq!(p.level, 5);

        // At the cap, thresholds stop being consumed but XP accumulates.
        let p2 = apply_experience(&policy, p.experience_points, p.level, 1000);
        assert_eq!(p2.level, 5);
        assert_eq!(p2.experience_points, p.experience_points + 1000);
        assert!(!p2.leveled_up);
    }

    #[test]
    fn test_exact_threshold_levels_up() {
        let policy = LevelPolicy::default();
        let p = apply_experience(&policy, 0, 1, 100);
        assert_eq!(p.level, 2);
        assert_eq!(p.experience_points, 0);
        assert!(p.leveled_up);
    }

    #[test]
    fn test_theme_bands() {
        assert_eq!(theme_for(1), CosmeticTier::Base);
        assert_eq!(theme_for(49), CosmeticTier::Base);
        assert_eq!(theme_for(50), CosmeticTier::Gold);
        assert_eq!(theme_for(149), CosmeticTier::Gold);
        assert_eq!(theme_for(150), CosmeticTier::Legendary);
        assert_eq!(theme_for(200), CosmeticTier::Legendary);
    }

    #[test]
    fn test_theme_strings() {
        assert_eq!(theme_for(150).theme_name(), "Legendary God");
        assert_eq!(theme_for(150).css_class(), "badge-legendary");
        assert_eq!(theme_for(1).css_class(), "badge-gray");
    }
}
