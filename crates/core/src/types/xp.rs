//! Experience point leveling.

/// XP required to advance one level.
const XP_PER_LEVEL: i32 = 100;

/// Compute the level for an XP total.
///
/// Level is a pure function of XP: `xp / 100 + 1`. Every site that mutates
/// XP recomputes the level through this function; the stored level is never
/// adjusted independently.
///
/// ```
/// use farmstellar_core::level_for_xp;
///
/// assert_eq!(level_for_xp(0), 1);
/// assert_eq!(level_for_xp(99), 1);
/// assert_eq!(level_for_xp(100), 2);
/// assert_eq!(level_for_xp(105), 2);
/// assert_eq!(level_for_xp(350), 4);
/// ```
#[must_use]
pub const fn level_for_xp(xp: i32) -> i32 {
    xp / XP_PER_LEVEL + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(1), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(199), 2);
        assert_eq!(level_for_xp(200), 3);
    }

    #[test]
    fn test_level_after_award() {
        // user at 95 xp completing a 10-xp quest crosses into level 2
        let before = level_for_xp(95);
        let after = level_for_xp(95 + 10);
        assert_eq!(before, 1);
        assert_eq!(after, 2);
        assert!(after > before);
    }
}
