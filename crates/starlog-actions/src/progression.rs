//! The triangular level curve.
//!
//! Level `L` is reached once experience meets `base * L * (L - 1) / 2`.
//! With the default base of 10 the thresholds are 10, 30, 60, 100, ...

/// Experience required to reach `level`. Levels at or below one need none.
/// Returns `None` if the threshold does not fit in an `i64`.
pub fn xp_threshold(level: i64, base: i64) -> Option<i64> {
    if level <= 1 {
        return Some(0);
    }
    let prev = level.checked_sub(1)?;
    // Halve the even factor first so the product only overflows when the
    // threshold itself does.
    let steps = if level.checked_rem(2)? == 0 {
        level.checked_div(2)?.checked_mul(prev)?
    } else {
        level.checked_mul(prev.checked_div(2)?)?
    };
    base.checked_mul(steps)
}

/// Levels at or above this have a threshold beyond `i64` at any base.
const LEVEL_CEILING: i64 = 1 << 33;

/// Level corresponding to `xp` on the curve scaled by `base`.
///
/// A base below one is treated as one so the curve stays strictly
/// increasing. Binary search over the level, so the cost is logarithmic in
/// `xp`.
pub fn level_from_xp(xp: i64, base: i64) -> i64 {
    let base = base.max(1);
    let reached = |level: i64| xp_threshold(level, base).is_some_and(|need| xp >= need);

    // reached(lo) holds, reached(hi) does not.
    let mut lo: i64 = 1;
    let mut hi: i64 = LEVEL_CEILING;
    while hi.saturating_sub(lo) > 1 {
        let half = hi.saturating_sub(lo).checked_div(2).unwrap_or(0);
        let mid = lo.saturating_add(half);
        if reached(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_with_default_base() {
        assert_eq!(xp_threshold(1, 10), Some(0));
        assert_eq!(xp_threshold(5, 10), Some(100));
        assert_eq!(xp_threshold(2, 10), Some(10));
        assert_eq!(xp_threshold(3, 10), Some(30));
        assert_eq!(xp_threshold(4, 10), Some(60));
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_from_xp(0, 10), 1);
        assert_eq!(level_from_xp(9, 10), 1);
        assert_eq!(level_from_xp(10, 10), 2);
        assert_eq!(level_from_xp(29, 10), 2);
        assert_eq!(level_from_xp(30, 10), 3);
        assert_eq!(level_from_xp(60, 10), 4);
    }

    #[test]
    fn negative_xp_is_level_one() {
        assert_eq!(level_from_xp(-50, 10), 1);
    }

    #[test]
    fn degenerate_base_terminates() {
        assert_eq!(level_from_xp(1, 0), level_from_xp(1, 1));
        // 1414 * 1413 / 2 = 998_991 <= 1_000_000 < 1415 * 1414 / 2
        assert_eq!(level_from_xp(1_000_000, 1), 1414);
    }

    #[test]
    fn huge_xp_resolves_directly() {
        let xp = i64::MAX / 2;
        let level = level_from_xp(xp, 1);
        assert_eq!(level, 3_037_000_500);
        assert!(xp_threshold(level, 1).unwrap() <= xp);
        assert!(xp_threshold(level + 1, 1).unwrap() > xp);

        let top = level_from_xp(i64::MAX, 1);
        assert_eq!(top, 1 << 32);
        assert!(xp_threshold(top, 1).is_some());
        assert!(xp_threshold(top + 1, 1).is_none());
    }

    #[test]
    fn matches_stepwise_walk_on_small_values() {
        for base in [1, 3, 10] {
            let mut expected = 1;
            for xp in 0..2_000 {
                while xp_threshold(expected + 1, base).unwrap() <= xp {
                    expected += 1;
                }
                assert_eq!(level_from_xp(xp, base), expected, "xp={xp} base={base}");
            }
        }
    }
}
