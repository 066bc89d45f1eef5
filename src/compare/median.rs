//! Median distance by partial selection.
//!
//! Runs over every distance, sentinels included: they order above all step
//! counts and simply land at the top. For even lengths the two middle values
//! are averaged without forming their sum, since f64 step counts can use all
//! 64 bits.

use crate::model::{Distance, FloatLayout};

/// Overflow-free `(x + y) / 2`, rounding down.
#[inline]
pub fn midpoint(x: u64, y: u64) -> u64 {
    x / 2 + y / 2 + (x % 2 + y % 2) / 2
}

/// Median of `distances`, reordering the slice in place.
///
/// Returns `None` for an empty slice. When the two middle values of an
/// even-length slice differ and one is a sentinel, the sentinel takes part
/// as the width's maximum step count.
pub fn median_distance(distances: &mut [Distance], layout: FloatLayout) -> Option<Distance> {
    if distances.is_empty() {
        return None;
    }
    let len = distances.len();
    let (lower_half, &mut upper, _) = distances.select_nth_unstable(len / 2);

    if len % 2 == 1 {
        return Some(upper);
    }

    let lower = lower_half.iter().copied().max()?;
    if lower == upper {
        return Some(upper);
    }
    Some(Distance::Steps(midpoint(
        lower.saturating_steps(layout),
        upper.saturating_steps(layout),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{F32_LAYOUT, F64_LAYOUT};

    fn steps(v: &[u64]) -> Vec<Distance> {
        v.iter().map(|&n| Distance::Steps(n)).collect()
    }

    #[test]
    fn empty_has_no_median() {
        assert_eq!(median_distance(&mut [], F32_LAYOUT), None);
    }

    #[test]
    fn odd_length_picks_middle() {
        let mut d = steps(&[9, 1, 5]);
        assert_eq!(median_distance(&mut d, F32_LAYOUT), Some(Distance::Steps(5)));
    }

    #[test]
    fn even_length_averages_middle_pair() {
        let mut d = steps(&[8, 2, 6, 4]);
        assert_eq!(median_distance(&mut d, F32_LAYOUT), Some(Distance::Steps(5)));
    }

    #[test]
    fn even_average_rounds_down() {
        let mut d = steps(&[3, 4]);
        assert_eq!(median_distance(&mut d, F32_LAYOUT), Some(Distance::Steps(3)));
    }

    #[test]
    fn midpoint_does_not_overflow() {
        assert_eq!(midpoint(u64::MAX, u64::MAX), u64::MAX);
        assert_eq!(midpoint(u64::MAX, u64::MAX - 1), u64::MAX - 1);
        assert_eq!(midpoint(u64::MAX, 1), 1u64 << 63);
    }

    #[test]
    fn sentinels_sort_to_the_top() {
        let mut d = vec![
            Distance::BelowMinSignal,
            Distance::Steps(1),
            Distance::NonFiniteMismatch,
        ];
        assert_eq!(
            median_distance(&mut d, F32_LAYOUT),
            Some(Distance::NonFiniteMismatch)
        );
    }

    #[test]
    fn equal_sentinel_pair_stays_a_sentinel() {
        let mut d = vec![Distance::BelowMinSignal; 4];
        assert_eq!(
            median_distance(&mut d, F64_LAYOUT),
            Some(Distance::BelowMinSignal)
        );
    }

    #[test]
    fn mixed_pair_saturates_sentinel() {
        let mut d = vec![Distance::Steps(2), Distance::BelowMinSignal];
        let max = F32_LAYOUT.max_steps();
        assert_eq!(
            median_distance(&mut d, F32_LAYOUT),
            Some(Distance::Steps(midpoint(2, max)))
        );
    }
}
