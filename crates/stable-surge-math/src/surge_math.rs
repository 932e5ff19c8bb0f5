//! Surge fee math: measuring how far a balance set deviates from its own
//! median, and deriving the dynamic fee charged while a swap pushes the
//! pool further out of balance.
//!
//! All percentages are WAD fractions: `1e18` is 100%. The imbalance is a
//! dispersion around the median, not the mean; the two differ materially
//! for skewed balance sets and the median is what drives the surge
//! trigger on chain.

use {
    super::{error::Error, fixed_point},
    num::{BigInt, Signed, Zero},
};

/// Fee configuration of a surge-hooked pool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SurgeParams {
    /// Ceiling the dynamic fee ramps towards as imbalance approaches 100%.
    pub max_surge_fee_percentage: BigInt,
    /// Imbalance above which surging can begin.
    pub surge_threshold_percentage: BigInt,
    /// Fee charged whenever the pool is not surging.
    pub static_swap_fee_percentage: BigInt,
}

/// Aggregate deviation of the balances from their median, normalized by
/// the total balance. Zero for an empty pool, at most `WAD` (one token
/// holding everything).
pub fn compute_imbalance(balances: &[BigInt]) -> Result<BigInt, Error> {
    let median = find_median(balances)?;

    let mut total_balance = BigInt::zero();
    let mut total_diff = BigInt::zero();
    for balance in balances {
        total_balance += balance;
        total_diff += (balance - &median).abs();
    }

    if total_balance.is_zero() {
        return Ok(BigInt::zero());
    }
    fixed_point::div_down_fixed(&total_diff, &total_balance)
}

fn find_median(balances: &[BigInt]) -> Result<BigInt, Error> {
    if balances.is_empty() {
        return Err(Error::InvalidToken);
    }
    let mut sorted_balances = balances.to_vec();
    sorted_balances.sort();

    let mid = sorted_balances.len() / 2;
    if sorted_balances.len() % 2 == 0 {
        Ok((&sorted_balances[mid - 1] + &sorted_balances[mid]) / BigInt::from(2))
    } else {
        Ok(sorted_balances[mid].clone())
    }
}

/// Whether a proposed swap leaves the pool surging: its imbalance must be
/// strictly worse than the current one AND strictly above the threshold.
/// An imbalance-improving swap never surges, no matter how imbalanced the
/// result; a perfectly balanced result never surges at all.
pub fn is_surging(
    surge_threshold_percentage: &BigInt,
    current_balances: &[BigInt],
    new_total_imbalance: &BigInt,
) -> Result<bool, Error> {
    if new_total_imbalance.is_zero() {
        return Ok(false);
    }
    let current_imbalance = compute_imbalance(current_balances)?;
    Ok(new_total_imbalance > &current_imbalance
        && new_total_imbalance > surge_threshold_percentage)
}

/// The effective fee percentage for a swap moving the pool from
/// `current_balances` to `proposed_balances`.
///
/// A max surge fee below the static fee disables the surge mechanism
/// entirely. While surging, the fee ramps linearly from the static fee at
/// the threshold to the max surge fee at 100% imbalance:
///
/// ```text
/// fee = static + (max - static) * (imbalance - threshold) / (1 - threshold)
/// ```
pub fn compute_surge_fee_percentage(
    params: &SurgeParams,
    proposed_balances: &[BigInt],
    current_balances: &[BigInt],
) -> Result<BigInt, Error> {
    if params.max_surge_fee_percentage < params.static_swap_fee_percentage {
        return Ok(params.static_swap_fee_percentage.clone());
    }

    let new_total_imbalance = compute_imbalance(proposed_balances)?;
    if !is_surging(
        &params.surge_threshold_percentage,
        current_balances,
        &new_total_imbalance,
    )? {
        return Ok(params.static_swap_fee_percentage.clone());
    }

    let fee_difference =
        &params.max_surge_fee_percentage - &params.static_swap_fee_percentage;
    let imbalance_excess = &new_total_imbalance - &params.surge_threshold_percentage;
    let threshold_complement =
        fixed_point::complement_fixed(&params.surge_threshold_percentage);

    let surge_multiplier =
        fixed_point::div_down_fixed(&imbalance_excess, &threshold_complement)?;
    let dynamic_fee_increase = fixed_point::mul_down_fixed(&fee_difference, &surge_multiplier);

    Ok(&params.static_swap_fee_percentage + dynamic_fee_increase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(units: u64) -> BigInt {
        BigInt::from(units) * BigInt::from(1_000_000_000_000_000_000_u64)
    }

    /// `percent / 100` as a WAD fraction, e.g. `pct(20)` is 20%.
    fn pct(percent: u64) -> BigInt {
        BigInt::from(percent) * BigInt::from(10_000_000_000_000_000_u64)
    }

    fn params() -> SurgeParams {
        SurgeParams {
            max_surge_fee_percentage: pct(10),
            surge_threshold_percentage: pct(20),
            static_swap_fee_percentage: pct(1),
        }
    }

    #[test]
    fn test_imbalance_equal_balances() {
        assert_eq!(
            compute_imbalance(&[wad(1000), wad(1000)]).unwrap(),
            BigInt::from(0)
        );
        assert_eq!(
            compute_imbalance(&[wad(500), wad(500), wad(500)]).unwrap(),
            BigInt::from(0)
        );
    }

    #[test]
    fn test_imbalance_skewed_pair() {
        // Median 1000, deviations 900 + 900 over a total of 2000: 90%.
        assert_eq!(compute_imbalance(&[wad(1900), wad(100)]).unwrap(), pct(90));
        // Order must not matter.
        assert_eq!(compute_imbalance(&[wad(100), wad(1900)]).unwrap(), pct(90));
    }

    #[test]
    fn test_imbalance_mild_pair() {
        // Median 1000, deviations 50 + 50 over 2000: 5%.
        assert_eq!(compute_imbalance(&[wad(1050), wad(950)]).unwrap(), pct(5));
    }

    #[test]
    fn test_imbalance_odd_count_uses_middle_element() {
        // Median is 300 (middle element, not the mean of 400); deviations
        // 200 + 0 + 600 over a total of 1300.
        let imbalance = compute_imbalance(&[wad(100), wad(300), wad(900)]).unwrap();
        let expected = fixed_point::div_down_fixed(&wad(800), &wad(1300)).unwrap();
        assert_eq!(imbalance, expected);
    }

    #[test]
    fn test_imbalance_bounds() {
        // One token holding everything is the worst case: exactly 100%.
        assert_eq!(
            compute_imbalance(&[wad(2000), BigInt::from(0)]).unwrap(),
            pct(100)
        );
        // An empty pool is treated as balanced.
        assert_eq!(
            compute_imbalance(&[BigInt::from(0), BigInt::from(0)]).unwrap(),
            BigInt::from(0)
        );
    }

    #[test]
    fn test_imbalance_empty_set() {
        assert_eq!(compute_imbalance(&[]).unwrap_err(), Error::InvalidToken);
    }

    #[test]
    fn test_is_surging_requires_both_conditions() {
        let current = [wad(1000), wad(1000)];

        // Worsening and above threshold.
        assert!(is_surging(&pct(20), &current, &pct(90)).unwrap());
        // Worsening but below threshold.
        assert!(!is_surging(&pct(20), &current, &pct(5)).unwrap());
        // Exactly at threshold is not above it.
        assert!(!is_surging(&pct(20), &current, &pct(20)).unwrap());
        // A balanced result never surges.
        assert!(!is_surging(&pct(0), &current, &BigInt::from(0)).unwrap());
    }

    #[test]
    fn test_is_surging_improving_swap_never_surges() {
        // Current imbalance 90%; a proposal at 50% is above threshold but
        // improves the pool.
        let current = [wad(1900), wad(100)];
        assert!(!is_surging(&pct(20), &current, &pct(50)).unwrap());
        // Unchanged imbalance does not surge either: strictly worse only.
        assert!(!is_surging(&pct(20), &current, &pct(90)).unwrap());
        // Worsening from an already imbalanced state does.
        assert!(is_surging(&pct(20), &current, &pct(95)).unwrap());
    }

    #[test]
    fn test_surge_fee_below_threshold_is_static() {
        let fee = compute_surge_fee_percentage(
            &params(),
            &[wad(1050), wad(950)],
            &[wad(1000), wad(1000)],
        )
        .unwrap();
        assert_eq!(fee, pct(1));
    }

    #[test]
    fn test_surge_fee_interpolates_above_threshold() {
        // Proposed imbalance 90%: fee = 1% + 9% * (90% - 20%) / (100% - 20%)
        //                             = 1% + 9% * 0.875 = 8.875%.
        let fee = compute_surge_fee_percentage(
            &params(),
            &[wad(1900), wad(100)],
            &[wad(1000), wad(1000)],
        )
        .unwrap();
        assert_eq!(fee, BigInt::from(88_750_000_000_000_000_u64));
    }

    #[test]
    fn test_surge_fee_monotone_in_imbalance() {
        let current = [wad(1000), wad(1000)];
        let proposals: [&[BigInt]; 3] = [
            &[wad(1300), wad(700)],
            &[wad(1500), wad(500)],
            &[wad(1900), wad(100)],
        ];

        let mut last_fee = BigInt::from(0);
        for proposed in proposals {
            let fee = compute_surge_fee_percentage(&params(), proposed, &current).unwrap();
            assert!(fee >= last_fee);
            assert!(fee >= pct(1));
            assert!(fee <= pct(10));
            last_fee = fee;
        }
    }

    #[test]
    fn test_surge_fee_improving_swap_is_static() {
        // From 90% imbalance down to 30%: above threshold, but improving.
        let fee = compute_surge_fee_percentage(
            &params(),
            &[wad(1300), wad(700)],
            &[wad(1900), wad(100)],
        )
        .unwrap();
        assert_eq!(fee, pct(1));
    }

    #[test]
    fn test_surge_fee_disabled_by_configuration() {
        // Max surge fee below the static fee disables surging regardless of
        // how imbalanced the proposal is.
        let params = SurgeParams {
            max_surge_fee_percentage: pct(0),
            surge_threshold_percentage: pct(20),
            static_swap_fee_percentage: pct(1),
        };
        let fee = compute_surge_fee_percentage(
            &params,
            &[wad(1999), wad(1)],
            &[wad(1000), wad(1000)],
        )
        .unwrap();
        assert_eq!(fee, pct(1));
    }

    #[test]
    fn test_surge_fee_at_full_imbalance_reaches_max() {
        // 100% imbalance maps to the top of the ramp: exactly the max fee.
        let fee = compute_surge_fee_percentage(
            &params(),
            &[wad(2000), BigInt::from(0)],
            &[wad(1000), wad(1000)],
        )
        .unwrap();
        assert_eq!(fee, pct(10));
    }
}
