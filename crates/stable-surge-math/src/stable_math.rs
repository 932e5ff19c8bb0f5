//! Stable-swap invariant math: solving the constant-invariant `D` of an
//! amplified multi-asset pool by bounded fixed-point iteration, and the
//! closed-form (quadratic) solution for a single balance given `D` and all
//! other balances.
//!
//! The iteration count, update formula and algebraic ordering of the
//! analytical step are kept exactly as the pool contracts evaluate them,
//! since intermediate rounding direction affects results at the margins.

use {
    super::{error::Error, fixed_point},
    anyhow::{Result, ensure},
    num::{BigInt, Signed, Zero},
};

/// Upper bound on invariant solver iterations. The solver silently returns
/// the last iterate when the tolerance is not met within this bound.
pub const MAX_INVARIANT_ITERATIONS: usize = 255;

/// Amplification coefficient of a stable pool, stored as the rational
/// `factor / precision` so that non-integral coefficients are exactly
/// representable (e.g. factor `100_500` with precision `1_000` is 100.5).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AmplificationParameter {
    factor: BigInt,
    precision: BigInt,
}

impl AmplificationParameter {
    pub fn try_new(factor: BigInt, precision: BigInt) -> Result<Self> {
        ensure!(factor.is_positive(), "amplification factor must be positive");
        ensure!(
            precision.is_positive(),
            "amplification precision must be positive"
        );
        Ok(Self { factor, precision })
    }

    pub fn factor(&self) -> &BigInt {
        &self.factor
    }

    pub fn precision(&self) -> &BigInt {
        &self.precision
    }
}

/// Computes the invariant `D` from the token balances and the amplification
/// coefficient.
///
/// Starting from `D = sum(balances)`, iterates
///
/// ```text
/// P_D = n * balances[0], then for each further balance b:
///       P_D = P_D * b * n / D
/// D'  = (n*D^2 + A*n^n * sum * P_D) / ((n+1)*D + (A*n^n - 1) * P_D)
/// ```
///
/// with the rational amplification cleared against its precision, stopping
/// once two consecutive iterates differ by at most one wei. A pool with
/// all balances zero has invariant zero; a single zero balance zeroes the
/// `P_D` fold and the iteration decays towards zero, where it stops.
pub fn compute_invariant(
    amp: &AmplificationParameter,
    balances: &[BigInt],
) -> Result<BigInt, Error> {
    if balances.len() < 2 {
        return Err(Error::InvalidToken);
    }

    let sum: BigInt = balances.iter().sum();
    if sum.is_zero() {
        return Ok(sum);
    }

    let num_tokens = BigInt::from(balances.len());
    let n_pow_n = num_tokens.pow(balances.len() as u32);
    let amp_times_n_pow_n = amp.factor() * &n_pow_n;
    let num_tokens_plus_one = &num_tokens + 1;

    let mut invariant = sum.clone();
    for _ in 0..MAX_INVARIANT_ITERATIONS {
        // The fold uses the previous iterate's D throughout.
        let mut p_d = &num_tokens * &balances[0];
        for balance in &balances[1..] {
            p_d = p_d * balance * &num_tokens / &invariant;
        }

        let previous_invariant = invariant.clone();
        invariant = (&num_tokens * &invariant * &invariant * amp.precision()
            + &amp_times_n_pow_n * &sum * &p_d)
            / (&num_tokens_plus_one * &invariant * amp.precision()
                + (&amp_times_n_pow_n - amp.precision()) * &p_d);

        if (&invariant - &previous_invariant).abs() <= BigInt::from(1) {
            break;
        }
        // A zero balance zeroes the P_D fold and drags D itself to zero;
        // the next fold would then divide by it.
        if invariant.is_zero() {
            break;
        }
    }

    Ok(invariant)
}

/// Recovers the balance at `token_index` from the invariant and all other
/// balances. Inverse of [`compute_invariant`] in one coordinate; the
/// solution is analytical, no iteration involved.
///
/// A known balance of exactly zero is a domain precondition violation and
/// yields [`Error::ZeroDivision`].
pub fn compute_balance(
    amp: &AmplificationParameter,
    balances: &[BigInt],
    invariant: &BigInt,
    token_index: usize,
) -> Result<BigInt, Error> {
    if balances.len() < 2 || token_index >= balances.len() {
        return Err(Error::InvalidToken);
    }

    let num_tokens = BigInt::from(balances.len());
    let n_pow_n = num_tokens.pow(balances.len() as u32);
    let amp_times_n_pow_n = amp.factor() * &n_pow_n;

    let mut sum = BigInt::zero();
    let mut p = invariant.clone();
    for (index, balance) in balances.iter().enumerate() {
        if index == token_index {
            continue;
        }
        if balance.is_zero() {
            return Err(Error::ZeroDivision);
        }
        sum += balance;
        p = p * invariant / balance;
    }

    solve_analytical_balance(
        &sum,
        &p,
        invariant,
        &amp_times_n_pow_n,
        &n_pow_n,
        amp.precision(),
    )
}

/// The quadratic step: with `b = sum + D/(A*n^n)` and `p` rescaled by
/// `D/(A*n^(2n))`, the unknown balance is the positive root
/// `((D - b) + sqrt((D - b)^2 + 4p)) / 2`.
fn solve_analytical_balance(
    sum: &BigInt,
    p: &BigInt,
    invariant: &BigInt,
    amp_times_n_pow_n: &BigInt,
    n_pow_n: &BigInt,
    precision: &BigInt,
) -> Result<BigInt, Error> {
    let p = p * invariant * precision / (amp_times_n_pow_n * n_pow_n);
    let b = sum + invariant * precision / amp_times_n_pow_n;

    let d_minus_b = invariant - &b;
    let radicand = &d_minus_b * &d_minus_b + BigInt::from(4) * &p;
    let c = &d_minus_b + fixed_point::sqrt(&radicand)?;
    Ok(c / BigInt::from(2))
}

/// Computes the amount of the out-token received for an exact in-amount,
/// before fees: the invariant is held constant while the in-balance grows
/// by `token_amount_in` and the out-balance is re-solved.
pub fn calc_out_given_in(
    amp: &AmplificationParameter,
    balances: &[BigInt],
    token_index_in: usize,
    token_index_out: usize,
    token_amount_in: &BigInt,
) -> Result<BigInt, Error> {
    check_token_indices(balances, token_index_in, token_index_out)?;

    let invariant = compute_invariant(amp, balances)?;

    let mut new_balances = balances.to_vec();
    new_balances[token_index_in] = &new_balances[token_index_in] + token_amount_in;

    let final_balance_out = compute_balance(amp, &new_balances, &invariant, token_index_out)?;
    let amount_out = &balances[token_index_out] - &final_balance_out;
    if amount_out.is_negative() {
        return Err(Error::SubOverflow);
    }
    Ok(amount_out)
}

/// Computes the amount of the in-token needed for an exact out-amount,
/// before fees. Draining the out-balance entirely is out of bounds.
pub fn calc_in_given_out(
    amp: &AmplificationParameter,
    balances: &[BigInt],
    token_index_in: usize,
    token_index_out: usize,
    token_amount_out: &BigInt,
) -> Result<BigInt, Error> {
    check_token_indices(balances, token_index_in, token_index_out)?;

    if token_amount_out > &balances[token_index_out] {
        return Err(Error::XOutOfBounds);
    }

    let invariant = compute_invariant(amp, balances)?;

    let mut new_balances = balances.to_vec();
    new_balances[token_index_out] = &new_balances[token_index_out] - token_amount_out;

    let final_balance_in = compute_balance(amp, &new_balances, &invariant, token_index_in)?;
    let amount_in = final_balance_in - &balances[token_index_in];
    if amount_in.is_negative() {
        return Err(Error::SubOverflow);
    }
    Ok(amount_in)
}

fn check_token_indices(
    balances: &[BigInt],
    token_index_in: usize,
    token_index_out: usize,
) -> Result<(), Error> {
    if token_index_in == token_index_out
        || token_index_in >= balances.len()
        || token_index_out >= balances.len()
    {
        return Err(Error::InvalidToken);
    }
    Ok(())
}
