//! Swap previews against a surge-hooked stable pool.
//!
//! The vault evaluates the dynamic fee against the balances the swap
//! *would* produce: first a fee-free preview determines the proposed
//! balance set, then the surge fee derived from it is applied to the
//! actual amounts. For exact-in swaps the fee is taken from the input
//! before the pool math runs; for exact-out swaps the computed input is
//! grossed up by the fee complement.

use {
    super::{
        error::Error,
        fixed_point,
        stable_math::{self, AmplificationParameter},
        surge_math::{self, SurgeParams},
    },
    num::{BigInt, Signed},
};

/// A surge-hooked stable pool, balances in WAD scale.
#[derive(Clone, Debug)]
pub struct StableSurgePool {
    pub amplification_parameter: AmplificationParameter,
    pub balances: Vec<BigInt>,
    pub surge: SurgeParams,
}

/// Outcome of a swap preview.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapResult {
    /// Amount out for exact-in swaps, amount in for exact-out swaps.
    pub amount_calculated: BigInt,
    /// The fee percentage that was applied, static or surged.
    pub effective_swap_fee: BigInt,
}

impl StableSurgePool {
    /// Previews swapping an exact `token_amount_in` of the in-token for the
    /// out-token, fees included.
    pub fn swap_exact_in(
        &self,
        token_index_in: usize,
        token_index_out: usize,
        token_amount_in: &BigInt,
    ) -> Result<SwapResult, Error> {
        let preview_amount_out = stable_math::calc_out_given_in(
            &self.amplification_parameter,
            &self.balances,
            token_index_in,
            token_index_out,
            token_amount_in,
        )?;

        let proposed_balances =
            self.proposed_balances(token_index_in, token_index_out, token_amount_in, &preview_amount_out);
        let effective_swap_fee =
            surge_math::compute_surge_fee_percentage(&self.surge, &proposed_balances, &self.balances)?;

        // The fee is taken from the input before the pool math runs,
        // rounding the fee amount up.
        let fee_amount = fixed_point::mul_up_fixed(token_amount_in, &effective_swap_fee);
        let amount_in_after_fee = token_amount_in - &fee_amount;
        if amount_in_after_fee.is_negative() {
            return Err(Error::SubOverflow);
        }

        let amount_calculated = stable_math::calc_out_given_in(
            &self.amplification_parameter,
            &self.balances,
            token_index_in,
            token_index_out,
            &amount_in_after_fee,
        )?;

        tracing::trace!(
            %token_amount_in,
            %amount_calculated,
            %effective_swap_fee,
            "stable surge swap exact in"
        );
        Ok(SwapResult {
            amount_calculated,
            effective_swap_fee,
        })
    }

    /// Previews the in-amount needed to receive an exact `token_amount_out`
    /// of the out-token, fees included.
    pub fn swap_exact_out(
        &self,
        token_index_in: usize,
        token_index_out: usize,
        token_amount_out: &BigInt,
    ) -> Result<SwapResult, Error> {
        let amount_in_before_fee = stable_math::calc_in_given_out(
            &self.amplification_parameter,
            &self.balances,
            token_index_in,
            token_index_out,
            token_amount_out,
        )?;

        let proposed_balances =
            self.proposed_balances(token_index_in, token_index_out, &amount_in_before_fee, token_amount_out);
        let effective_swap_fee =
            surge_math::compute_surge_fee_percentage(&self.surge, &proposed_balances, &self.balances)?;

        // Gross the input up so that input minus fee covers the swap,
        // rounding against the trader.
        let fee_complement = fixed_point::complement_fixed(&effective_swap_fee);
        let amount_calculated = fixed_point::div_up_fixed(&amount_in_before_fee, &fee_complement)?;

        tracing::trace!(
            %token_amount_out,
            %amount_calculated,
            %effective_swap_fee,
            "stable surge swap exact out"
        );
        Ok(SwapResult {
            amount_calculated,
            effective_swap_fee,
        })
    }

    fn proposed_balances(
        &self,
        token_index_in: usize,
        token_index_out: usize,
        amount_in: &BigInt,
        amount_out: &BigInt,
    ) -> Vec<BigInt> {
        let mut balances = self.balances.clone();
        balances[token_index_in] = &balances[token_index_in] + amount_in;
        balances[token_index_out] = &balances[token_index_out] - amount_out;
        balances
    }
}
