//! V2 Calculator
//!
//! Swap math using constant product formula (x * y = k).

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::constants::fees::{FEE_DENOM, FEE_NUM};

/// Calculate swap output using constant product formula
///
/// Formula: output = (reserves_out * input * fee_num) / (reserves_in * fee_denom + input * fee_num)
///
/// Returns zero when any operand is non-positive.
pub fn calculate_output(reserves_in: &BigInt, reserves_out: &BigInt, input_amount: &BigInt) -> BigInt {
    if !reserves_in.is_positive() || !reserves_out.is_positive() || !input_amount.is_positive() {
        return BigInt::zero();
    }

    let input_with_fee = input_amount * BigInt::from(FEE_NUM);
    let numerator = &input_with_fee * reserves_out;
    let denominator = reserves_in * BigInt::from(FEE_DENOM) + &input_with_fee;

    numerator / denominator
}

/// Calculate required input for desired output (reverse calculation)
///
/// Formula: input = (reserves_in * output * fee_denom) / ((reserves_out - output) * fee_num) + 1
pub fn calculate_input(
    reserves_in: &BigInt,
    reserves_out: &BigInt,
    output_amount: &BigInt,
) -> Option<BigInt> {
    if !reserves_in.is_positive() || !reserves_out.is_positive() || !output_amount.is_positive() {
        return None;
    }
    if output_amount >= reserves_out {
        return None; // Can't take more than reserves
    }

    let numerator = reserves_in * output_amount * BigInt::from(FEE_DENOM);
    let denominator = (reserves_out - output_amount) * BigInt::from(FEE_NUM);

    Some(numerator / denominator + 1) // Round up
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn test_calculate_output_basic() {
        // 1000 in, 1_000_000 / 1_000_000 reserves
        let out = calculate_output(&big(1_000_000), &big(1_000_000), &big(1000));
        // 1000 * 997 * 1e6 / (1e6 * 1000 + 997000) = 996
        assert_eq!(out, big(996));
    }

    #[test]
    fn test_calculate_output_zero_reserves() {
        assert!(calculate_output(&big(0), &big(1000), &big(10)).is_zero());
        assert!(calculate_output(&big(1000), &big(1000), &big(0)).is_zero());
    }

    #[test]
    fn test_calculate_input_round_trip() {
        let reserves_in = big(5_000_000);
        let reserves_out = big(2_000_000);
        let input = calculate_input(&reserves_in, &reserves_out, &big(10_000)).unwrap();
        let output = calculate_output(&reserves_in, &reserves_out, &input);
        assert!(output >= big(10_000));
    }

    #[test]
    fn test_calculate_input_exceeds_reserves() {
        assert!(calculate_input(&big(1000), &big(1000), &big(1000)).is_none());
        assert!(calculate_input(&big(1000), &big(1000), &big(5000)).is_none());
    }
}
