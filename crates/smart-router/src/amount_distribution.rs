//! Trade-size splits

use router_core::{CurrencyAmount, Error, Fraction, Result};

/// Split `amount` into `100 / distribution_percent` fractional amounts.
///
/// Returns parallel `(percents, amounts)` where `amounts[i]` is
/// `percents[i] / 100` of the total, kept as an exact fraction.
pub fn get_amount_distribution(
    amount: &CurrencyAmount,
    distribution_percent: u32,
) -> Result<(Vec<u32>, Vec<CurrencyAmount>)> {
    if distribution_percent == 0 || distribution_percent > 100 {
        return Err(Error::Config(format!(
            "distribution percent must be within 1..=100, got {}",
            distribution_percent
        )));
    }

    let splits = 100 / distribution_percent;
    let mut percents = Vec::with_capacity(splits as usize);
    let mut amounts = Vec::with_capacity(splits as usize);

    for i in 1..=splits {
        let percent = i * distribution_percent;
        percents.push(percent);
        amounts.push(amount.multiply(&Fraction::new(percent, 100)?));
    }

    Ok((percents, amounts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use router_core::tokens::known;

    #[test]
    fn test_five_percent_distribution() {
        let amount = CurrencyAmount::from_raw_amount(known::usdc_mainnet().into(), 1_000_000);
        let (percents, amounts) = get_amount_distribution(&amount, 5).unwrap();
        assert_eq!(percents.len(), 20);
        assert_eq!(percents[0], 5);
        assert_eq!(percents[19], 100);
        assert_eq!(amounts[0].quotient(), BigInt::from(50_000));
        assert_eq!(amounts[19], amount);
    }

    #[test]
    fn test_uneven_distribution_stops_below_total() {
        let amount = CurrencyAmount::from_raw_amount(known::usdc_mainnet().into(), 999);
        let (percents, amounts) = get_amount_distribution(&amount, 30).unwrap();
        assert_eq!(percents, vec![30, 60, 90]);
        // 30% of 999 is 299.7, the fraction keeps the remainder
        assert_eq!(amounts[0].quotient(), BigInt::from(299));
        assert_eq!(amounts[0].multiply(&Fraction::from_integer(10)).quotient(), BigInt::from(2997));
    }

    #[test]
    fn test_invalid_percent() {
        let amount = CurrencyAmount::from_raw_amount(known::usdc_mainnet().into(), 1);
        assert!(get_amount_distribution(&amount, 0).is_err());
        assert!(get_amount_distribution(&amount, 101).is_err());
    }
}
