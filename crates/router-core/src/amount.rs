//! Exact fractional amounts and prices
//!
//! All trade sizes, quotes and gas costs are kept as `BigInt` ratios so that
//! splitting a trade and adding gas costs never loses precision.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::errors::AmountError;
use crate::types::Currency;

/// A rational number with a positive denominator
#[derive(Debug, Clone)]
pub struct Fraction {
    numerator: BigInt,
    denominator: BigInt,
}

impl Fraction {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Result<Self, AmountError> {
        let numerator = numerator.into();
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(AmountError::ZeroDenominator);
        }
        if denominator.is_negative() {
            return Ok(Self {
                numerator: -numerator,
                denominator: -denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            numerator: value.into(),
            denominator: BigInt::one(),
        }
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// Floor of numerator / denominator
    pub fn quotient(&self) -> BigInt {
        let q = &self.numerator / &self.denominator;
        // BigInt division truncates toward zero
        if self.numerator.is_negative() && !(&self.numerator % &self.denominator).is_zero() {
            q - 1
        } else {
            q
        }
    }

    pub fn invert(&self) -> Result<Self, AmountError> {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    pub fn add(&self, other: &Fraction) -> Fraction {
        if self.denominator == other.denominator {
            return Fraction {
                numerator: &self.numerator + &other.numerator,
                denominator: self.denominator.clone(),
            };
        }
        Fraction {
            numerator: &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    pub fn subtract(&self, other: &Fraction) -> Fraction {
        if self.denominator == other.denominator {
            return Fraction {
                numerator: &self.numerator - &other.numerator,
                denominator: self.denominator.clone(),
            };
        }
        Fraction {
            numerator: &self.numerator * &other.denominator - &other.numerator * &self.denominator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    pub fn multiply(&self, other: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &other.numerator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    pub fn divide(&self, other: &Fraction) -> Result<Fraction, AmountError> {
        Fraction::new(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        )
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

/// An amount of a currency in raw (decimal-scaled) units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyAmount {
    pub currency: Currency,
    fraction: Fraction,
}

impl CurrencyAmount {
    pub fn from_raw_amount(currency: Currency, raw: impl Into<BigInt>) -> Self {
        Self {
            currency,
            fraction: Fraction::from_integer(raw),
        }
    }

    pub fn from_fractional_amount(
        currency: Currency,
        numerator: impl Into<BigInt>,
        denominator: impl Into<BigInt>,
    ) -> Result<Self, AmountError> {
        Ok(Self {
            currency,
            fraction: Fraction::new(numerator, denominator)?,
        })
    }

    pub fn zero(currency: Currency) -> Self {
        Self::from_raw_amount(currency, BigInt::zero())
    }

    pub fn fraction(&self) -> &Fraction {
        &self.fraction
    }

    pub fn numerator(&self) -> &BigInt {
        self.fraction.numerator()
    }

    pub fn denominator(&self) -> &BigInt {
        self.fraction.denominator()
    }

    /// Raw integer units, rounded down
    pub fn quotient(&self) -> BigInt {
        self.fraction.quotient()
    }

    pub fn is_zero(&self) -> bool {
        self.fraction.is_zero()
    }

    pub fn add(&self, other: &CurrencyAmount) -> Result<CurrencyAmount, AmountError> {
        self.ensure_same_currency(other)?;
        Ok(Self {
            currency: self.currency.clone(),
            fraction: self.fraction.add(&other.fraction),
        })
    }

    pub fn subtract(&self, other: &CurrencyAmount) -> Result<CurrencyAmount, AmountError> {
        self.ensure_same_currency(other)?;
        Ok(Self {
            currency: self.currency.clone(),
            fraction: self.fraction.subtract(&other.fraction),
        })
    }

    /// Scale by a plain ratio (e.g. a split percentage)
    pub fn multiply(&self, ratio: &Fraction) -> CurrencyAmount {
        Self {
            currency: self.currency.clone(),
            fraction: self.fraction.multiply(ratio),
        }
    }

    /// Same amount tagged with another currency of equal raw scale
    pub fn with_currency(&self, currency: Currency) -> CurrencyAmount {
        Self {
            currency,
            fraction: self.fraction.clone(),
        }
    }

    fn ensure_same_currency(&self, other: &CurrencyAmount) -> Result<(), AmountError> {
        if self.currency != other.currency {
            return Err(AmountError::CurrencyMismatch {
                left: self.currency.symbol().to_string(),
                right: other.currency.symbol().to_string(),
            });
        }
        Ok(())
    }
}

impl PartialOrd for CurrencyAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.fraction.cmp(&other.fraction))
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quotient(), self.currency.symbol())
    }
}

/// Price of `base` in units of `quote`, as a raw-unit ratio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub base: Currency,
    pub quote: Currency,
    fraction: Fraction,
}

impl Price {
    /// `quote_amount` raw units of `quote` per `base_amount` raw units of `base`
    pub fn new(
        base: Currency,
        quote: Currency,
        base_amount: impl Into<BigInt>,
        quote_amount: impl Into<BigInt>,
    ) -> Result<Self, AmountError> {
        Ok(Self {
            base,
            quote,
            fraction: Fraction::new(quote_amount, base_amount)?,
        })
    }

    pub fn fraction(&self) -> &Fraction {
        &self.fraction
    }

    pub fn invert(&self) -> Result<Price, AmountError> {
        Ok(Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
            fraction: self.fraction.invert()?,
        })
    }

    /// Convert an amount of the base currency into the quote currency
    pub fn quote(&self, amount: &CurrencyAmount) -> Result<CurrencyAmount, AmountError> {
        if amount.currency.wrapped() != self.base.wrapped() {
            return Err(AmountError::CurrencyMismatch {
                left: self.base.symbol().to_string(),
                right: amount.currency.symbol().to_string(),
            });
        }
        Ok(CurrencyAmount {
            currency: self.quote.clone(),
            fraction: amount.fraction.multiply(&self.fraction),
        })
    }
}
