//! Fee tiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::state::V3Error;

/// Supported pool fee tiers, in hundredths of a basis point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeeAmount {
    Lowest,
    Low,
    Medium,
    High,
}

impl FeeAmount {
    /// Every tier, highest fee first
    pub const ALL: [FeeAmount; 4] = [
        FeeAmount::High,
        FeeAmount::Medium,
        FeeAmount::Low,
        FeeAmount::Lowest,
    ];

    pub fn fee(&self) -> u32 {
        match self {
            Self::Lowest => 100,
            Self::Low => 500,
            Self::Medium => 3000,
            Self::High => 10000,
        }
    }

    pub fn tick_spacing(&self) -> i32 {
        match self {
            Self::Lowest => 1,
            Self::Low => 10,
            Self::Medium => 60,
            Self::High => 200,
        }
    }

    pub fn from_fee(fee: u32) -> Result<Self, V3Error> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.fee() == fee)
            .ok_or_else(|| V3Error::UnsupportedFeeTier(fee.to_string()))
    }
}

impl FromStr for FeeAmount {
    type Err = V3Error;

    /// Parse a discovery-provider fee tier such as `"3000"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fee: u32 = s
            .trim()
            .parse()
            .map_err(|_| V3Error::UnsupportedFeeTier(s.to_string()))?;
        Self::from_fee(fee)
    }
}

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fee())
    }
}
