// crates/chih-ledger/src/token.rs
//
// CHIH token amount type and unit constants.
//
// The smallest unit of CHIH is the "wei" (18 decimals). All internal
// accounting uses wei in u128 to avoid floating-point precision issues.

use serde::{Deserialize, Serialize};

use chih_core::{Amount, ChihError};

/// Number of decimal places in one CHIH.
pub const DECIMALS: u32 = 18;

/// Number of wei in one CHIH. 1 CHIH = 10^18 wei.
pub const WEI_PER_CHIH: Amount = 1_000_000_000_000_000_000;

/// A CHIH token amount.
///
/// Wraps an amount in wei (the smallest denomination). Also used for
/// reward rates, which share the same 18-decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Chih {
    /// Amount in wei (1 CHIH = 10^18 wei).
    pub wei: Amount,
}

impl Chih {
    /// Create an amount from a wei value.
    pub fn from_wei(wei: Amount) -> Self {
        Self { wei }
    }

    /// Parse a decimal string such as `"1000"`, `"0.01"` or `"1.5"`.
    ///
    /// Exact: no floating point is involved. More than 18 fractional digits
    /// is rejected rather than silently rounded.
    pub fn parse(s: &str) -> Result<Self, ChihError> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(ChihError::Serialization(format!("invalid CHIH amount: {:?}", s)));
        }
        if frac.len() > DECIMALS as usize {
            return Err(ChihError::Serialization(format!(
                "CHIH amount {:?} has more than {} decimal places",
                s, DECIMALS
            )));
        }
        let digits_ok = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if !digits_ok(whole) || !digits_ok(frac) {
            return Err(ChihError::Serialization(format!("invalid CHIH amount: {:?}", s)));
        }

        let whole_wei = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<Amount>()
                .ok()
                .and_then(|w| w.checked_mul(WEI_PER_CHIH))
                .ok_or_else(|| ChihError::ArithmeticOverflow(format!("CHIH amount {:?}", s)))?
        };
        let frac_wei = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
            padded
                .parse::<Amount>()
                .map_err(|e| ChihError::Serialization(e.to_string()))?
        };

        whole_wei
            .checked_add(frac_wei)
            .map(Self::from_wei)
            .ok_or_else(|| ChihError::ArithmeticOverflow(format!("CHIH amount {:?}", s)))
    }

    /// Exact decimal rendering without the unit suffix, e.g. `"1.5"`.
    ///
    /// `Chih::parse` accepts this form back without loss.
    pub fn to_decimal_string(&self) -> String {
        let whole = self.wei / WEI_PER_CHIH;
        let frac = self.wei % WEI_PER_CHIH;
        if frac == 0 {
            whole.to_string()
        } else {
            // Up to 18 decimal places, trailing zeros trimmed
            let frac_str = format!("{:018}", frac);
            format!("{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wei_per_chih() {
        assert_eq!(WEI_PER_CHIH, 10u128.pow(DECIMALS));
    }

    #[test]
    fn test_parse_whole_and_fraction() {
        assert_eq!(Chih::parse("1000").unwrap().wei, 1_000 * WEI_PER_CHIH);
        assert_eq!(Chih::parse("0.01").unwrap().wei, WEI_PER_CHIH / 100);
        assert_eq!(Chih::parse("1.5").unwrap().wei, 1_500_000_000_000_000_000);
        assert_eq!(Chih::parse(".5").unwrap().wei, WEI_PER_CHIH / 2);
        assert_eq!(Chih::parse("0.000001").unwrap().wei, 1_000_000_000_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Chih::parse("").is_err());
        assert!(Chih::parse(".").is_err());
        assert!(Chih::parse("-1").is_err());
        assert!(Chih::parse("1e5").is_err());
        assert!(Chih::parse("0.0000000000000000001").is_err());
    }

    #[test]
    fn test_decimal_string_trims_trailing_zeros() {
        assert_eq!(Chih::from_wei(42 * WEI_PER_CHIH).to_decimal_string(), "42");
        assert_eq!(Chih::parse("1.50").unwrap().to_decimal_string(), "1.5");
        assert_eq!(Chih::from_wei(0).to_decimal_string(), "0");
        assert_eq!(Chih::from_wei(1).to_decimal_string(), "0.000000000000000001");
    }

    #[test]
    fn test_decimal_string_parses_back() {
        let amount = Chih::parse("1234.000000000000000567").unwrap();
        assert_eq!(amount.to_decimal_string(), "1234.000000000000000567");
        assert_eq!(Chih::parse(&amount.to_decimal_string()).unwrap(), amount);
    }
}
