// crates/chih-ledger/src/fixed.rs
//
// Scaled-integer arithmetic for reward accrual.
//
// Every quantity is a u128 in base units. Accumulator values carry an extra
// factor of SCALE (10^18). Products are formed at 256-bit width so that
// `staked * delta_rpt` cannot overflow before the division, and every
// division truncates toward zero. The pool is therefore never over-paid:
// each division can only lose a fraction of one unit.

use chih_core::ChihError;
use primitive_types::U256;

/// Fixed-point scale of the reward-per-token accumulator and of reward rates.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// `floor(a * b / d)` without intermediate overflow.
///
/// Rounds down. Fails when `d == 0` or the quotient does not fit in u128.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Result<u128, ChihError> {
    if d == 0 {
        return Err(ChihError::ArithmeticOverflow("division by zero".to_string()));
    }

    // (2^128 - 1)^2 < 2^256, so the product itself never overflows.
    let quotient = (U256::from(a) * U256::from(b)) / U256::from(d);
    if quotient > U256::from(u128::MAX) {
        return Err(ChihError::ArithmeticOverflow(format!(
            "{} * {} / {} exceeds u128",
            a, b, d
        )));
    }
    Ok(quotient.as_u128())
}

/// Checked addition reporting which quantity overflowed.
pub fn add(a: u128, b: u128, what: &str) -> Result<u128, ChihError> {
    a.checked_add(b)
        .ok_or_else(|| ChihError::ArithmeticOverflow(format!("{} overflow", what)))
}

/// Checked subtraction reporting which quantity underflowed.
pub fn sub(a: u128, b: u128, what: &str) -> Result<u128, ChihError> {
    a.checked_sub(b)
        .ok_or_else(|| ChihError::ArithmeticOverflow(format!("{} underflow", what)))
}

/// Checked multiplication reporting which quantity overflowed.
pub fn mul(a: u128, b: u128, what: &str) -> Result<u128, ChihError> {
    a.checked_mul(b)
        .ok_or_else(|| ChihError::ArithmeticOverflow(format!("{} overflow", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floor_rounds_down() {
        assert_eq!(mul_div_floor(10, 1, 3).unwrap(), 3);
        assert_eq!(mul_div_floor(2, 5, 3).unwrap(), 3);
        assert_eq!(mul_div_floor(0, 5, 3).unwrap(), 0);
    }

    #[test]
    fn test_mul_div_floor_wide_intermediate() {
        // 1000 tokens * 1.0 rpt / SCALE: the product is 10^39, above u128::MAX.
        let staked = 1_000 * SCALE;
        let rpt = SCALE;
        assert_eq!(mul_div_floor(staked, rpt, SCALE).unwrap(), 1_000 * SCALE);
    }

    #[test]
    fn test_mul_div_floor_extremes() {
        assert_eq!(mul_div_floor(u128::MAX, u128::MAX, u128::MAX).unwrap(), u128::MAX);
        // u128::MAX = 8q + 7, so 7 * u128::MAX / 8 = 7q + 49/8 -> 7q + 6.
        let q = u128::MAX / 8;
        assert_eq!(mul_div_floor(u128::MAX, 7, 8).unwrap(), 7 * q + 6);
    }

    #[test]
    fn test_mul_div_floor_overflow_and_zero_divisor() {
        assert!(mul_div_floor(u128::MAX, 2, 1).is_err());
        assert!(mul_div_floor(1, 1, 0).is_err());
    }

    #[test]
    fn test_checked_helpers() {
        assert_eq!(add(1, 2, "x").unwrap(), 3);
        assert!(add(u128::MAX, 1, "x").is_err());
        assert_eq!(sub(5, 2, "x").unwrap(), 3);
        assert!(sub(2, 5, "x").is_err());
        assert!(mul(u128::MAX, 2, "x").is_err());
    }
}
