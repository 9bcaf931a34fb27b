//! Allowance risk classification
//!
//! Buckets an unscaled ERC-20 allowance against `10^decimals` (one token)
//! and `1000 * 10^decimals`. Comparisons stay on the raw integer so no
//! precision is lost to floating point.

use alloy_primitives::U256;

/// Risk buckets, ordered from least to most spending authority.
/// `Unknown` is reserved for "allowance not available".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskBucket {
    Unknown,
    Safe,
    Low,
    Caution,
    High,
}

impl RiskBucket {
    /// Fixed user-facing label for the bucket.
    pub fn label(&self) -> &'static str {
        match self {
            RiskBucket::Unknown => "알 수 없음",
            RiskBucket::Safe => "안전 (0, 권한 없음)",
            RiskBucket::Low => "낮은 위험 (1 토큰 미만)",
            RiskBucket::Caution => "주의 (1 ~ 1,000 토큰)",
            RiskBucket::High => "고위험 (1,000 토큰 이상)",
        }
    }
}

/// Classify an allowance amount. `None` means the value could not be read.
pub fn classify(amount: Option<U256>, decimals: u8) -> RiskBucket {
    let Some(amount) = amount else {
        return RiskBucket::Unknown;
    };

    if amount.is_zero() {
        return RiskBucket::Safe;
    }

    let unit = U256::from(10u64).pow(U256::from(decimals));
    let thousand_units = unit.saturating_mul(U256::from(1000u64));

    if amount < unit {
        RiskBucket::Low
    } else if amount < thousand_units {
        RiskBucket::Caution
    } else {
        RiskBucket::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: u64, decimals: u8) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(decimals))
    }

    #[test]
    fn absent_amount_is_unknown() {
        assert_eq!(classify(None, 18), RiskBucket::Unknown);
        assert_eq!(classify(None, 0), RiskBucket::Unknown);
    }

    #[test]
    fn zero_is_safe() {
        assert_eq!(classify(Some(U256::ZERO), 18), RiskBucket::Safe);
        assert!(RiskBucket::Safe.label().contains("안전"));
    }

    #[test]
    fn thresholds_partition_without_gaps() {
        let unit = tokens(1, 18);
        let thousand = tokens(1000, 18);

        // (0, unit) -> Low, boundaries closed/open
        assert_eq!(classify(Some(U256::from(1u64)), 18), RiskBucket::Low);
        assert_eq!(classify(Some(unit - U256::from(1u64)), 18), RiskBucket::Low);

        // [unit, thousand) -> Caution
        assert_eq!(classify(Some(unit), 18), RiskBucket::Caution);
        assert_eq!(classify(Some(tokens(500, 18)), 18), RiskBucket::Caution);
        assert_eq!(
            classify(Some(thousand - U256::from(1u64)), 18),
            RiskBucket::Caution
        );

        // [thousand, inf) -> High
        assert_eq!(classify(Some(thousand), 18), RiskBucket::High);
        assert_eq!(classify(Some(tokens(5000, 18)), 18), RiskBucket::High);
    }

    #[test]
    fn classification_is_monotonic() {
        let samples = [
            U256::from(1u64),
            tokens(1, 18) - U256::from(1u64),
            tokens(1, 18),
            tokens(999, 18),
            tokens(1000, 18),
            tokens(1_000_000, 18),
        ];
        for pair in samples.windows(2) {
            let lo = classify(Some(pair[0]), 18);
            let hi = classify(Some(pair[1]), 18);
            assert!(lo <= hi, "{lo:?} > {hi:?} for {} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn zero_decimals_uses_whole_numbers() {
        assert_eq!(classify(Some(U256::from(999u64)), 0), RiskBucket::Caution);
        assert_eq!(classify(Some(U256::from(1000u64)), 0), RiskBucket::High);
    }
}
