use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many items an order contained, as used by the bundle-effect breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PurchaseType {
    #[serde(rename = "Single Item")]
    SingleItem,
    #[serde(rename = "Bundle (2+ Items)")]
    Bundle,
}

impl PurchaseType {
    /// Exactly one item is a single-item purchase. Every other count, including
    /// zero or negative values, falls into the bundle class.
    pub fn from_items(items_purchased: i64) -> Self {
        if items_purchased == 1 {
            PurchaseType::SingleItem
        } else {
            PurchaseType::Bundle
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PurchaseType::SingleItem => "Single Item",
            PurchaseType::Bundle => "Bundle (2+ Items)",
        }
    }
}

impl fmt::Display for PurchaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Refund-risk classification of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskTier {
    /// Refund rates strictly above this percentage are high risk.
    pub const HIGH_THRESHOLD_PCT: Decimal = Decimal::from_parts(6, 0, 0, false, 0);
    /// Refund rates strictly above this percentage (and not high) are medium risk.
    pub const MEDIUM_THRESHOLD_PCT: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

    /// Classifies a refund rate given in percent.
    ///
    /// The upper bound of each tier is inclusive: exactly 6% is `Medium`,
    /// exactly 4% is `Low`.
    pub fn classify(refund_rate_pct: Decimal) -> Self {
        if refund_rate_pct > Self::HIGH_THRESHOLD_PCT {
            RiskTier::High
        } else if refund_rate_pct > Self::MEDIUM_THRESHOLD_PCT {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn purchase_type_only_exactly_one_item_is_single() {
        assert_eq!(PurchaseType::from_items(1), PurchaseType::SingleItem);
        assert_eq!(PurchaseType::from_items(2), PurchaseType::Bundle);
        assert_eq!(PurchaseType::from_items(4), PurchaseType::Bundle);
        assert_eq!(PurchaseType::from_items(0), PurchaseType::Bundle);
        assert_eq!(PurchaseType::from_items(-1), PurchaseType::Bundle);
    }

    #[test]
    fn risk_tier_boundaries_are_inclusive_on_the_upper_side() {
        assert_eq!(RiskTier::classify(dec!(0)), RiskTier::Low);
        assert_eq!(RiskTier::classify(dec!(4)), RiskTier::Low);
        assert_eq!(RiskTier::classify(dec!(4.0001)), RiskTier::Medium);
        assert_eq!(RiskTier::classify(dec!(6)), RiskTier::Medium);
        assert_eq!(RiskTier::classify(dec!(6.00)), RiskTier::Medium);
        assert_eq!(RiskTier::classify(dec!(6.01)), RiskTier::High);
        assert_eq!(RiskTier::classify(dec!(100)), RiskTier::High);
    }

    #[test]
    fn labels_match_report_wording() {
        assert_eq!(RiskTier::High.to_string(), "High Risk");
        assert_eq!(PurchaseType::Bundle.to_string(), "Bundle (2+ Items)");
    }
}
