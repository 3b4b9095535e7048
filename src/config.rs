//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the bank pays creditors once peer netting is done and the pool of
/// bank advances is smaller than what is still owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortfallPolicy {
    /// Never pay out more than the pool holds. A creditor paid in part keeps
    /// the residual and is reported unpaid.
    #[default]
    Clamp,

    /// Pay each creditor's full remaining amount in one transfer even when
    /// that overdraws the pool. Matches the historical PayBox behaviour.
    Overpay,
}

impl FromStr for ShortfallPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clamp" => Ok(ShortfallPolicy::Clamp),
            "overpay" => Ok(ShortfallPolicy::Overpay),
            other => Err(format!(
                "unknown shortfall policy {:?} (expected clamp or overpay)",
                other
            )),
        }
    }
}

impl fmt::Display for ShortfallPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortfallPolicy::Clamp => write!(f, "clamp"),
            ShortfallPolicy::Overpay => write!(f, "overpay"),
        }
    }
}

/// Settings applied to every settlement computed by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettlementConfig {
    #[serde(default)]
    pub shortfall_policy: ShortfallPolicy,
}

impl SettlementConfig {
    pub fn with_shortfall_policy(mut self, policy: ShortfallPolicy) -> Self {
        self.shortfall_policy = policy;
        self
    }
}
