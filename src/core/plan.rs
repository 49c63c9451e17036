//! Subscription tier limits.
//!
//! Plans gate how many auto-approval rules a vendor may create and how many
//! of its active rules are considered during evaluation.

use crate::entities::Plan;

/// Maximum number of rules on the STANDARD plan.
pub const STANDARD_RULE_LIMIT: usize = 3;

impl Plan {
    /// Wire/database spelling of the plan
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Standard => "STANDARD",
            Self::Premium => "PREMIUM",
        }
    }

    /// Number of auto-approval rules allowed, `None` meaning unlimited.
    #[must_use]
    pub const fn rule_limit(self) -> Option<usize> {
        match self {
            Self::Basic => Some(0),
            Self::Standard => Some(STANDARD_RULE_LIMIT),
            Self::Premium => None,
        }
    }

    /// Whether a vendor holding `existing` rules may add one more.
    #[must_use]
    pub fn allows_another_rule(self, existing: usize) -> bool {
        self.rule_limit().is_none_or(|limit| existing < limit)
    }

    /// Whether the plan includes auto-approval at all.
    #[must_use]
    pub fn has_auto_approval(self) -> bool {
        self.rule_limit() != Some(0)
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
