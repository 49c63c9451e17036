//! Auto-approval rule engine.
//!
//! Pure, synchronous evaluation of a vendor's rule set against one delivery
//! request. Nothing here touches the database: `core::auto_approval` loads
//! stored rules into [`Rule`] values and `core::delivery` acts on the result.
//!
//! Rules are tried in ascending priority (ties broken by id); inactive rules
//! are skipped and the first match wins. The caller passes the plan's rule
//! quota as `limit`, which caps how many active rules are considered.

use crate::entities::RuleType;
use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive time-of-day window. A window whose start is after its end wraps
/// past midnight (e.g. 22:00-06:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First minute of the window
    pub start: NaiveTime,
    /// Last minute of the window
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Whether `time` falls inside the window.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }
}

/// Condition set of a rule. Which fields are consulted depends on the
/// rule type; COMBINED consults every field that is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Whitelisted customer phones
    pub customer_phones: Vec<String>,
    /// Whitelisted product ids
    pub product_ids: Vec<i64>,
    /// Lower bound on the order total
    pub min_amount: Option<f64>,
    /// Upper bound on the order total
    pub max_amount: Option<f64>,
    /// Allowed days of the week
    pub allowed_days: Vec<Weekday>,
    /// Allowed time of day
    pub window: Option<TimeWindow>,
}

impl Conditions {
    fn has_customer(&self) -> bool {
        !self.customer_phones.is_empty()
    }

    fn has_product(&self) -> bool {
        !self.product_ids.is_empty()
    }

    const fn has_amount(&self) -> bool {
        self.min_amount.is_some() || self.max_amount.is_some()
    }

    fn has_time(&self) -> bool {
        !self.allowed_days.is_empty() || self.window.is_some()
    }

    fn customer_matches(&self, phone: &str) -> bool {
        let wanted = normalize_phone(phone);
        !wanted.is_empty()
            && self
                .customer_phones
                .iter()
                .any(|p| normalize_phone(p) == wanted)
    }

    fn product_matches(&self, product_ids: &[i64]) -> bool {
        product_ids.iter().any(|id| self.product_ids.contains(id))
    }

    fn amount_matches(&self, total: f64) -> bool {
        self.min_amount.is_none_or(|min| total >= min)
            && self.max_amount.is_none_or(|max| total <= max)
    }

    fn day_matches(&self, at: NaiveDateTime) -> bool {
        self.allowed_days.is_empty() || self.allowed_days.contains(&at.weekday())
    }

    fn window_matches(&self, at: NaiveDateTime) -> bool {
        self.window.is_none_or(|w| w.contains(at.time()))
    }
}

/// A rule ready for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stored rule id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Predicate kind
    pub rule_type: RuleType,
    /// Evaluation order, lower first
    pub priority: i32,
    /// Inactive rules never match
    pub is_active: bool,
    /// Condition set
    pub conditions: Conditions,
}

/// The facts about a delivery request that rules look at.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Customer phone as entered on the request
    pub customer_phone: &'a str,
    /// Order total
    pub total_amount: f64,
    /// Products on the request
    pub product_ids: &'a [i64],
    /// Submission time in business local time
    pub local_time: NaiveDateTime,
}

impl Rule {
    /// Whether this rule's predicate holds for `ctx`, ignoring `is_active`.
    #[must_use]
    pub fn matches(&self, ctx: &RequestContext<'_>) -> bool {
        let c = &self.conditions;
        match self.rule_type {
            RuleType::Customer => c.customer_matches(ctx.customer_phone),
            RuleType::Product => c.product_matches(ctx.product_ids),
            RuleType::Amount => c.has_amount() && c.amount_matches(ctx.total_amount),
            RuleType::Time => {
                !c.allowed_days.is_empty()
                    && c.window.is_some()
                    && c.day_matches(ctx.local_time)
                    && c.window_matches(ctx.local_time)
            }
            RuleType::Combined => {
                let mut present = 0;
                if c.has_customer() {
                    present += 1;
                    if !c.customer_matches(ctx.customer_phone) {
                        return false;
                    }
                }
                if c.has_product() {
                    present += 1;
                    if !c.product_matches(ctx.product_ids) {
                        return false;
                    }
                }
                if c.has_amount() {
                    present += 1;
                    if !c.amount_matches(ctx.total_amount) {
                        return false;
                    }
                }
                if c.has_time() {
                    present += 1;
                    if !(c.day_matches(ctx.local_time) && c.window_matches(ctx.local_time)) {
                        return false;
                    }
                }
                present > 0
            }
        }
    }
}

/// Active rules in evaluation order: ascending priority, then ascending id.
#[must_use]
pub fn evaluation_order(rules: &[Rule]) -> Vec<&Rule> {
    let mut ordered: Vec<&Rule> = rules.iter().filter(|r| r.is_active).collect();
    ordered.sort_by_key(|r| (r.priority, r.id));
    ordered
}

/// Finds the rule that auto-approves the request, if any.
///
/// `limit` is the number of active rules the vendor's plan lets through
/// (`None` for unlimited); rules beyond it are not evaluated.
#[must_use]
pub fn evaluate<'r>(
    rules: &'r [Rule],
    ctx: &RequestContext<'_>,
    limit: Option<usize>,
) -> Option<&'r Rule> {
    let matched = evaluation_order(rules)
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .find(|rule| rule.matches(ctx));

    match matched {
        Some(rule) => debug!(rule_id = rule.id, priority = rule.priority, "auto-approval rule matched"),
        None => debug!("no auto-approval rule matched"),
    }
    matched
}

/// Reduces a phone number to its digits so formatting differences
/// (`+`, spaces, dashes, parentheses) do not affect matching.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}
