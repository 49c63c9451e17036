//! Auto-approval rule management.
//!
//! Validates and stores vendor rules, enforces the plan's rule quota and
//! converts stored rows into [`rules::Rule`] values for the engine.

use crate::{
    core::{
        client::require_client,
        product::require_product,
        rules::{self, Conditions, TimeWindow},
        subscription,
    },
    entities::{AutoApprovalRule, RuleType, auto_approval_rule},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime, Weekday};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

const TIME_FORMAT: &str = "%H:%M";

/// Input for [`create_rule`] and [`update_rule`]
#[derive(Debug, Clone, Deserialize)]
pub struct RuleInput {
    /// Display name
    pub name: String,
    /// Predicate kind
    pub rule_type: RuleType,
    /// Evaluation order; appended after existing rules when absent
    #[serde(default)]
    pub priority: Option<i32>,
    /// Whether the rule takes part in evaluation. New rules start active;
    /// updates keep the stored state when absent.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Whitelisted customer phones
    #[serde(default)]
    pub customer_phones: Vec<String>,
    /// Whitelisted product ids
    #[serde(default)]
    pub product_ids: Vec<i64>,
    /// Lower bound on the order total
    #[serde(default)]
    pub min_amount: Option<f64>,
    /// Upper bound on the order total
    #[serde(default)]
    pub max_amount: Option<f64>,
    /// Allowed weekdays, e.g. `["Mon", "Tue"]`
    #[serde(default)]
    pub allowed_days: Vec<Weekday>,
    /// Window start, `HH:MM`
    #[serde(default)]
    pub start_time: Option<String>,
    /// Window end, `HH:MM`
    #[serde(default)]
    pub end_time: Option<String>,
}

impl RuleInput {
    /// A rule of `rule_type` with no conditions, for building inputs in code.
    #[must_use]
    pub fn new(name: &str, rule_type: RuleType) -> Self {
        Self {
            name: name.to_string(),
            rule_type,
            priority: None,
            is_active: None,
            customer_phones: Vec::new(),
            product_ids: Vec::new(),
            min_amount: None,
            max_amount: None,
            allowed_days: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| Error::validation(format!("Invalid time '{value}', expected HH:MM")))
}

fn validate_bound(amount: Option<f64>) -> Result<()> {
    match amount {
        Some(a) if !a.is_finite() || a < 0.0 => Err(Error::InvalidAmount { amount: a }),
        _ => Ok(()),
    }
}

fn dedup<T: Eq + std::hash::Hash + Clone>(values: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

/// Checks a rule input and builds its condition set.
///
/// # Errors
/// Returns an error if the name is empty, a bound or time is malformed, or the
/// fields required by the rule type are missing.
pub fn build_conditions(input: &RuleInput) -> Result<Conditions> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Rule name cannot be empty"));
    }
    if input.priority.is_some_and(|p| p < 1) {
        return Err(Error::validation("Rule priority must be at least 1"));
    }

    validate_bound(input.min_amount)?;
    validate_bound(input.max_amount)?;
    if let (Some(min), Some(max)) = (input.min_amount, input.max_amount) {
        if min > max {
            return Err(Error::validation(format!(
                "Minimum amount {min} exceeds maximum amount {max}"
            )));
        }
    }

    let window = match (&input.start_time, &input.end_time) {
        (Some(start), Some(end)) => Some(TimeWindow {
            start: parse_time(start)?,
            end: parse_time(end)?,
        }),
        (None, None) => None,
        _ => {
            return Err(Error::validation(
                "Start and end time must be given together",
            ));
        }
    };

    let mut customer_phones = Vec::new();
    for phone in &input.customer_phones {
        let phone = phone.trim();
        if phone.is_empty() {
            continue;
        }
        if rules::normalize_phone(phone).is_empty() {
            return Err(Error::validation(format!("Invalid phone number '{phone}'")));
        }
        customer_phones.push(phone.to_string());
    }

    let conditions = Conditions {
        customer_phones: dedup(customer_phones),
        product_ids: dedup(input.product_ids.clone()),
        min_amount: input.min_amount,
        max_amount: input.max_amount,
        allowed_days: dedup(input.allowed_days.clone()),
        window,
    };

    let c = &conditions;
    let complete = match input.rule_type {
        RuleType::Customer => !c.customer_phones.is_empty(),
        RuleType::Product => !c.product_ids.is_empty(),
        RuleType::Amount => c.min_amount.is_some() || c.max_amount.is_some(),
        RuleType::Time => !c.allowed_days.is_empty() && c.window.is_some(),
        RuleType::Combined => {
            !c.customer_phones.is_empty()
                || !c.product_ids.is_empty()
                || c.min_amount.is_some()
                || c.max_amount.is_some()
                || !c.allowed_days.is_empty()
                || c.window.is_some()
        }
    };
    if !complete {
        return Err(Error::validation(format!(
            "{:?} rule is missing its conditions",
            input.rule_type
        )));
    }

    Ok(conditions)
}

async fn ensure_products_owned<C>(db: &C, client_id: i64, product_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    for &product_id in product_ids {
        require_product(db, client_id, product_id).await?;
    }
    Ok(())
}

/// Converts a stored row into an engine rule.
///
/// # Errors
/// Returns an error if the stored JSON or times cannot be parsed.
pub fn to_rule(model: &auto_approval_rule::Model) -> Result<rules::Rule> {
    let window = match (&model.start_time, &model.end_time) {
        (Some(start), Some(end)) => Some(TimeWindow {
            start: parse_time(start)?,
            end: parse_time(end)?,
        }),
        _ => None,
    };

    Ok(rules::Rule {
        id: model.id,
        name: model.name.clone(),
        rule_type: model.rule_type,
        priority: model.priority,
        is_active: model.is_active,
        conditions: Conditions {
            customer_phones: serde_json::from_str(&model.customer_phones)?,
            product_ids: serde_json::from_str(&model.product_ids)?,
            min_amount: model.min_amount,
            max_amount: model.max_amount,
            allowed_days: serde_json::from_str(&model.allowed_days)?,
            window,
        },
    })
}

fn apply_input(
    active: &mut auto_approval_rule::ActiveModel,
    input: &RuleInput,
    conditions: &Conditions,
) -> Result<()> {
    active.name = Set(input.name.trim().to_string());
    active.rule_type = Set(input.rule_type);
    if let Some(is_active) = input.is_active {
        active.is_active = Set(is_active);
    }
    active.customer_phones = Set(serde_json::to_string(&conditions.customer_phones)?);
    active.product_ids = Set(serde_json::to_string(&conditions.product_ids)?);
    active.min_amount = Set(conditions.min_amount);
    active.max_amount = Set(conditions.max_amount);
    active.allowed_days = Set(serde_json::to_string(&conditions.allowed_days)?);
    active.start_time = Set(conditions
        .window
        .map(|w| w.start.format(TIME_FORMAT).to_string()));
    active.end_time = Set(conditions
        .window
        .map(|w| w.end.format(TIME_FORMAT).to_string()));
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    Ok(())
}

/// Number of rules a client has stored, active or not.
pub async fn count_rules<C>(db: &C, client_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    AutoApprovalRule::find()
        .filter(auto_approval_rule::Column::ClientId.eq(client_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Creates a rule after validating it and checking the plan quota.
///
/// # Errors
/// Returns an error if:
/// - The client does not exist
/// - The input fails validation or references another client's product
/// - The client's plan on `today` does not allow another rule
/// - A database operation fails
pub async fn create_rule(
    db: &DatabaseConnection,
    client_id: i64,
    input: RuleInput,
    today: NaiveDate,
) -> Result<auto_approval_rule::Model> {
    let conditions = build_conditions(&input)?;

    // Quota check and insert share a transaction
    let txn = db.begin().await?;
    require_client(&txn, client_id).await?;
    ensure_products_owned(&txn, client_id, &conditions.product_ids).await?;

    let plan = subscription::current_plan(&txn, client_id, today).await?;
    let existing = usize::try_from(count_rules(&txn, client_id).await?).unwrap_or(usize::MAX);
    if !plan.allows_another_rule(existing) {
        return Err(Error::PlanLimitReached {
            plan: plan.to_string(),
            limit: plan.rule_limit().unwrap_or(usize::MAX),
        });
    }

    let priority = match input.priority {
        Some(p) => p,
        None => {
            AutoApprovalRule::find()
                .filter(auto_approval_rule::Column::ClientId.eq(client_id))
                .order_by_desc(auto_approval_rule::Column::Priority)
                .one(&txn)
                .await?
                .map_or(Some(1), |r| r.priority.checked_add(1))
                .ok_or_else(|| {
                    Error::validation("No priority left after the last rule; reorder the rules first")
                })?
        }
    };

    let now = chrono::Utc::now().naive_utc();
    let mut active = auto_approval_rule::ActiveModel {
        client_id: Set(client_id),
        priority: Set(priority),
        is_active: Set(true),
        created_at: Set(now),
        ..Default::default()
    };
    apply_input(&mut active, &input, &conditions)?;
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    info!(client_id, rule_id = created.id, priority, %plan, "Auto-approval rule created");
    Ok(created)
}

/// Retrieves a rule of the client.
///
/// # Errors
/// Returns [`Error::NotFound`] if the rule does not belong to the client.
pub async fn get_rule(
    db: &DatabaseConnection,
    client_id: i64,
    rule_id: i64,
) -> Result<auto_approval_rule::Model> {
    AutoApprovalRule::find_by_id(rule_id)
        .filter(auto_approval_rule::Column::ClientId.eq(client_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("rule", rule_id))
}

/// Lists a client's rules in evaluation order.
pub async fn list_rules(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Vec<auto_approval_rule::Model>> {
    AutoApprovalRule::find()
        .filter(auto_approval_rule::Column::ClientId.eq(client_id))
        .order_by_asc(auto_approval_rule::Column::Priority)
        .order_by_asc(auto_approval_rule::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces a rule's definition. The priority is kept unless one is given.
///
/// # Errors
/// Returns an error if the rule does not belong to the client or the input
/// fails validation.
pub async fn update_rule(
    db: &DatabaseConnection,
    client_id: i64,
    rule_id: i64,
    input: RuleInput,
) -> Result<auto_approval_rule::Model> {
    let conditions = build_conditions(&input)?;
    let existing = get_rule(db, client_id, rule_id).await?;
    ensure_products_owned(db, client_id, &conditions.product_ids).await?;

    let mut active: auto_approval_rule::ActiveModel = existing.into();
    if let Some(priority) = input.priority {
        active.priority = Set(priority);
    }
    apply_input(&mut active, &input, &conditions)?;
    active.update(db).await.map_err(Into::into)
}

/// Enables or disables a rule.
pub async fn set_rule_active(
    db: &DatabaseConnection,
    client_id: i64,
    rule_id: i64,
    is_active: bool,
) -> Result<auto_approval_rule::Model> {
    let mut active: auto_approval_rule::ActiveModel = get_rule(db, client_id, rule_id).await?.into();
    active.is_active = Set(is_active);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a rule.
pub async fn delete_rule(db: &DatabaseConnection, client_id: i64, rule_id: i64) -> Result<()> {
    let rule = get_rule(db, client_id, rule_id).await?;
    rule.delete(db).await?;
    info!(client_id, rule_id, "Auto-approval rule deleted");
    Ok(())
}

/// Assigns priorities 1..n following the order of `rule_ids`.
///
/// # Errors
/// Returns [`Error::Validation`] unless `rule_ids` lists every rule of the
/// client exactly once.
pub async fn reorder_rules(
    db: &DatabaseConnection,
    client_id: i64,
    rule_ids: &[i64],
) -> Result<Vec<auto_approval_rule::Model>> {
    let current = list_rules(db, client_id).await?;
    let known: HashSet<i64> = current.iter().map(|r| r.id).collect();
    let given: HashSet<i64> = rule_ids.iter().copied().collect();
    if given.len() != rule_ids.len() || given != known {
        return Err(Error::validation(
            "Rule order must list every rule of the client exactly once",
        ));
    }

    let txn = db.begin().await?;
    let now = chrono::Utc::now().naive_utc();
    for (rule_id, priority) in rule_ids.iter().zip(1..) {
        let model = current
            .iter()
            .find(|r| r.id == *rule_id)
            .ok_or_else(|| Error::not_found("rule", rule_id))?;
        let mut active: auto_approval_rule::ActiveModel = model.clone().into();
        active.priority = Set(priority);
        active.updated_at = Set(now);
        active.update(&txn).await?;
    }
    txn.commit().await?;

    list_rules(db, client_id).await
}

/// Loads a client's rules as engine rules.
pub async fn load_rule_set<C>(db: &C, client_id: i64) -> Result<Vec<rules::Rule>>
where
    C: ConnectionTrait,
{
    AutoApprovalRule::find()
        .filter(auto_approval_rule::Column::ClientId.eq(client_id))
        .all(db)
        .await?
        .iter()
        .map(to_rule)
        .collect()
}
