//! Delivery requests and their approval.
//!
//! A new request is stored as `PENDING` and immediately run through the
//! vendor's auto-approval rules. A match approves it on the spot; otherwise it
//! waits for the vendor to approve or reject it by hand. Approval records a
//! sale, which takes the requested quantities out of stock.

use crate::{
    core::{
        auto_approval,
        client::require_client,
        notification,
        product::require_product,
        rules::{self, RequestContext},
        sale::{self, SaleLine, SaleWithItems},
        subscription,
    },
    entities::{
        DeliveryRequest, DeliveryRequestItem, DeliveryStatus, Product, delivery_request,
        delivery_request_item,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One requested product
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NewLineItem {
    /// Product requested
    pub product_id: i64,
    /// Units requested
    pub quantity: i32,
}

/// Input for [`create_delivery_request`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewDeliveryRequest {
    /// Customer name
    pub customer_name: String,
    /// Customer phone
    pub customer_phone: String,
    /// Delivery address
    #[serde(default)]
    pub address: Option<String>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Requested products
    pub items: Vec<NewLineItem>,
}

/// A delivery request with its line items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRequestDetails {
    /// Request header
    #[serde(flatten)]
    pub request: delivery_request::Model,
    /// Line items
    pub items: Vec<delivery_request_item::Model>,
}

/// What happened to a new request after rule evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    /// A rule matched and the request was approved
    AutoApproved {
        /// Matching rule
        rule_id: i64,
        /// Name of the matching rule
        rule_name: String,
        /// Invoice of the resulting sale
        invoice_number: String,
    },
    /// The vendor's plan has no auto-approval
    AutoApprovalUnavailable,
    /// No active rule matched
    NoRuleMatched,
    /// A rule matched but stock was short, so the request stays pending
    InsufficientStock {
        /// Matching rule
        rule_id: i64,
    },
    /// A rule matched but approving failed for another reason, so the
    /// request stays pending
    ApprovalFailed {
        /// Matching rule
        rule_id: i64,
    },
}

/// Result of [`create_delivery_request`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryOutcome {
    /// The stored request, reflecting any auto-approval
    pub request: DeliveryRequestDetails,
    /// Rule evaluation result
    pub decision: Decision,
}

fn validate_request(input: &NewDeliveryRequest) -> Result<Vec<NewLineItem>> {
    if input.customer_name.trim().is_empty() {
        return Err(Error::validation("Customer name cannot be empty"));
    }
    if rules::normalize_phone(&input.customer_phone).is_empty() {
        return Err(Error::validation(format!(
            "Invalid customer phone '{}'",
            input.customer_phone
        )));
    }
    if input.items.is_empty() {
        return Err(Error::validation(
            "A delivery request needs at least one item",
        ));
    }

    // Repeated products are merged into one line
    let mut merged: Vec<NewLineItem> = Vec::with_capacity(input.items.len());
    for item in &input.items {
        if item.quantity <= 0 {
            return Err(Error::InvalidQuantity {
                quantity: item.quantity,
            });
        }
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(item.quantity).ok_or(
                    Error::InvalidQuantity {
                        quantity: item.quantity,
                    },
                )?;
            }
            None => merged.push(*item),
        }
    }
    Ok(merged)
}

fn optional_text(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Files a delivery request and runs it through the auto-approval rules.
///
/// `requested_at` is the submission time; TIME conditions are checked against
/// it in the business time zone given by `offset`.
///
/// # Errors
/// Returns an error if:
/// - The customer or items fail validation
/// - The client does not exist or is inactive
/// - A product does not belong to the client or is deleted
/// - A database operation fails
pub async fn create_delivery_request(
    db: &DatabaseConnection,
    client_id: i64,
    input: NewDeliveryRequest,
    requested_at: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<DeliveryOutcome> {
    let lines = validate_request(&input)?;

    let client = require_client(db, client_id).await?;
    if !client.is_active {
        return Err(Error::validation(format!(
            "Client {client_id} is inactive and cannot take requests"
        )));
    }

    let txn = db.begin().await?;

    let mut priced = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = require_product(&txn, client_id, line.product_id).await?;
        priced.push((line, product.price));
    }
    let total_amount: f64 = priced
        .iter()
        .map(|(line, price)| f64::from(line.quantity) * price)
        .sum();

    let request = delivery_request::ActiveModel {
        client_id: Set(client_id),
        customer_name: Set(input.customer_name.trim().to_string()),
        customer_phone: Set(input.customer_phone.trim().to_string()),
        address: Set(optional_text(input.address.as_ref())),
        notes: Set(optional_text(input.notes.as_ref())),
        total_amount: Set(total_amount),
        status: Set(DeliveryStatus::Pending),
        auto_approved: Set(false),
        approval_rule_id: Set(None),
        rejection_reason: Set(None),
        requested_at: Set(requested_at),
        decided_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (line, price) in &priced {
        delivery_request_item::ActiveModel {
            delivery_request_id: Set(request.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(*price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!(client_id, request_id = request.id, total_amount, "Delivery request filed");

    let local_time = requested_at.with_timezone(&offset).naive_local();
    let decision = run_auto_approval(db, &request, &lines, local_time).await?;

    let (title, kind) = match &decision {
        Decision::AutoApproved { .. } => (
            "Delivery request auto-approved",
            notification::KIND_DELIVERY_AUTO_APPROVED,
        ),
        _ => (
            "Delivery request awaiting approval",
            notification::KIND_DELIVERY_PENDING,
        ),
    };
    let message = match &decision {
        Decision::AutoApproved {
            rule_name,
            invoice_number,
            ..
        } => format!(
            "Request #{} from {} was approved by rule '{rule_name}' (invoice {invoice_number}).",
            request.id, request.customer_name
        ),
        Decision::InsufficientStock { .. } => format!(
            "Request #{} from {} matched an auto-approval rule but stock is short.",
            request.id, request.customer_name
        ),
        Decision::ApprovalFailed { .. } => format!(
            "Request #{} from {} matched an auto-approval rule but could not be approved automatically.",
            request.id, request.customer_name
        ),
        _ => format!(
            "Request #{} from {} ({:.2}) needs your approval.",
            request.id, request.customer_name, request.total_amount
        ),
    };
    notification::notify_client(db, client_id, title, &message, kind).await?;

    Ok(DeliveryOutcome {
        request: get_delivery_request(db, client_id, request.id).await?,
        decision,
    })
}

async fn run_auto_approval(
    db: &DatabaseConnection,
    request: &delivery_request::Model,
    lines: &[NewLineItem],
    local_time: chrono::NaiveDateTime,
) -> Result<Decision> {
    let plan = subscription::current_plan(db, request.client_id, local_time.date()).await?;
    if !plan.has_auto_approval() {
        return Ok(Decision::AutoApprovalUnavailable);
    }

    let rule_set = auto_approval::load_rule_set(db, request.client_id).await?;
    let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
    let ctx = RequestContext {
        customer_phone: &request.customer_phone,
        total_amount: request.total_amount,
        product_ids: &product_ids,
        local_time,
    };

    let Some(rule) = rules::evaluate(&rule_set, &ctx, plan.rule_limit()) else {
        return Ok(Decision::NoRuleMatched);
    };

    match approve(db, request.client_id, request.id, Some(rule)).await {
        Ok(recorded) => Ok(Decision::AutoApproved {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            invoice_number: recorded.sale.invoice_number,
        }),
        Err(Error::InsufficientStock {
            product_id,
            available,
            requested,
        }) => {
            warn!(
                request_id = request.id,
                rule_id = rule.id,
                product_id,
                available,
                requested,
                "Auto-approval skipped: insufficient stock"
            );
            Ok(Decision::InsufficientStock { rule_id: rule.id })
        }
        Err(e) => {
            warn!(
                request_id = request.id,
                rule_id = rule.id,
                error = %e,
                "Auto-approval failed; request left pending"
            );
            Ok(Decision::ApprovalFailed { rule_id: rule.id })
        }
    }
}

async fn approve(
    db: &DatabaseConnection,
    client_id: i64,
    request_id: i64,
    rule: Option<&rules::Rule>,
) -> Result<SaleWithItems> {
    let txn = db.begin().await?;

    let request = find_request(&txn, client_id, request_id).await?;
    if request.status != DeliveryStatus::Pending {
        return Err(Error::InvalidStatus {
            id: request_id,
            status: request.status.as_str().to_string(),
        });
    }

    let items = find_items(&txn, request_id).await?;
    let lines: Vec<SaleLine> = items
        .iter()
        .map(|i| SaleLine {
            product_id: i.product_id,
            quantity: i.quantity,
            unit_price: i.unit_price,
        })
        .collect();

    let recorded = sale::record_sale(
        &txn,
        client_id,
        Some(request_id),
        &request.customer_name,
        &request.customer_phone,
        &lines,
    )
    .await?;

    let mut active: delivery_request::ActiveModel = request.into();
    active.status = Set(DeliveryStatus::Approved);
    active.auto_approved = Set(rule.is_some());
    active.approval_rule_id = Set(rule.map(|r| r.id));
    active.decided_at = Set(Some(Utc::now()));
    active.update(&txn).await?;

    txn.commit().await?;

    info!(
        client_id,
        request_id,
        auto = rule.is_some(),
        invoice = %recorded.sale.invoice_number,
        "Delivery request approved"
    );

    notify_low_stock(db, client_id, &lines).await?;
    Ok(recorded)
}

async fn notify_low_stock(db: &DatabaseConnection, client_id: i64, lines: &[SaleLine]) -> Result<()> {
    for line in lines {
        let Some(product) = Product::find_by_id(line.product_id).one(db).await? else {
            continue;
        };
        if product.stock <= product.low_stock_threshold {
            let message = format!(
                "{} ({}) is down to {} units.",
                product.name, product.sku, product.stock
            );
            notification::notify_client(
                db,
                client_id,
                "Low stock",
                &message,
                notification::KIND_LOW_STOCK,
            )
            .await?;
        }
    }
    Ok(())
}

async fn find_request<C>(db: &C, client_id: i64, request_id: i64) -> Result<delivery_request::Model>
where
    C: ConnectionTrait,
{
    DeliveryRequest::find_by_id(request_id)
        .filter(delivery_request::Column::ClientId.eq(client_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("delivery request", request_id))
}

async fn find_items<C>(db: &C, request_id: i64) -> Result<Vec<delivery_request_item::Model>>
where
    C: ConnectionTrait,
{
    DeliveryRequestItem::find()
        .filter(delivery_request_item::Column::DeliveryRequestId.eq(request_id))
        .order_by_asc(delivery_request_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approves a pending request by hand, recording its sale.
///
/// # Errors
/// Returns an error if the request does not belong to the client, is not
/// pending, a product is short of stock, or a database operation fails.
pub async fn approve_delivery_request(
    db: &DatabaseConnection,
    client_id: i64,
    request_id: i64,
) -> Result<SaleWithItems> {
    approve(db, client_id, request_id, None).await
}

/// Rejects a pending request.
///
/// # Errors
/// Returns an error if the request does not belong to the client or is not pending.
pub async fn reject_delivery_request(
    db: &DatabaseConnection,
    client_id: i64,
    request_id: i64,
    reason: Option<String>,
) -> Result<delivery_request::Model> {
    let request = find_request(db, client_id, request_id).await?;
    if request.status != DeliveryStatus::Pending {
        return Err(Error::InvalidStatus {
            id: request_id,
            status: request.status.as_str().to_string(),
        });
    }

    let mut active: delivery_request::ActiveModel = request.into();
    active.status = Set(DeliveryStatus::Rejected);
    active.rejection_reason = Set(optional_text(reason.as_ref()));
    active.decided_at = Set(Some(Utc::now()));
    let rejected = active.update(db).await?;

    info!(client_id, request_id, "Delivery request rejected");
    Ok(rejected)
}

/// Lists a client's requests, newest first, optionally filtered by status.
pub async fn list_delivery_requests(
    db: &DatabaseConnection,
    client_id: i64,
    status: Option<DeliveryStatus>,
) -> Result<Vec<delivery_request::Model>> {
    let mut query =
        DeliveryRequest::find().filter(delivery_request::Column::ClientId.eq(client_id));
    if let Some(status) = status {
        query = query.filter(delivery_request::Column::Status.eq(status));
    }
    query
        .order_by_desc(delivery_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a request of the client with its items.
pub async fn get_delivery_request(
    db: &DatabaseConnection,
    client_id: i64,
    request_id: i64,
) -> Result<DeliveryRequestDetails> {
    let request = find_request(db, client_id, request_id).await?;
    let items = find_items(db, request_id).await?;
    Ok(DeliveryRequestDetails { request, items })
}
