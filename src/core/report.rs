//! Dashboard reports.
//!
//! This module aggregates figures for the vendor dashboard and the admin
//! overview. All functions return structured data that the API layer
//! serializes as-is.

use crate::{
    core::{auto_approval, client::require_client, notification, product, subscription},
    entities::{
        ClientProfile, DeliveryRequest, DeliveryStatus, Plan, Sale, client_profile,
        delivery_request, product as product_entity, sale,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, prelude::*};
use serde::Serialize;

/// Figures shown on a vendor's dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct VendorDashboard {
    /// The client being reported on
    pub client_id: i64,
    /// Plan in effect today
    pub plan: Plan,
    /// Number of sales recorded
    pub sales_count: u64,
    /// Sum of all sale totals
    pub sales_total: f64,
    /// Requests waiting for a decision
    pub pending_requests: u64,
    /// Requests approved by a rule
    pub auto_approved_requests: u64,
    /// Products at or below their threshold
    pub low_stock: Vec<product_entity::Model>,
    /// Unread notifications of the owner
    pub unread_notifications: u64,
    /// Rules the vendor has defined
    pub rules_used: u64,
    /// Rule quota of the plan; `None` means unlimited
    pub rule_limit: Option<usize>,
}

/// Number of clients on each plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanBreakdown {
    /// Clients on BASIC, including those without a subscription
    pub basic: u64,
    /// Clients on STANDARD
    pub standard: u64,
    /// Clients on PREMIUM
    pub premium: u64,
}

impl PlanBreakdown {
    fn record(&mut self, plan: Plan) {
        match plan {
            Plan::Basic => self.basic += 1,
            Plan::Standard => self.standard += 1,
            Plan::Premium => self.premium += 1,
        }
    }
}

/// Platform-wide figures for admins.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    /// All clients
    pub total_clients: u64,
    /// Clients not deactivated
    pub active_clients: u64,
    /// Plan in effect today per client
    pub plans: PlanBreakdown,
    /// Requests pending across all clients
    pub pending_requests: u64,
    /// Sales across all clients
    pub total_sales: u64,
}

async fn count_requests(
    db: &DatabaseConnection,
    client_id: i64,
    status: DeliveryStatus,
    auto_only: bool,
) -> Result<u64> {
    let mut query = DeliveryRequest::find()
        .filter(delivery_request::Column::ClientId.eq(client_id))
        .filter(delivery_request::Column::Status.eq(status));
    if auto_only {
        query = query.filter(delivery_request::Column::AutoApproved.eq(true));
    }
    query.count(db).await.map_err(Into::into)
}

/// Builds the dashboard of one vendor as of `today`.
///
/// # Errors
/// Returns an error if the client does not exist or a query fails.
pub async fn vendor_dashboard(
    db: &DatabaseConnection,
    client_id: i64,
    today: NaiveDate,
) -> Result<VendorDashboard> {
    let client = require_client(db, client_id).await?;
    let plan = subscription::current_plan(db, client_id, today).await?;

    let sales = Sale::find()
        .filter(sale::Column::ClientId.eq(client_id))
        .all(db)
        .await?;
    let sales_total = sales.iter().map(|s| s.total_amount).sum();

    Ok(VendorDashboard {
        client_id,
        plan,
        sales_count: sales.len() as u64,
        sales_total,
        pending_requests: count_requests(db, client_id, DeliveryStatus::Pending, false).await?,
        auto_approved_requests: count_requests(db, client_id, DeliveryStatus::Approved, true)
            .await?,
        low_stock: product::low_stock_products(db, client_id).await?,
        unread_notifications: notification::unread_count(db, client.user_id).await?,
        rules_used: auto_approval::count_rules(db, client_id).await?,
        rule_limit: plan.rule_limit(),
    })
}

/// Builds the admin overview as of `today`.
pub async fn admin_overview(db: &DatabaseConnection, today: NaiveDate) -> Result<AdminOverview> {
    let clients = ClientProfile::find().all(db).await?;

    let mut plans = PlanBreakdown::default();
    for client in &clients {
        plans.record(subscription::current_plan(db, client.id, today).await?);
    }

    let active_clients = ClientProfile::find()
        .filter(client_profile::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let pending_requests = DeliveryRequest::find()
        .filter(delivery_request::Column::Status.eq(DeliveryStatus::Pending))
        .count(db)
        .await?;
    let total_sales = Sale::find().count(db).await?;

    Ok(AdminOverview {
        total_clients: clients.len() as u64,
        active_clients,
        plans,
        pending_requests,
        total_sales,
    })
}
