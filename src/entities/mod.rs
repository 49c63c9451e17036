//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod auto_approval_rule;
pub mod client_profile;
pub mod delivery_request;
pub mod delivery_request_item;
pub mod inventory_log;
pub mod notification;
pub mod product;
pub mod sale;
pub mod sale_item;
pub mod subscription;
pub mod user;

// Re-export specific types to avoid conflicts
pub use auto_approval_rule::{
    Column as AutoApprovalRuleColumn, Entity as AutoApprovalRule, Model as AutoApprovalRuleModel,
    RuleType,
};
pub use client_profile::{
    Column as ClientProfileColumn, Entity as ClientProfile, Model as ClientProfileModel,
};
pub use delivery_request::{
    Column as DeliveryRequestColumn, DeliveryStatus, Entity as DeliveryRequest,
    Model as DeliveryRequestModel,
};
pub use delivery_request_item::{
    Column as DeliveryRequestItemColumn, Entity as DeliveryRequestItem,
    Model as DeliveryRequestItemModel,
};
pub use inventory_log::{
    Column as InventoryLogColumn, Entity as InventoryLog, InventoryReason,
    Model as InventoryLogModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
    NotificationChannel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use sale::{Column as SaleColumn, Entity as Sale, Model as SaleModel};
pub use sale_item::{Column as SaleItemColumn, Entity as SaleItem, Model as SaleItemModel};
pub use subscription::{
    Column as SubscriptionColumn, Entity as Subscription, Model as SubscriptionModel, Plan,
    SubscriptionStatus,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
