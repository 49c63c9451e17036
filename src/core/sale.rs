//! Sales (invoices).
//!
//! A sale is recorded when a delivery request is approved. Recording a sale
//! takes the sold quantities out of stock, so it must run inside the caller's
//! database transaction.

use crate::{
    core::inventory,
    entities::{InventoryReason, Sale, SaleItem, sale, sale_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use tracing::info;

/// One line of a sale to record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleLine {
    /// Product sold
    pub product_id: i64,
    /// Units sold
    pub quantity: i32,
    /// Price per unit
    pub unit_price: f64,
}

/// A sale with its line items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleWithItems {
    /// Sale header
    #[serde(flatten)]
    pub sale: sale::Model,
    /// Line items
    pub items: Vec<sale_item::Model>,
}

/// Invoice number the next sale of the client will receive.
pub async fn next_invoice_number<C>(db: &C, client_id: i64) -> Result<String>
where
    C: ConnectionTrait,
{
    let count = Sale::find()
        .filter(sale::Column::ClientId.eq(client_id))
        .count(db)
        .await?;
    Ok(format!("INV-{client_id:04}-{:06}", count + 1))
}

/// Records a sale, its items and the matching stock decrements.
///
/// # Errors
/// Returns an error if there are no lines, a quantity is not positive, a
/// product runs out of stock, or a database operation fails. Run inside a
/// transaction so a failure leaves stock untouched.
pub async fn record_sale<C>(
    db: &C,
    client_id: i64,
    delivery_request_id: Option<i64>,
    customer_name: &str,
    customer_phone: &str,
    lines: &[SaleLine],
) -> Result<SaleWithItems>
where
    C: ConnectionTrait,
{
    if lines.is_empty() {
        return Err(Error::validation("A sale needs at least one item"));
    }
    if let Some(line) = lines.iter().find(|l| l.quantity <= 0) {
        return Err(Error::InvalidQuantity {
            quantity: line.quantity,
        });
    }

    let invoice_number = next_invoice_number(db, client_id).await?;

    for line in lines {
        inventory::adjust_stock(
            db,
            line.product_id,
            -line.quantity,
            InventoryReason::Sale,
            Some(invoice_number.clone()),
        )
        .await?;
    }

    let total_amount: f64 = lines
        .iter()
        .map(|l| f64::from(l.quantity) * l.unit_price)
        .sum();

    let created = sale::ActiveModel {
        client_id: Set(client_id),
        delivery_request_id: Set(delivery_request_id),
        invoice_number: Set(invoice_number),
        customer_name: Set(customer_name.to_string()),
        customer_phone: Set(customer_phone.to_string()),
        total_amount: Set(total_amount),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        items.push(
            sale_item::ActiveModel {
                sale_id: Set(created.id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                ..Default::default()
            }
            .insert(db)
            .await?,
        );
    }

    info!(client_id, sale_id = created.id, invoice = %created.invoice_number, total_amount, "Sale recorded");
    Ok(SaleWithItems {
        sale: created,
        items,
    })
}

/// Lists a client's sales, newest first.
pub async fn list_sales(db: &DatabaseConnection, client_id: i64) -> Result<Vec<sale::Model>> {
    Sale::find()
        .filter(sale::Column::ClientId.eq(client_id))
        .order_by_desc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a sale of the client with its items.
///
/// # Errors
/// Returns [`Error::NotFound`] if the sale does not belong to the client.
pub async fn get_sale<C>(db: &C, client_id: i64, sale_id: i64) -> Result<SaleWithItems>
where
    C: ConnectionTrait,
{
    let found = Sale::find_by_id(sale_id)
        .filter(sale::Column::ClientId.eq(client_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("sale", sale_id))?;

    let items = SaleItem::find()
        .filter(sale_item::Column::SaleId.eq(sale_id))
        .order_by_asc(sale_item::Column::Id)
        .all(db)
        .await?;

    Ok(SaleWithItems { sale: found, items })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::product::get_product;
    use crate::test_utils::*;
    use sea_orm::TransactionTrait;

    #[tokio::test]
    async fn test_record_sale_decrements_stock() -> Result<()> {
        let (db, client, product) = setup_with_product().await?;

        let txn = db.begin().await?;
        let recorded = record_sale(
            &txn,
            client.id,
            None,
            "Carla",
            "555-0101",
            &[SaleLine {
                product_id: product.id,
                quantity: 3,
                unit_price: product.price,
            }],
        )
        .await?;
        txn.commit().await?;

        assert_eq!(recorded.sale.total_amount, 3.0 * product.price);
        assert_eq!(recorded.sale.invoice_number, format!("INV-{:04}-000001", client.id));
        assert_eq!(recorded.items.len(), 1);

        let reloaded = get_product(&db, client.id, product.id).await?.unwrap();
        assert_eq!(reloaded.stock, product.stock - 3);

        let logs = inventory::list_logs_for_product(&db, client.id, product.id).await?;
        assert_eq!(logs[0].reason, InventoryReason::Sale);
        assert_eq!(logs[0].reference.as_deref(), Some(recorded.sale.invoice_number.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential_per_client() -> Result<()> {
        let (db, client, product) = setup_with_product().await?;
        let line = [SaleLine {
            product_id: product.id,
            quantity: 1,
            unit_price: 1.0,
        }];

        let first = record_sale(&db, client.id, None, "A", "1", &line).await?;
        let second = record_sale(&db, client.id, None, "B", "2", &line).await?;
        assert_ne!(first.sale.invoice_number, second.sale.invoice_number);
        assert!(second.sale.invoice_number.ends_with("000002"));

        let sales = list_sales(&db, client.id).await?;
        assert_eq!(sales[0].id, second.sale.id);

        let fetched = get_sale(&db, client.id, first.sale.id).await?;
        assert_eq!(fetched, first);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_sale_rolls_back_stock() -> Result<()> {
        let (db, client, product) = setup_with_product().await?;
        let other = create_test_product(&db, client.id, "Ice", "ICE").await?;

        let txn = db.begin().await?;
        let result = record_sale(
            &txn,
            client.id,
            None,
            "A",
            "1",
            &[
                SaleLine {
                    product_id: product.id,
                    quantity: 1,
                    unit_price: 1.0,
                },
                SaleLine {
                    product_id: other.id,
                    quantity: other.stock + 1,
                    unit_price: 1.0,
                },
            ],
        )
        .await;
        assert!(matches!(result, Err(Error::InsufficientStock { .. })));
        txn.rollback().await?;

        let reloaded = get_product(&db, client.id, product.id).await?.unwrap();
        assert_eq!(reloaded.stock, product.stock);
        assert!(list_sales(&db, client.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_record_sale_validation() -> Result<()> {
        let (db, client, product) = setup_with_product().await?;
        assert!(matches!(
            record_sale(&db, client.id, None, "A", "1", &[]).await,
            Err(Error::Validation { .. })
        ));
        let zero = [SaleLine {
            product_id: product.id,
            quantity: 0,
            unit_price: 1.0,
        }];
        assert!(matches!(
            record_sale(&db, client.id, None, "A", "1", &zero).await,
            Err(Error::InvalidQuantity { quantity: 0 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_sale_scoped_to_client() -> Result<()> {
        let (db, client, product) = setup_with_product().await?;
        let line = [SaleLine {
            product_id: product.id,
            quantity: 1,
            unit_price: 1.0,
        }];
        let recorded = record_sale(&db, client.id, None, "A", "1", &line).await?;
        let other = create_test_client(&db, "Other").await?;
        assert!(matches!(
            get_sale(&db, other.id, recorded.sale.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
