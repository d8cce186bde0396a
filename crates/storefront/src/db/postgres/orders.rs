//! Order queries and the checkout transaction.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use akwaba_core::{Email, OrderId};

use super::{PgStore, constraint_error, require_row};
use crate::db::{OrderStore, OrderTransaction, RepositoryError};
use crate::models::order::INITIAL_STATUS;
use crate::models::{NewOrder, NewOrderItem, OrderDetail, OrderLine, OrderSummary};

const SUMMARY_COLUMNS: &str = r"
    id,
    customer_firstname || ' ' || customer_lastname AS customer_name,
    total_amount AS total,
    status,
    delivery_method,
    created_at
";

/// Checkout transaction over one pooled connection.
///
/// sqlx rolls the transaction back when it is dropped uncommitted, so a
/// cancelled request never leaves it open.
pub struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
    async fn insert_header(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let (id,): (OrderId,) = sqlx::query_as(
            r"
            INSERT INTO orders
                (customer_firstname, customer_lastname, customer_email, customer_phone,
                 delivery_method, shipping_city, shipping_commune, shipping_address,
                 order_note, create_account, total_amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(&order.first_name)
        .bind(&order.last_name)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(&order.delivery_method)
        .bind(&order.shipping_city)
        .bind(&order.shipping_commune)
        .bind(&order.shipping_address)
        .bind(&order.order_note)
        .bind(order.create_account)
        .bind(order.total)
        .bind(INITIAL_STATUS)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn insert_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| constraint_error(e, "order line references an unknown product"))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgOrderTransaction { tx }))
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let query = format!("SELECT {SUMMARY_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC");
        let orders = sqlx::query_as::<_, OrderSummary>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn list_orders_for_email(
        &self,
        email: &Email,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM orders WHERE customer_email = $1 ORDER BY created_at DESC, id DESC"
        );
        let orders = sqlx::query_as::<_, OrderSummary>(&query)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let header = sqlx::query_as::<_, OrderDetail>(
            r"
            SELECT id,
                   customer_firstname || ' ' || customer_lastname AS customer_name,
                   customer_email, customer_phone,
                   total_amount AS total, status, delivery_method,
                   shipping_city, shipping_commune, shipping_address,
                   order_note, create_account, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut order) = header else {
            return Ok(None);
        };

        order.items = sqlx::query_as::<_, OrderLine>(
            r"
            SELECT oi.product_id, p.name AS product_name, oi.quantity, oi.price AS unit_price
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(order))
    }

    async fn update_order_status(&self, id: OrderId, status: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }
}
