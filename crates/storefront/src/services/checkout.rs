//! Checkout: turns a validated cart into one order, all or nothing.
//!
//! Each call walks the stages of [`CommitStage`]. Everything up to
//! `Validating` happens without touching storage; from `TransactionOpen` on,
//! any failure rolls the transaction back before the error is returned, and
//! no later write is attempted.

use std::fmt;

use akwaba_core::{Email, Money, OrderId};
use thiserror::Error;

use crate::db::{OrderStore, OrderTransaction, RepositoryError};
use crate::models::{CheckoutRequest, NewOrder, NewOrderItem};

/// Where a checkout is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStage {
    Received,
    Validating,
    TransactionOpen,
    HeaderInserted,
    ItemsInserted,
    Committed,
    RolledBack,
}

impl fmt::Display for CommitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::TransactionOpen => "transaction_open",
            Self::HeaderInserted => "header_inserted",
            Self::ItemsInserted => "items_inserted",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart was refused before any storage access.
    #[error("invalid order: {0}")]
    Invalid(String),

    /// Storage failed after `stage`, the last stage reached. Nothing was written.
    #[error("checkout failed at {stage}: {source}")]
    Persistence {
        stage: CommitStage,
        #[source]
        source: RepositoryError,
    },
}

/// A cart that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub header: NewOrder,
    pub items: Vec<NewOrderItem>,
}

/// Check the cart shape and contact fields.
///
/// Declared totals and unit prices are taken as sent, so each must fit the
/// stored precision exactly.
///
/// # Errors
///
/// Returns `CheckoutError::Invalid` naming the first problem found.
pub fn validate(request: &CheckoutRequest) -> Result<ValidatedOrder, CheckoutError> {
    let invalid = |msg: &str| CheckoutError::Invalid(msg.to_owned());

    if request.items.is_empty() {
        return Err(invalid("order must contain at least one item"));
    }
    for (index, item) in request.items.iter().enumerate() {
        let line = index + 1;
        if !item.id.is_assigned() {
            return Err(CheckoutError::Invalid(format!("item {line}: invalid product id")));
        }
        if item.quantity <= 0 {
            return Err(CheckoutError::Invalid(format!(
                "item {line}: quantity must be positive"
            )));
        }
        if item.price.is_negative() {
            return Err(CheckoutError::Invalid(format!(
                "item {line}: price cannot be negative"
            )));
        }
        if !item.price.is_storable() {
            return Err(CheckoutError::Invalid(format!(
                "item {line}: price must have at most two decimals and fewer than ten digits"
            )));
        }
    }
    if request.total.is_negative() {
        return Err(invalid("total cannot be negative"));
    }
    if !request.total.is_storable() {
        return Err(invalid(
            "total must have at most two decimals and fewer than ten digits",
        ));
    }

    let required = [
        ("first_name", &request.first_name),
        ("last_name", &request.last_name),
        ("phone", &request.phone),
        ("delivery_method", &request.delivery_method),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(CheckoutError::Invalid(format!("{field} is required")));
    }
    let email = Email::parse(&request.email).map_err(|_| invalid("invalid email address"))?;

    let header = NewOrder {
        first_name: request.first_name.trim().to_owned(),
        last_name: request.last_name.trim().to_owned(),
        email,
        phone: request.phone.trim().to_owned(),
        delivery_method: request.delivery_method.trim().to_owned(),
        shipping_city: request.shipping_city.trim().to_owned(),
        shipping_commune: request.shipping_commune.trim().to_owned(),
        shipping_address: request.shipping_address.trim().to_owned(),
        order_note: request.order_note.clone(),
        create_account: request.create_account,
        total: request.total,
    };
    let items = request
        .items
        .iter()
        .map(|item| NewOrderItem {
            product_id: item.id,
            quantity: item.quantity,
            unit_price: item.price,
        })
        .collect();

    Ok(ValidatedOrder { header, items })
}

/// Writes orders through one storage transaction each.
pub struct CheckoutService<'a, S: OrderStore + ?Sized> {
    orders: &'a S,
}

impl<'a, S: OrderStore + ?Sized> CheckoutService<'a, S> {
    #[must_use]
    pub const fn new(orders: &'a S) -> Self {
        Self { orders }
    }

    /// Validate and persist one checkout.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Invalid` before any storage access, or
    /// `CheckoutError::Persistence` after the transaction was rolled back.
    /// A line naming an unknown product is a persistence failure.
    #[tracing::instrument(skip_all, fields(items = request.items.len()))]
    pub async fn place_order(&self, request: &CheckoutRequest) -> Result<OrderId, CheckoutError> {
        tracing::debug!(stage = %CommitStage::Received, "checkout received");
        let order = validate(request)?;
        let computed = computed_total(&order.items);
        if computed != Some(order.header.total) {
            tracing::warn!(
                declared = %order.header.total,
                computed = ?computed.map(|m| m.to_string()),
                "declared total does not match order lines"
            );
        }
        self.commit(&order).await
    }

    /// Persist an already validated order.
    ///
    /// # Errors
    ///
    /// See [`place_order`](Self::place_order).
    pub async fn commit(&self, order: &ValidatedOrder) -> Result<OrderId, CheckoutError> {
        let mut tx = self
            .orders
            .begin()
            .await
            .map_err(|source| CheckoutError::Persistence {
                stage: CommitStage::Validating,
                source,
            })?;

        let order_id = match tx.insert_header(&order.header).await {
            Ok(id) => id,
            Err(e) => return Err(abort(tx, CommitStage::TransactionOpen, e).await),
        };

        for (index, item) in order.items.iter().enumerate() {
            if let Err(e) = tx.insert_item(order_id, item).await {
                tracing::debug!(line = index + 1, product_id = %item.product_id, "order line rejected");
                return Err(abort(tx, CommitStage::HeaderInserted, e).await);
            }
        }

        if let Err(e) = tx.commit().await {
            tracing::warn!(
                stage = %CommitStage::ItemsInserted,
                outcome = %CommitStage::RolledBack,
                error = %e,
                "commit failed"
            );
            return Err(CheckoutError::Persistence {
                stage: CommitStage::ItemsInserted,
                source: e,
            });
        }

        tracing::info!(
            order_id = %order_id,
            stage = %CommitStage::Committed,
            total = %order.header.total,
            lines = order.items.len(),
            "order committed"
        );
        Ok(order_id)
    }
}

/// Sum of `price * quantity` over the validated lines, `None` on overflow.
///
/// Informational only; the declared total is what gets stored.
#[must_use]
pub fn computed_total(items: &[NewOrderItem]) -> Option<Money> {
    items.iter().try_fold(Money::ZERO, |sum, item| {
        sum.checked_add(item.unit_price.checked_mul_quantity(item.quantity)?)
    })
}

/// Roll back after a failure at `stage` and map the cause.
async fn abort(
    tx: Box<dyn OrderTransaction>,
    stage: CommitStage,
    cause: RepositoryError,
) -> CheckoutError {
    if let Err(e) = tx.rollback().await {
        // The connection discards the transaction when it is dropped.
        tracing::error!(error = %e, %stage, "rollback failed");
    }
    tracing::warn!(
        %stage,
        outcome = %CommitStage::RolledBack,
        error = %cause,
        "checkout rolled back"
    );
    CheckoutError::Persistence {
        stage,
        source: cause,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::CartItem;
    use akwaba_core::ProductId;

    fn request(items: Vec<CartItem>, total: i64) -> CheckoutRequest {
        CheckoutRequest {
            first_name: "Jean".to_owned(),
            last_name: "Kouassi".to_owned(),
            email: "jean@example.ci".to_owned(),
            phone: "0102030405".to_owned(),
            delivery_method: "livraison".to_owned(),
            shipping_city: "Abidjan".to_owned(),
            shipping_commune: "Cocody".to_owned(),
            shipping_address: "Rue des Jardins".to_owned(),
            order_note: String::new(),
            create_account: false,
            items,
            total: Money::new(Decimal::from(total)),
        }
    }

    fn item(id: ProductId, quantity: i32, price: i64) -> CartItem {
        CartItem {
            id,
            quantity,
            price: Money::new(Decimal::from(price)),
        }
    }

    async fn store_with_products(count: usize) -> (MemoryStore, Vec<ProductId>) {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for n in 0..count {
            let id = store
                .seed_product(&format!("Produit {n}"), Money::new(Decimal::from(10)))
                .await;
            ids.push(id);
        }
        (store, ids)
    }

    #[test]
    fn test_validation_rejects_bad_carts() {
        let p = ProductId::new(1);
        let cases = [
            request(vec![], 0),
            request(vec![item(p, 0, 10)], 0),
            request(vec![item(p, -1, 10)], 0),
            request(vec![item(p, 1, -10)], 0),
            request(vec![item(p, 1, 10)], -1),
            request(vec![item(ProductId::new(0), 1, 10)], 10),
            request(vec![item(p, 1, 10)], 10_000_000_000_000),
            {
                let mut cart = request(vec![item(p, 1, 10)], 10);
                cart.items[0].price = Money::new(Decimal::new(10_005, 3));
                cart
            },
        ];
        for case in &cases {
            assert!(
                matches!(validate(case), Err(CheckoutError::Invalid(_))),
                "{case:?}"
            );
        }
    }

    #[test]
    fn test_validation_keeps_cents() {
        let p = ProductId::new(1);
        let mut cart = request(vec![item(p, 1, 10)], 10);
        cart.items[0].price = Money::new(Decimal::new(1050, 2));
        cart.total = Money::new(Decimal::new(1050, 2));
        let order = validate(&cart).unwrap();
        assert_eq!(order.items[0].unit_price, Money::new(Decimal::new(1050, 2)));
    }

    #[test]
    fn test_validation_rejects_missing_contact_fields() {
        let p = ProductId::new(1);
        let mut blank = request(vec![item(p, 1, 10)], 10);
        blank.last_name = "  ".to_owned();
        let err = validate(&blank).unwrap_err();
        assert_eq!(err.to_string(), "invalid order: last_name is required");

        let mut bad_email = request(vec![item(p, 1, 10)], 10);
        bad_email.email = "jean".to_owned();
        assert!(matches!(validate(&bad_email), Err(CheckoutError::Invalid(_))));
    }

    #[test]
    fn test_declared_total_is_kept() {
        let p = ProductId::new(1);
        let order = validate(&request(vec![item(p, 2, 10)], 5)).unwrap();
        assert_eq!(order.header.total, Money::new(Decimal::from(5)));
        assert_eq!(
            computed_total(&order.items),
            Some(Money::new(Decimal::from(20)))
        );
    }

    #[tokio::test]
    async fn test_invalid_cart_never_opens_a_transaction() {
        let (store, _) = store_with_products(1).await;
        store.inject_header_failure().await;
        let err = CheckoutService::new(&store)
            .place_order(&request(vec![], 0))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Invalid(_)));
        assert_eq!(store.rollback_count(), 0);
    }

    #[tokio::test]
    async fn test_order_round_trip() {
        let (store, ids) = store_with_products(2).await;
        let cart = request(vec![item(ids[0], 2, 10), item(ids[1], 1, 5)], 25);

        let order_id = CheckoutService::new(&store).place_order(&cart).await.unwrap();

        let detail = store.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(detail.total, Money::new(Decimal::from(25)));
        assert_eq!(detail.status, "pending");
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].product_id, ids[0]);
        assert_eq!(detail.items[0].quantity, 2);
        assert_eq!(detail.items[0].unit_price, Money::new(Decimal::from(10)));
        assert_eq!(detail.items[1].product_id, ids[1]);
        assert_eq!(detail.items[1].quantity, 1);
        assert_eq!(detail.items[1].unit_price, Money::new(Decimal::from(5)));
        assert_eq!(store.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_item_failure_at_any_position_writes_nothing() {
        let lines = 4;
        for k in 1..=lines {
            let (store, ids) = store_with_products(lines).await;
            store.inject_item_failure(k).await;
            let cart = request(ids.iter().map(|&id| item(id, 1, 10)).collect(), 40);

            let err = CheckoutService::new(&store)
                .place_order(&cart)
                .await
                .unwrap_err();

            assert!(
                matches!(
                    err,
                    CheckoutError::Persistence {
                        stage: CommitStage::HeaderInserted,
                        ..
                    }
                ),
                "k={k}: {err:?}"
            );
            assert_eq!(store.order_count().await, 0, "k={k}");
            assert_eq!(store.order_item_count().await, 0, "k={k}");
            assert_eq!(store.rollback_count(), 1, "k={k}");
            assert_eq!(store.open_transactions(), 0, "k={k}");
        }
    }

    #[tokio::test]
    async fn test_header_failure_writes_nothing() {
        let (store, ids) = store_with_products(1).await;
        store.inject_header_failure().await;
        let err = CheckoutService::new(&store)
            .place_order(&request(vec![item(ids[0], 1, 10)], 10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Persistence {
                stage: CommitStage::TransactionOpen,
                ..
            }
        ));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_commit_failure_writes_nothing() {
        let (store, ids) = store_with_products(2).await;
        store.inject_commit_failure().await;
        let err = CheckoutService::new(&store)
            .place_order(&request(vec![item(ids[0], 1, 10), item(ids[1], 1, 10)], 20))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Persistence {
                stage: CommitStage::ItemsInserted,
                ..
            }
        ));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.order_item_count().await, 0);
        assert_eq!(store.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_writes_nothing() {
        let (store, ids) = store_with_products(1).await;
        let cart = request(vec![item(ids[0], 1, 10), item(ProductId::new(999), 1, 10)], 20);
        let err = CheckoutService::new(&store)
            .place_order(&cart)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Persistence {
                stage: CommitStage::HeaderInserted,
                source: RepositoryError::Conflict(_),
            }
        ));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.order_item_count().await, 0);
    }

    #[tokio::test]
    async fn test_store_recovers_after_fault_is_cleared() {
        let (store, ids) = store_with_products(1).await;
        store.inject_item_failure(1).await;
        let cart = request(vec![item(ids[0], 1, 10)], 10);
        assert!(CheckoutService::new(&store).place_order(&cart).await.is_err());

        store.clear_faults().await;
        let order_id = CheckoutService::new(&store).place_order(&cart).await.unwrap();
        assert_eq!(store.items_for_order(order_id).await, 1);
        assert_eq!(store.order_count().await, 1);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(CommitStage::HeaderInserted.to_string(), "header_inserted");
        assert_eq!(CommitStage::RolledBack.to_string(), "rolled_back");
    }
}
