//! The storage guarantees against a real `PostgreSQL` database.
//!
//! Ignored by default. Run with a reachable `DATABASE_URL`:
//!
//! ```bash
//! cargo test -p akwaba-integration-tests --test postgres -- --include-ignored
//! ```

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use akwaba_core::{Email, Money, ProductId, Role};
use akwaba_storefront::db::{
    AccountStore, CatalogStore, OrderStore, PgStore, RepositoryError, Store,
};
use akwaba_storefront::models::{CheckoutRequest, NewAccount, ProductInput};
use akwaba_storefront::services::{CheckoutError, CheckoutService, CommitStage};

fn product(name: &str, price: i64) -> ProductInput {
    ProductInput {
        name: name.to_owned(),
        description: String::new(),
        price: Money::new(Decimal::from(price)),
        stock_quantity: 5,
        image_url: String::new(),
        category_id: None,
    }
}

fn request(items: serde_json::Value, total: i64) -> CheckoutRequest {
    serde_json::from_value(serde_json::json!({
        "first_name": "Aya",
        "last_name": "Traore",
        "email": "aya@example.ci",
        "phone": "0707070707",
        "delivery_method": "pickup",
        "items": items,
        "total": total,
    }))
    .unwrap()
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn committed_order_has_header_and_every_line(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    store.ping().await.unwrap();
    let p1 = store.create_product(&product("Body coton", 10)).await.unwrap();
    let p2 = store.create_product(&product("Bavoir", 5)).await.unwrap();

    let checkout = CheckoutService::new(&store);
    let order_id = checkout
        .place_order(&request(
            serde_json::json!([
                {"id": p1, "quantity": 2, "price": 10},
                {"id": p2, "quantity": 1, "price": 5},
            ]),
            25,
        ))
        .await
        .unwrap();

    let detail = store.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.total, Money::new(Decimal::from(25)));
    assert_eq!(detail.customer_name, "Aya Traore");
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn foreign_key_failure_rolls_back_the_header(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let p1 = store.create_product(&product("Body coton", 10)).await.unwrap();

    let result = CheckoutService::new(&store)
        .place_order(&request(
            serde_json::json!([
                {"id": p1, "quantity": 1, "price": 10},
                {"id": ProductId::new(9_999), "quantity": 1, "price": 5},
            ]),
            15,
        ))
        .await;

    assert!(matches!(
        result,
        Err(CheckoutError::Persistence {
            stage: CommitStage::HeaderInserted,
            ..
        })
    ));
    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(count(&pool, "order_items").await, 0);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn failure_at_any_line_rolls_back_everything(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let mut products = Vec::new();
    for n in 0..4 {
        let id = store
            .create_product(&product(&format!("Produit {n}"), 10))
            .await
            .unwrap();
        products.push(id);
    }
    let missing = ProductId::new(9_999);

    for k in 0..products.len() {
        let lines: Vec<serde_json::Value> = products
            .iter()
            .enumerate()
            .map(|(index, &id)| {
                let id = if index == k { missing } else { id };
                serde_json::json!({"id": id, "quantity": 1, "price": 10})
            })
            .collect();

        let result = CheckoutService::new(&store)
            .place_order(&request(serde_json::Value::Array(lines), 40))
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::Persistence {
                    stage: CommitStage::HeaderInserted,
                    ..
                })
            ),
            "line {}: {result:?}",
            k + 1
        );
        assert_eq!(count(&pool, "orders").await, 0, "line {}", k + 1);
        assert_eq!(count(&pool, "order_items").await, 0, "line {}", k + 1);
    }

    // The pool is still usable after every rollback
    let all: Vec<serde_json::Value> = products
        .iter()
        .map(|&id| serde_json::json!({"id": id, "quantity": 1, "price": 10.5}))
        .collect();
    let order_id = CheckoutService::new(&store)
        .place_order(&request(serde_json::Value::Array(all), 42))
        .await
        .unwrap();
    let detail = store.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(detail.items.len(), 4);
    assert_eq!(detail.items[0].unit_price, Money::new(Decimal::new(105, 1)));
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    let store = PgStore::new(pool);
    let account = NewAccount {
        email: Email::parse("a@x.com").unwrap(),
        password_hash: "hash".to_owned(),
        full_name: "Jean Kouassi".to_owned(),
        phone: String::new(),
        role: Role::Customer,
    };

    store.create_account(&account).await.unwrap();
    let second = store.create_account(&account).await;
    assert!(matches!(second, Err(RepositoryError::Conflict(_))));

    store.set_role(&account.email, Role::Admin).await.unwrap();
    let found = store
        .find_credentials(account.email.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.account.role, Role::Admin);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn referenced_rows_cannot_be_deleted(pool: PgPool) {
    let store = PgStore::new(pool);
    let category = store.create_category("Jouets").await.unwrap();
    store
        .create_subcategory("Peluches", category.id)
        .await
        .unwrap();

    let refused = store.delete_category(category.id).await;
    assert!(matches!(refused, Err(RepositoryError::Conflict(_))));
}
