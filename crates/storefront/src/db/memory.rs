//! In-memory storage for tests.
//!
//! Mirrors the constraints of the `PostgreSQL` schema that the HTTP layer
//! relies on: unique account emails, foreign keys from order lines to
//! products and from subcategories to categories, and transactional
//! checkout. Checkout writes are staged on the transaction and only become
//! visible on commit.
//!
//! Failures can be injected into the checkout path to exercise rollback:
//!
//! ```rust,ignore
//! let store = MemoryStore::new();
//! store.inject_item_failure(2).await; // second line of every checkout fails
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use akwaba_core::{
    AccountId, ArticleId, CategoryId, ContactMessageId, Email, Money, OrderId, ProductId, Role,
    SubcategoryId,
};

use super::{
    AccountStore, CatalogStore, ContentStore, OrderStore, OrderTransaction, RepositoryError, Store,
};
use crate::models::{
    Account, AccountCredentials, Article, ArticleInput, Category, ContactMessage, NewAccount,
    NewContactMessage, NewOrder, NewOrderItem, OrderDetail, OrderLine, OrderSummary, Product,
    ProductInput, Subcategory,
};
use crate::models::order::INITIAL_STATUS;

/// Checkout failures to inject, applied to every transaction opened while set.
#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    header: bool,
    /// 1-based index of the order line whose insert fails.
    item: Option<usize>,
    commit: bool,
}

#[derive(Debug, Clone)]
struct StoredOrder {
    id: OrderId,
    order: NewOrder,
    status: String,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct StoredItem {
    order_id: OrderId,
    item: NewOrderItem,
}

#[derive(Debug, Default)]
struct Sequences {
    account: i32,
    order: i32,
    category: i32,
    subcategory: i32,
    product: i32,
    article: i32,
    contact: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct Tables {
    accounts: BTreeMap<AccountId, (Account, String)>,
    orders: BTreeMap<OrderId, StoredOrder>,
    order_items: Vec<StoredItem>,
    categories: BTreeMap<CategoryId, Category>,
    subcategories: BTreeMap<SubcategoryId, Subcategory>,
    products: BTreeMap<ProductId, Product>,
    articles: Vec<Article>,
    contact_messages: Vec<ContactMessage>,
    sequences: Sequences,
    faults: Faults,
}

impl Tables {
    fn summary(order: &StoredOrder) -> OrderSummary {
        OrderSummary {
            id: order.id,
            customer_name: format!("{} {}", order.order.first_name, order.order.last_name),
            total: order.order.total,
            status: order.status.clone(),
            delivery_method: order.order.delivery_method.clone(),
            created_at: order.created_at,
        }
    }

    fn newest_first<'a>(orders: impl Iterator<Item = &'a StoredOrder>) -> Vec<OrderSummary> {
        let mut orders: Vec<&StoredOrder> = orders.collect();
        orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        orders.into_iter().map(Self::summary).collect()
    }
}

/// Storage held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    open_transactions: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
    credential_lookups: Arc<AtomicUsize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the header insert of every following checkout fail.
    pub async fn inject_header_failure(&self) {
        self.tables.lock().await.faults.header = true;
    }

    /// Make the `line`-th (1-based) item insert of every following checkout fail.
    pub async fn inject_item_failure(&self, line: usize) {
        self.tables.lock().await.faults.item = Some(line);
    }

    /// Make the commit of every following checkout fail.
    pub async fn inject_commit_failure(&self) {
        self.tables.lock().await.faults.commit = true;
    }

    pub async fn clear_faults(&self) {
        self.tables.lock().await.faults = Faults::default();
    }

    /// Number of committed order headers.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    /// Number of committed order lines, across all orders.
    pub async fn order_item_count(&self) -> usize {
        self.tables.lock().await.order_items.len()
    }

    /// Number of committed order lines referencing `order_id`.
    pub async fn items_for_order(&self, order_id: OrderId) -> usize {
        self.tables
            .lock()
            .await
            .order_items
            .iter()
            .filter(|stored| stored.order_id == order_id)
            .count()
    }

    /// Checkout transactions begun and not yet committed, rolled back or dropped.
    #[must_use]
    pub fn open_transactions(&self) -> usize {
        self.open_transactions.load(Ordering::SeqCst)
    }

    /// Explicit rollbacks performed so far.
    #[must_use]
    pub fn rollback_count(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Credential lookups performed so far.
    #[must_use]
    pub fn credential_lookup_count(&self) -> usize {
        self.credential_lookups.load(Ordering::SeqCst)
    }

    /// Insert a product directly, bypassing validation.
    pub async fn seed_product(&self, name: &str, price: Money) -> ProductId {
        let mut tables = self.tables.lock().await;
        let id = ProductId::new(next_id(&mut tables.sequences.product));
        tables.products.insert(
            id,
            Product {
                id,
                name: name.to_owned(),
                description: String::new(),
                price,
                stock_quantity: 10,
                image_url: String::new(),
                category_id: None,
            },
        );
        id
    }
}

// =============================================================================
// Checkout transaction
// =============================================================================

/// A staged checkout. Nothing is visible to readers until [`commit`].
///
/// [`commit`]: OrderTransaction::commit
pub struct MemoryOrderTransaction {
    tables: Arc<Mutex<Tables>>,
    open_transactions: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
    faults: Faults,
    header: Option<StoredOrder>,
    items: Vec<StoredItem>,
}

fn injected(what: &str) -> RepositoryError {
    RepositoryError::Database(sqlx::Error::Protocol(format!("injected {what} failure")))
}

#[async_trait]
impl OrderTransaction for MemoryOrderTransaction {
    async fn insert_header(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        if self.faults.header {
            return Err(injected("header"));
        }
        // Sequences advance even when the transaction later rolls back
        let id = OrderId::new(next_id(&mut self.tables.lock().await.sequences.order));
        self.header = Some(StoredOrder {
            id,
            order: order.clone(),
            status: INITIAL_STATUS.to_owned(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn insert_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<(), RepositoryError> {
        let line = self.items.len() + 1;
        if self.faults.item == Some(line) {
            return Err(injected("order item"));
        }
        if self.header.as_ref().map(|h| h.id) != Some(order_id) {
            return Err(RepositoryError::Conflict("unknown order".to_owned()));
        }
        if !self.tables.lock().await.products.contains_key(&item.product_id) {
            return Err(RepositoryError::Conflict(
                "order line references an unknown product".to_owned(),
            ));
        }
        self.items.push(StoredItem {
            order_id,
            item: *item,
        });
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), RepositoryError> {
        if self.faults.commit {
            return Err(injected("commit"));
        }
        let header = self.header.take();
        let items = std::mem::take(&mut self.items);
        let mut tables = self.tables.lock().await;
        if let Some(header) = header {
            tables.orders.insert(header.id, header);
        }
        tables.order_items.extend(items);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MemoryOrderTransaction {
    fn drop(&mut self) {
        self.open_transactions.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Store implementations
// =============================================================================

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables
            .accounts
            .values()
            .any(|(existing, _)| existing.email == account.email)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let id = AccountId::new(next_id(&mut tables.sequences.account));
        let created = Account {
            id,
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            phone: account.phone.clone(),
            role: account.role,
            created_at: Utc::now(),
        };
        tables
            .accounts
            .insert(id, (created.clone(), account.password_hash.clone()));
        Ok(created)
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, RepositoryError> {
        self.credential_lookups.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        Ok(tables
            .accounts
            .values()
            .find(|(account, _)| account.email.as_str() == email)
            .map(|(account, hash)| AccountCredentials {
                account: account.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.get(&id).map(|(account, _)| account.clone()))
    }

    async fn update_profile(
        &self,
        id: AccountId,
        full_name: &str,
        phone: &str,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let (account, _) = tables
            .accounts
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        full_name.clone_into(&mut account.full_name);
        phone.clone_into(&mut account.phone);
        Ok(())
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let (account, _) = tables
            .accounts
            .values_mut()
            .find(|(account, _)| &account.email == email)
            .ok_or(RepositoryError::NotFound)?;
        account.role = role;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, RepositoryError> {
        let faults = self.tables.lock().await.faults;
        self.open_transactions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryOrderTransaction {
            tables: Arc::clone(&self.tables),
            open_transactions: Arc::clone(&self.open_transactions),
            rollbacks: Arc::clone(&self.rollbacks),
            faults,
            header: None,
            items: Vec::new(),
        }))
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(Tables::newest_first(tables.orders.values()))
    }

    async fn list_orders_for_email(
        &self,
        email: &Email,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(Tables::newest_first(
            tables.orders.values().filter(|o| &o.order.email == email),
        ))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let tables = self.tables.lock().await;
        let Some(stored) = tables.orders.get(&id) else {
            return Ok(None);
        };

        let items = tables
            .order_items
            .iter()
            .filter(|line| line.order_id == id)
            .map(|line| {
                let product_name = tables
                    .products
                    .get(&line.item.product_id)
                    .map(|p| p.name.clone())
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "order {id} references missing product {}",
                            line.item.product_id
                        ))
                    })?;
                Ok(OrderLine {
                    product_id: line.item.product_id,
                    product_name,
                    quantity: line.item.quantity,
                    unit_price: line.item.unit_price,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let order = &stored.order;
        Ok(Some(OrderDetail {
            id,
            customer_name: format!("{} {}", order.first_name, order.last_name),
            customer_email: order.email.to_string(),
            customer_phone: order.phone.clone(),
            total: order.total,
            status: stored.status.clone(),
            delivery_method: order.delivery_method.clone(),
            shipping_city: order.shipping_city.clone(),
            shipping_commune: order.shipping_commune.clone(),
            shipping_address: order.shipping_address.clone(),
            order_note: order.order_note.clone(),
            create_account: order.create_account,
            created_at: stored.created_at,
            items,
        }))
    }

    async fn update_order_status(&self, id: OrderId, status: &str) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let order = tables.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        status.clone_into(&mut order.status);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.tables.lock().await.categories.values().cloned().collect())
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let id = CategoryId::new(next_id(&mut tables.sequences.category));
        let category = Category {
            id,
            name: name.to_owned(),
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        name.clone_into(&mut category.name);
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let referenced = tables.subcategories.values().any(|s| s.category_id == id)
            || tables.products.values().any(|p| p.category_id == Some(id));
        if referenced {
            return Err(RepositoryError::Conflict("category is still in use".to_owned()));
        }
        tables
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .subcategories
            .values()
            .filter(|s| s.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn create_subcategory(
        &self,
        name: &str,
        category_id: CategoryId,
    ) -> Result<Subcategory, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.categories.contains_key(&category_id) {
            return Err(RepositoryError::Conflict("unknown category".to_owned()));
        }
        let id = SubcategoryId::new(next_id(&mut tables.sequences.subcategory));
        let subcategory = Subcategory {
            id,
            name: name.to_owned(),
            category_id,
        };
        tables.subcategories.insert(id, subcategory.clone());
        Ok(subcategory)
    }

    async fn rename_subcategory(
        &self,
        id: SubcategoryId,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let subcategory = tables
            .subcategories
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        name.clone_into(&mut subcategory.name);
        Ok(())
    }

    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables
            .subcategories
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.tables.lock().await.products.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn create_product(&self, product: &ProductInput) -> Result<ProductId, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(category_id) = product.category_id
            && !tables.categories.contains_key(&category_id)
        {
            return Err(RepositoryError::Conflict("unknown category".to_owned()));
        }
        let id = ProductId::new(next_id(&mut tables.sequences.product));
        tables.products.insert(id, product_row(id, product));
        Ok(id)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &ProductInput,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(category_id) = product.category_id
            && !tables.categories.contains_key(&category_id)
        {
            return Err(RepositoryError::Conflict("unknown category".to_owned()));
        }
        let row = tables.products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        *row = product_row(id, product);
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.order_items.iter().any(|s| s.item.product_id == id) {
            return Err(RepositoryError::Conflict(
                "product is referenced by orders".to_owned(),
            ));
        }
        tables
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

fn product_row(id: ProductId, product: &ProductInput) -> Product {
    Product {
        id,
        name: product.name.trim().to_owned(),
        description: product.description.clone(),
        price: product.price,
        stock_quantity: product.stock_quantity,
        image_url: product.image_url.clone(),
        category_id: product.category_id,
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError> {
        let mut articles = self.tables.lock().await.articles.clone();
        articles.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(articles)
    }

    async fn create_article(&self, article: &ArticleInput) -> Result<Article, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let created = Article {
            id: ArticleId::new(next_id(&mut tables.sequences.article)),
            title: article.title.trim().to_owned(),
            content: article.content.clone(),
            image_url: article.image_url.clone(),
            created_at: Utc::now(),
        };
        tables.articles.push(created.clone());
        Ok(created)
    }

    async fn create_contact_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessageId, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let id = ContactMessageId::new(next_id(&mut tables.sequences.contact));
        tables.contact_messages.push(ContactMessage {
            id,
            full_name: message.full_name.clone(),
            email: message.email.to_string(),
            subject: message.subject.clone(),
            message: message.message.clone(),
            is_read: false,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let mut messages = self.tables.lock().await.contact_messages.clone();
        messages.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(messages)
    }

    async fn mark_contact_message_read(
        &self,
        id: ContactMessageId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let message = tables
            .contact_messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RepositoryError::NotFound)?;
        message.is_read = true;
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn order() -> NewOrder {
        NewOrder {
            first_name: "Jean".to_owned(),
            last_name: "Kouassi".to_owned(),
            email: Email::parse("a@x.com").unwrap(),
            phone: "0102".to_owned(),
            delivery_method: "livraison".to_owned(),
            shipping_city: "Abidjan".to_owned(),
            shipping_commune: "Cocody".to_owned(),
            shipping_address: "Rue 12".to_owned(),
            order_note: String::new(),
            create_account: false,
            total: Money::new(Decimal::from(10)),
        }
    }

    fn line(product_id: ProductId) -> NewOrderItem {
        NewOrderItem {
            product_id,
            quantity: 1,
            unit_price: Money::new(Decimal::from(10)),
        }
    }

    #[tokio::test]
    async fn test_staged_rows_are_invisible_until_commit() {
        let store = MemoryStore::new();
        let product = store.seed_product("Body", Money::new(Decimal::from(10))).await;

        let mut tx = store.begin().await.unwrap();
        let id = tx.insert_header(&order()).await.unwrap();
        tx.insert_item(id, &line(product)).await.unwrap();
        assert!(store.get_order(id).await.unwrap().is_none());
        assert_eq!(store.open_transactions(), 1);

        tx.commit().await.unwrap();
        assert_eq!(store.get_order(id).await.unwrap().unwrap().items.len(), 1);
        assert_eq!(store.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        let product = store.seed_product("Body", Money::new(Decimal::from(10))).await;
        {
            let mut tx = store.begin().await.unwrap();
            let id = tx.insert_header(&order()).await.unwrap();
            tx.insert_item(id, &line(product)).await.unwrap();
        }
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.order_item_count().await, 0);
        assert_eq!(store.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_a_conflict() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let id = tx.insert_header(&order()).await.unwrap();
        let err = tx.insert_item(id, &line(ProductId::new(99))).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        let account = NewAccount {
            email: Email::parse("a@x.com").unwrap(),
            password_hash: "hash".to_owned(),
            full_name: "Jean Kouassi".to_owned(),
            phone: "0102".to_owned(),
            role: Role::Customer,
        };
        store.create_account(&account).await.unwrap();
        let err = store.create_account(&account).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // Emails compare exactly as stored
        let other_case = NewAccount {
            email: Email::parse("A@x.com").unwrap(),
            ..account
        };
        assert!(store.create_account(&other_case).await.is_ok());
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let store = MemoryStore::new();
        let category = store.create_category("Jouets").await.unwrap();
        store
            .create_subcategory("Peluches", category.id)
            .await
            .unwrap();
        let err = store.delete_category(category.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
