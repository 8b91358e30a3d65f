//! Client-side query cache
//!
//! Entries are keyed by entity + id (orders, customers) or entity + filter
//! key (order lists). Every write patches the affected order entry and
//! drops all cached lists, since any list page may contain the order.
//!
//! Reads record the cache generation before going to the server and only
//! store their result if no write or invalidation happened meanwhile, so a
//! slow read can never put back data a write already replaced.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared::client::LoginResponse;
use shared::models::{
    Customer, FinancialStatusUpdate, ServiceOrder, ServiceOrderPayload, StatusUpdate, User,
    UserCreate, UserUpdate,
};
use shared::request::OrderFilters;
use shared::response::{Paginated, SequenceNumber};

use crate::{ClientResult, OficinaApi};

/// Caching decorator over any [`OficinaApi`]
pub struct CachedApi<A> {
    inner: A,
    orders: DashMap<String, ServiceOrder>,
    order_lists: DashMap<String, Paginated<ServiceOrder>>,
    customers: DashMap<String, Customer>,
    /// Bumped by every write and invalidation; guards read-side inserts
    generation: Mutex<u64>,
}

impl<A: OficinaApi> CachedApi<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            orders: DashMap::new(),
            order_lists: DashMap::new(),
            customers: DashMap::new(),
            generation: Mutex::new(0),
        }
    }

    /// Access the wrapped API
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Drop every cached entry
    pub fn invalidate_all(&self) {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.orders.clear();
        self.order_lists.clear();
        self.customers.clear();
    }

    /// Current generation, taken before a read goes to the server
    fn current_generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Run `insert` only if the cache is still at `seen`
    fn insert_if_current(&self, seen: u64, insert: impl FnOnce()) -> bool {
        let generation = self.generation.lock();
        if *generation == seen {
            insert();
            true
        } else {
            tracing::debug!(seen, current = *generation, "Dropping read that raced a write");
            false
        }
    }

    /// Cached entry counts: (orders, order lists, customers)
    pub fn stats(&self) -> (usize, usize, usize) {
        (self.orders.len(), self.order_lists.len(), self.customers.len())
    }

    fn store_order(&self, order: &ServiceOrder) {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.orders.insert(order.id.clone(), order.clone());
        self.order_lists.clear();
    }
}

#[async_trait]
impl<A: OficinaApi> OficinaApi for CachedApi<A> {
    async fn list_orders(&self, filters: &OrderFilters) -> ClientResult<Paginated<ServiceOrder>> {
        let key = filters.cache_key();
        if let Some(hit) = self.order_lists.get(&key) {
            tracing::debug!(key = %key, "order list cache hit");
            return Ok(hit.clone());
        }
        let seen = self.current_generation();
        let page = self.inner.list_orders(filters).await?;
        self.insert_if_current(seen, || {
            self.order_lists.insert(key, page.clone());
        });
        Ok(page)
    }

    async fn get_order(&self, id: &str) -> ClientResult<ServiceOrder> {
        if let Some(hit) = self.orders.get(id) {
            tracing::debug!(order_id = %id, "order cache hit");
            return Ok(hit.clone());
        }
        let seen = self.current_generation();
        let order = self.inner.get_order(id).await?;
        self.insert_if_current(seen, || {
            self.orders.insert(order.id.clone(), order.clone());
        });
        Ok(order)
    }

    async fn create_order(&self, payload: &ServiceOrderPayload) -> ClientResult<ServiceOrder> {
        let order = self.inner.create_order(payload).await?;
        self.store_order(&order);
        Ok(order)
    }

    async fn update_order(
        &self,
        id: &str,
        payload: &ServiceOrderPayload,
    ) -> ClientResult<ServiceOrder> {
        let order = self.inner.update_order(id, payload).await?;
        self.store_order(&order);
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> ClientResult<ServiceOrder> {
        let order = self.inner.update_order_status(id, update).await?;
        self.store_order(&order);
        Ok(order)
    }

    async fn update_order_financial_status(
        &self,
        id: &str,
        update: &FinancialStatusUpdate,
    ) -> ClientResult<ServiceOrder> {
        let order = self.inner.update_order_financial_status(id, update).await?;
        self.store_order(&order);
        Ok(order)
    }

    async fn delete_order(&self, id: &str) -> ClientResult<()> {
        self.inner.delete_order(id).await?;
        {
            let mut generation = self.generation.lock();
            *generation += 1;
            self.orders.remove(id);
            self.order_lists.clear();
        }
        Ok(())
    }

    async fn get_next_sequence_number(&self) -> ClientResult<SequenceNumber> {
        // Changes with every create, never cached
        self.inner.get_next_sequence_number().await
    }

    async fn get_customer_by_id(&self, id: &str) -> ClientResult<Customer> {
        if let Some(hit) = self.customers.get(id) {
            return Ok(hit.clone());
        }
        let seen = self.current_generation();
        let customer = self.inner.get_customer_by_id(id).await?;
        self.insert_if_current(seen, || {
            self.customers.insert(customer.id.clone(), customer.clone());
        });
        Ok(customer)
    }

    async fn list_customers(&self, search: Option<&str>) -> ClientResult<Vec<Customer>> {
        let seen = self.current_generation();
        let customers = self.inner.list_customers(search).await?;
        self.insert_if_current(seen, || {
            for customer in &customers {
                self.customers.insert(customer.id.clone(), customer.clone());
            }
        });
        Ok(customers)
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let resp = self.inner.login(email, password).await?;
        // A different user may see different data
        self.invalidate_all();
        Ok(resp)
    }

    async fn me(&self) -> ClientResult<User> {
        self.inner.me().await
    }

    async fn logout(&self) -> ClientResult<()> {
        self.invalidate_all();
        self.inner.logout().await
    }

    fn set_token(&self, token: Option<String>) {
        // Cached data belongs to whoever held the previous token
        self.invalidate_all();
        self.inner.set_token(token);
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn create_user(&self, payload: &UserCreate) -> ClientResult<User> {
        self.inner.create_user(payload).await
    }

    async fn update_user(&self, id: &str, payload: &UserUpdate) -> ClientResult<User> {
        self.inner.update_user(id, payload).await
    }

    async fn delete_user(&self, id: &str) -> ClientResult<()> {
        self.inner.delete_user(id).await
    }
}
