//! In-memory [`OficinaApi`] for unit tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use oficina_client::{ClientError, ClientResult, OficinaApi};
use parking_lot::Mutex;
use shared::client::LoginResponse;
use shared::models::{
    Customer, FinancialStatusUpdate, ServiceOrder, ServiceOrderPayload, StatusUpdate, User,
    UserCreate, UserRole, UserUpdate,
};
use shared::order::TechnicalStatus;
use shared::request::OrderFilters;
use shared::response::{Paginated, SequenceNumber};

pub fn sample_order(id: &str, status: TechnicalStatus) -> ServiceOrder {
    let mut order: ServiceOrder = serde_json::from_value(serde_json::json!({
        "id": id,
        "orderNumber": 1,
        "customerId": "c-1",
        "equipment": "Micro-ondas",
        "entryDate": "2024-06-01"
    }))
    .unwrap();
    order.status = status;
    order
}

pub fn sample_customer(id: &str, name: &str) -> Customer {
    serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap()
}

pub fn sample_user() -> User {
    User {
        id: "u-1".into(),
        name: "Ana".into(),
        email: "ana@oficina.com".into(),
        role: UserRole::Admin,
        is_active: true,
    }
}

#[derive(Default)]
struct State {
    orders: HashMap<String, ServiceOrder>,
    customers: HashMap<String, Customer>,
    created: Vec<ServiceOrderPayload>,
    updated: Vec<(String, ServiceOrderPayload)>,
    status_updates: Vec<(String, StatusUpdate)>,
    list_queries: Vec<OrderFilters>,
    customer_delays: HashMap<String, Duration>,
    write_delay: Option<Duration>,
    token: Option<String>,
    next_number: i64,
}

/// Fake server backed by maps; cheap to clone, clones share state
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<State>>,
    fail_writes: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: ServiceOrder) {
        self.state.lock().orders.insert(order.id.clone(), order);
    }

    pub fn insert_customer(&self, customer: Customer) {
        self.state
            .lock()
            .customers
            .insert(customer.id.clone(), customer);
    }

    /// Delay the lookup of one customer
    pub fn delay_customer(&self, id: &str, delay: Duration) {
        self.state
            .lock()
            .customer_delays
            .insert(id.to_string(), delay);
    }

    /// Delay every create / update response
    pub fn delay_writes(&self, delay: Duration) {
        self.state.lock().write_delay = Some(delay);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Total number of API calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<ServiceOrderPayload> {
        self.state.lock().created.clone()
    }

    pub fn updated(&self) -> Vec<(String, ServiceOrderPayload)> {
        self.state.lock().updated.clone()
    }

    pub fn status_updates(&self) -> Vec<(String, StatusUpdate)> {
        self.state.lock().status_updates.clone()
    }

    pub fn list_queries(&self) -> Vec<OrderFilters> {
        self.state.lock().list_queries.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.lock().token.clone()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn check_write(&self) -> ClientResult<()> {
        let delay = self.state.lock().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(ClientError::Internal("500 Internal Server Error: db down".into()))
        } else {
            Ok(())
        }
    }

    fn get_stored(&self, id: &str) -> ClientResult<ServiceOrder> {
        self.state
            .lock()
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("order {id}")))
    }
}

fn materialize(id: String, number: i64, payload: &ServiceOrderPayload) -> ServiceOrder {
    let mut value = serde_json::to_value(payload).unwrap();
    value["id"] = serde_json::json!(id);
    value["orderNumber"] = serde_json::json!(number);
    serde_json::from_value(value).unwrap()
}

#[async_trait]
impl OficinaApi for FakeApi {
    async fn list_orders(&self, filters: &OrderFilters) -> ClientResult<Paginated<ServiceOrder>> {
        self.hit();
        let mut state = self.state.lock();
        state.list_queries.push(filters.clone());
        let mut data: Vec<ServiceOrder> = state
            .orders
            .values()
            .filter(|o| filters.status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        data.sort_by_key(|o| o.order_number);
        let total = data.len() as u64;
        Ok(Paginated::new(data, total, filters.page, filters.limit))
    }

    async fn get_order(&self, id: &str) -> ClientResult<ServiceOrder> {
        self.hit();
        self.get_stored(id)
    }

    async fn create_order(&self, payload: &ServiceOrderPayload) -> ClientResult<ServiceOrder> {
        self.hit();
        self.check_write().await?;
        let mut state = self.state.lock();
        state.next_number += 1;
        let number = state.next_number;
        let order = materialize(format!("os-{number}"), number, payload);
        state.created.push(payload.clone());
        state.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn update_order(
        &self,
        id: &str,
        payload: &ServiceOrderPayload,
    ) -> ClientResult<ServiceOrder> {
        self.hit();
        self.check_write().await?;
        let number = self.get_stored(id)?.order_number;
        let order = materialize(id.to_string(), number, payload);
        let mut state = self.state.lock();
        state.updated.push((id.to_string(), payload.clone()));
        state.orders.insert(id.to_string(), order.clone());
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> ClientResult<ServiceOrder> {
        self.hit();
        self.check_write().await?;
        let mut order = self.get_stored(id)?;
        order.status = update.status;
        order.approval_date = update.approval_date;
        order.delivery_date = update.delivery_date;
        order.expected_delivery_date = update.expected_delivery_date;
        let mut state = self.state.lock();
        state.status_updates.push((id.to_string(), update.clone()));
        state.orders.insert(id.to_string(), order.clone());
        Ok(order)
    }

    async fn update_order_financial_status(
        &self,
        id: &str,
        update: &FinancialStatusUpdate,
    ) -> ClientResult<ServiceOrder> {
        self.hit();
        self.check_write().await?;
        let mut order = self.get_stored(id)?;
        order.financial = update.financial;
        self.insert_order(order.clone());
        Ok(order)
    }

    async fn delete_order(&self, id: &str) -> ClientResult<()> {
        self.hit();
        self.check_write().await?;
        self.state
            .lock()
            .orders
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound(format!("order {id}")))
    }

    async fn get_next_sequence_number(&self) -> ClientResult<SequenceNumber> {
        self.hit();
        let current = self.state.lock().next_number;
        Ok(SequenceNumber {
            current_number: current,
            exists: current > 0,
        })
    }

    async fn get_customer_by_id(&self, id: &str) -> ClientResult<Customer> {
        self.hit();
        let delay = self.state.lock().customer_delays.get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.state
            .lock()
            .customers
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("customer {id}")))
    }

    async fn list_customers(&self, search: Option<&str>) -> ClientResult<Vec<Customer>> {
        self.hit();
        let needle = search.unwrap_or_default().to_lowercase();
        let mut customers: Vec<Customer> = self
            .state
            .lock()
            .customers
            .values()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        self.hit();
        if password != "secret" {
            return Err(ClientError::Unauthorized);
        }
        let mut user = sample_user();
        user.email = email.to_string();
        self.set_token(Some("tok-1".into()));
        Ok(LoginResponse {
            token: "tok-1".into(),
            user,
        })
    }

    async fn me(&self) -> ClientResult<User> {
        self.hit();
        match self.token() {
            Some(_) => Ok(sample_user()),
            None => Err(ClientError::Unauthorized),
        }
    }

    async fn logout(&self) -> ClientResult<()> {
        self.hit();
        self.set_token(None);
        Ok(())
    }

    fn set_token(&self, token: Option<String>) {
        self.state.lock().token = token;
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.hit();
        Ok(vec![sample_user()])
    }

    async fn create_user(&self, payload: &UserCreate) -> ClientResult<User> {
        self.hit();
        Ok(User {
            id: "u-2".into(),
            name: payload.name.clone(),
            email: payload.email.clone(),
            role: payload.role,
            is_active: true,
        })
    }

    async fn update_user(&self, id: &str, payload: &UserUpdate) -> ClientResult<User> {
        self.hit();
        let mut user = sample_user();
        user.id = id.to_string();
        if let Some(name) = &payload.name {
            user.name = name.clone();
        }
        Ok(user)
    }

    async fn delete_user(&self, _id: &str) -> ClientResult<()> {
        self.hit();
        Ok(())
    }
}

/// Convenience for date literals in tests
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
