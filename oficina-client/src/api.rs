//! Remote data access contract
//!
//! [`OficinaApi`] is everything the desk core needs from the server. The
//! network implementation lives here; tests and the cache wrap or fake it.

use async_trait::async_trait;
use shared::client::{LoginRequest, LoginResponse};
use shared::models::{
    Customer, FinancialStatusUpdate, ServiceOrder, ServiceOrderPayload, StatusUpdate, User,
    UserCreate, UserUpdate,
};
use shared::request::OrderFilters;
use shared::response::{Paginated, SequenceNumber};

use crate::{ClientResult, NetworkHttpClient};

/// Service-order API
#[async_trait]
pub trait OficinaApi: Send + Sync {
    // ========== Service orders ==========

    async fn list_orders(&self, filters: &OrderFilters) -> ClientResult<Paginated<ServiceOrder>>;
    async fn get_order(&self, id: &str) -> ClientResult<ServiceOrder>;
    async fn create_order(&self, payload: &ServiceOrderPayload) -> ClientResult<ServiceOrder>;
    async fn update_order(
        &self,
        id: &str,
        payload: &ServiceOrderPayload,
    ) -> ClientResult<ServiceOrder>;
    async fn update_order_status(&self, id: &str, update: &StatusUpdate)
    -> ClientResult<ServiceOrder>;
    async fn update_order_financial_status(
        &self,
        id: &str,
        update: &FinancialStatusUpdate,
    ) -> ClientResult<ServiceOrder>;
    async fn delete_order(&self, id: &str) -> ClientResult<()>;
    async fn get_next_sequence_number(&self) -> ClientResult<SequenceNumber>;

    // ========== Customers ==========

    async fn get_customer_by_id(&self, id: &str) -> ClientResult<Customer>;
    async fn list_customers(&self, search: Option<&str>) -> ClientResult<Vec<Customer>>;

    // ========== Auth ==========

    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse>;
    async fn me(&self) -> ClientResult<User>;
    async fn logout(&self) -> ClientResult<()>;
    /// Install or clear the bearer token used by subsequent requests
    fn set_token(&self, token: Option<String>);

    // ========== Users ==========

    async fn list_users(&self) -> ClientResult<Vec<User>>;
    async fn create_user(&self, payload: &UserCreate) -> ClientResult<User>;
    async fn update_user(&self, id: &str, payload: &UserUpdate) -> ClientResult<User>;
    async fn delete_user(&self, id: &str) -> ClientResult<()>;
}

#[async_trait]
impl OficinaApi for NetworkHttpClient {
    async fn list_orders(&self, filters: &OrderFilters) -> ClientResult<Paginated<ServiceOrder>> {
        self.get_with_query("api/service-orders", &filters.to_query_pairs())
            .await
    }

    async fn get_order(&self, id: &str) -> ClientResult<ServiceOrder> {
        self.get(&format!("api/service-orders/{id}")).await
    }

    async fn create_order(&self, payload: &ServiceOrderPayload) -> ClientResult<ServiceOrder> {
        self.post("api/service-orders", payload).await
    }

    async fn update_order(
        &self,
        id: &str,
        payload: &ServiceOrderPayload,
    ) -> ClientResult<ServiceOrder> {
        self.put(&format!("api/service-orders/{id}"), payload).await
    }

    async fn update_order_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> ClientResult<ServiceOrder> {
        self.patch(&format!("api/service-orders/{id}/status"), update)
            .await
    }

    async fn update_order_financial_status(
        &self,
        id: &str,
        update: &FinancialStatusUpdate,
    ) -> ClientResult<ServiceOrder> {
        self.patch(&format!("api/service-orders/{id}/financial"), update)
            .await
    }

    async fn delete_order(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("api/service-orders/{id}")).await
    }

    async fn get_next_sequence_number(&self) -> ClientResult<SequenceNumber> {
        self.get("api/service-orders/next-number").await
    }

    async fn get_customer_by_id(&self, id: &str) -> ClientResult<Customer> {
        self.get(&format!("api/customers/{id}")).await
    }

    async fn list_customers(&self, search: Option<&str>) -> ClientResult<Vec<Customer>> {
        match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                self.get_with_query("api/customers", &[("search", term)])
                    .await
            }
            None => self.get("api/customers").await,
        }
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self.post("api/auth/login", &req).await?;
        NetworkHttpClient::set_token(self, Some(resp.token.clone()));
        Ok(resp)
    }

    async fn me(&self) -> ClientResult<User> {
        self.get("api/auth/me").await
    }

    async fn logout(&self) -> ClientResult<()> {
        let result = self.post_empty("api/auth/logout").await;
        // The local token is dropped even if the server call failed
        NetworkHttpClient::set_token(self, None);
        result
    }

    fn set_token(&self, token: Option<String>) {
        NetworkHttpClient::set_token(self, token);
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get("api/users").await
    }

    async fn create_user(&self, payload: &UserCreate) -> ClientResult<User> {
        self.post("api/users", payload).await
    }

    async fn update_user(&self, id: &str, payload: &UserUpdate) -> ClientResult<User> {
        self.put(&format!("api/users/{id}"), payload).await
    }

    async fn delete_user(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("api/users/{id}")).await
    }
}
