//! Order list view state
//!
//! - Filters are persisted under [`keys::ORDER_FILTERS`] and restored with
//!   the page reset to 1; an empty filter set removes the key.
//! - Every fetch carries a ticket. A result is applied only if its ticket
//!   is still the latest one, so a slow response can never overwrite a
//!   newer one or a closed view.
//! - Rows without a customer snapshot get their names from concurrent
//!   lookups; each lookup fills only its own rows.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use oficina_client::{ClientResult, OficinaApi};
use shared::models::ServiceOrder;
use shared::order::{FinancialStatus, TechnicalStatus};
use shared::request::OrderFilters;
use shared::response::Paginated;

use crate::notify::Notification;
use crate::status::StatusUpdater;
use crate::storage::{LocalStore, keys};

/// Fetch generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Completed fetch, waiting to be applied
#[derive(Debug)]
pub struct Fetched {
    ticket: Ticket,
    result: ClientResult<Paginated<ServiceOrder>>,
}

#[derive(Debug, Clone)]
pub struct OrderRow {
    pub order: ServiceOrder,
    pub customer_name: Option<String>,
}

impl From<ServiceOrder> for OrderRow {
    fn from(order: ServiceOrder) -> Self {
        let customer_name = order.customer_name().map(str::to_string);
        Self {
            order,
            customer_name,
        }
    }
}

pub struct OrderBoard<A: OficinaApi + ?Sized> {
    api: Arc<A>,
    store: Arc<LocalStore>,
    filters: OrderFilters,
    rows: Vec<OrderRow>,
    total: u64,
    total_pages: u32,
    latest: AtomicU64,
}

impl<A: OficinaApi + ?Sized + 'static> OrderBoard<A> {
    /// Open the view, restoring saved filters
    pub fn open(api: Arc<A>, store: Arc<LocalStore>) -> Self {
        let filters = match store.get::<OrderFilters>(keys::ORDER_FILTERS) {
            Some(saved) => OrderFilters { page: 1, ..saved },
            None => OrderFilters::default(),
        };
        Self {
            api,
            store,
            filters,
            rows: Vec::new(),
            total: 0,
            total_pages: 0,
            latest: AtomicU64::new(0),
        }
    }

    pub fn filters(&self) -> &OrderFilters {
        &self.filters
    }

    pub fn rows(&self) -> &[OrderRow] {
        &self.rows
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    // ========== Filters ==========

    /// Replace the filters; pagination restarts at page 1
    pub fn set_filters(&mut self, filters: OrderFilters) {
        self.filters = OrderFilters { page: 1, ..filters };
        self.persist_filters();
    }

    pub fn set_page(&mut self, page: u32) {
        self.filters.page = page.max(1);
        self.persist_filters();
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(OrderFilters {
            limit: self.filters.limit,
            ..OrderFilters::default()
        });
    }

    fn persist_filters(&self) {
        let result = if self.filters.is_empty() {
            self.store.remove(keys::ORDER_FILTERS)
        } else {
            self.store.set(keys::ORDER_FILTERS, &self.filters)
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist list filters");
        }
    }

    // ========== Fetching ==========

    fn next_ticket(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Start a fetch for the current filters.
    ///
    /// The returned future owns everything it needs; apply its output with
    /// [`apply`](Self::apply).
    pub fn fetch(&self) -> impl Future<Output = Fetched> + Send + use<A> {
        let ticket = self.next_ticket();
        let api = self.api.clone();
        let filters = self.filters.clone();
        async move {
            let result = api.list_orders(&filters).await;
            Fetched { ticket, result }
        }
    }

    /// Apply a fetch result; returns `false` when it was stale and dropped
    pub fn apply(&mut self, fetched: Fetched) -> Result<bool, Notification> {
        if !self.is_current(fetched.ticket) {
            tracing::debug!(ticket = fetched.ticket.0, "Discarding stale order list");
            return Ok(false);
        }
        match fetched.result {
            Ok(page) => {
                self.total = page.total;
                self.total_pages = page.total_pages;
                self.rows = page.data.into_iter().map(OrderRow::from).collect();
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load service orders");
                Err(Notification::error(e.user_message()))
            }
        }
    }

    /// Fetch, apply and resolve missing customer names
    pub async fn refresh(&mut self) -> Result<(), Notification> {
        let fetched = self.fetch().await;
        if self.apply(fetched)? {
            self.load_customer_names().await;
        }
        Ok(())
    }

    /// Invalidate any in-flight fetch
    pub fn close(&self) {
        self.next_ticket();
    }

    /// Look up names for rows without a customer snapshot, concurrently
    pub async fn load_customer_names(&mut self) {
        let missing: BTreeSet<String> = self
            .rows
            .iter()
            .filter(|row| row.customer_name.is_none() && !row.order.customer_id.is_empty())
            .map(|row| row.order.customer_id.clone())
            .collect();
        if missing.is_empty() {
            return;
        }

        let api = &self.api;
        let lookups = missing.into_iter().map(|id| async move {
            let result = api.get_customer_by_id(&id).await;
            (id, result)
        });

        let mut names = HashMap::new();
        for (id, result) in join_all(lookups).await {
            match result {
                Ok(customer) => {
                    names.insert(id, customer.name);
                }
                Err(e) => tracing::warn!(customer_id = %id, error = %e, "Customer lookup failed"),
            }
        }

        for row in &mut self.rows {
            if row.customer_name.is_none()
                && let Some(name) = names.get(&row.order.customer_id)
            {
                row.customer_name = Some(name.clone());
            }
        }
    }

    // ========== Row actions ==========

    /// Inline status dropdown
    pub async fn set_status(&mut self, index: usize, to: TechnicalStatus) -> Option<Notification> {
        let api = self.api.clone();
        let row = self.rows.get_mut(index)?;
        Some(StatusUpdater::inline(&*api).update_technical(&mut row.order, to).await)
    }

    /// Inline financial dropdown
    pub async fn set_financial(&mut self, index: usize, to: FinancialStatus) -> Option<Notification> {
        let api = self.api.clone();
        let row = self.rows.get_mut(index)?;
        Some(StatusUpdater::inline(&*api).update_financial(&mut row.order, to).await)
    }

    /// Delete an order and drop its row
    pub async fn delete(&mut self, id: &str) -> Notification {
        match self.api.delete_order(id).await {
            Ok(()) => {
                self.rows.retain(|row| row.order.id != id);
                self.total = self.total.saturating_sub(1);
                tracing::info!(order_id = %id, "Service order deleted");
                Notification::success("Service order deleted")
            }
            Err(e) => {
                tracing::error!(order_id = %id, error = %e, "Failed to delete service order");
                Notification::error(e.user_message())
            }
        }
    }
}
