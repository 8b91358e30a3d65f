//! User-facing feedback values
//!
//! The core never renders anything: it hands back a [`Notification`] for the
//! toast area and, after a successful save, a [`Redirect`] for the router.

use std::time::Duration;

use serde::Serialize;

/// Delay between the success toast and the redirect after a save
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// Transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Navigation targets the core can ask for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "id", rename_all = "camelCase")]
pub enum Route {
    OrderList,
    OrderDetail(String),
    OrderEdit(String),
    Login,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::OrderList => "/service-orders".to_string(),
            Self::OrderDetail(id) => format!("/service-orders/{id}"),
            Self::OrderEdit(id) => format!("/service-orders/{id}/edit"),
            Self::Login => "/login".to_string(),
        }
    }
}

/// Deferred navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}

impl Redirect {
    /// Redirect to an order's detail page after the standard delay
    pub fn to_order(id: impl Into<String>) -> Self {
        Self {
            to: Route::OrderDetail(id.into()),
            after: REDIRECT_DELAY,
        }
    }

    /// Sleep for the delay, then yield the route
    pub async fn wait(self) -> Route {
        tokio::time::sleep(self.after).await;
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::OrderDetail("os-1".into()).path(), "/service-orders/os-1");
        assert_eq!(Route::OrderEdit("os-1".into()).path(), "/service-orders/os-1/edit");
        assert_eq!(Route::OrderList.path(), "/service-orders");
    }

    #[test]
    fn test_redirect_delay() {
        let redirect = Redirect::to_order("os-7");
        assert_eq!(redirect.after, Duration::from_millis(1500));
        assert_eq!(redirect.to, Route::OrderDetail("os-7".into()));
    }

    #[tokio::test]
    async fn test_redirect_wait_yields_route() {
        let redirect = Redirect {
            to: Route::OrderList,
            after: Duration::from_millis(5),
        };
        assert_eq!(redirect.wait().await, Route::OrderList);
    }

    #[test]
    fn test_notification_display() {
        assert_eq!(Notification::error("boom").to_string(), "[error] boom");
        assert!(Notification::error("x").is_error());
        assert!(!Notification::success("x").is_error());
    }
}
