//! Data objects for the order query API.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{OrderStatus, PaymentStatus};

/// Search criteria for the order list endpoint. Every field is optional; an empty filter
/// returns the most recent orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub customer_id: Option<String>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderQueryFilter {
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none() &&
            self.status.is_none() &&
            self.payment_status.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }

    pub fn for_customer(customer_id: String) -> Self {
        Self { customer_id: Some(customer_id), ..Default::default() }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut terms = vec![];
        if let Some(cid) = &self.customer_id {
            terms.push(format!("customer_id={cid}"));
        }
        if let Some(status) = &self.status {
            terms.push(format!("status={status}"));
        }
        if let Some(status) = &self.payment_status {
            terms.push(format!("payment_status={status}"));
        }
        if let Some(since) = &self.since {
            terms.push(format!("since={since}"));
        }
        if let Some(until) = &self.until {
            terms.push(format!("until={until}"));
        }
        if terms.is_empty() {
            terms.push("all orders".to_string());
        }
        write!(f, "{}", terms.join(", "))
    }
}
