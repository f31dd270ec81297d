use serde::Serialize;

use crate::db_types::{Order, PaymentStatus};

/// The result of a gateway verification, ready to be applied to the ledger.
#[derive(Debug, Clone)]
pub struct PaymentSettlement {
    /// The merchant-assigned payment reference identifying the order.
    pub reference: String,
    /// The settled state. Must be [`PaymentStatus::Paid`] or [`PaymentStatus::Failed`].
    pub status: PaymentStatus,
    /// The gateway's own transaction id, stored for audit.
    pub transaction_id: Option<String>,
}

/// Whether a settlement call actually changed the ledger. Webhook and poll paths race for the
/// same order; exactly one of them gets `Applied`, every later attempt gets `AlreadySettled`
/// with the recorded state.
#[derive(Debug, Clone, Serialize)]
pub enum SettlementOutcome {
    Applied(Order),
    AlreadySettled(Order),
}

impl SettlementOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Applied(order) | Self::AlreadySettled(order) => order,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            Self::Applied(order) | Self::AlreadySettled(order) => order,
        }
    }
}
