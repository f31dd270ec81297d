//! Identifier generation for orders and payment sessions.

use chrono::Utc;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// How many times the ledger will retry an order insert when the generated order number
/// collides with an existing one.
pub const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

fn random_suffix(len: usize) -> String {
    thread_rng().sample_iter(&Alphanumeric).take(len).map(|c| (c as char).to_ascii_uppercase()).collect()
}

/// Generates a human-facing order number of the form `ORD-YYYYMMDD-XXXXXX`. The suffix is
/// random, so uniqueness is only enforced by the database; callers retry on collision.
pub fn new_order_number() -> String {
    format!("ORD-{}-{}", Utc::now().format("%Y%m%d"), random_suffix(6))
}

/// Generates a merchant-assigned payment reference. References are unique per payment session
/// and are the correlation key between the ledger and the payment gateway.
pub fn new_payment_reference() -> String {
    format!("PAY-{}", random_suffix(16))
}
