//! Shipping fee policies.

use scs_common::Money;

use crate::db_types::CartLine;

/// Computes the shipping fee for an order about to be created. The fee is snapshotted onto the
/// order row, so later policy changes never affect existing orders.
pub trait ShippingFeePolicy: Send + Sync {
    fn fee_for(&self, lines: &[CartLine], subtotal: Money) -> Money;
}

/// Charges the same flat fee for every order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRateShipping(pub Money);

impl ShippingFeePolicy for FlatRateShipping {
    fn fee_for(&self, _lines: &[CartLine], _subtotal: Money) -> Money {
        self.0
    }
}
