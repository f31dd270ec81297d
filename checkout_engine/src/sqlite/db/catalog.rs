use log::debug;
use sqlx::{FromRow, SqliteConnection};

use crate::traits::LedgerError;

#[derive(FromRow)]
struct VariantAvailability {
    product_slug: String,
    stock_on_hand: i64,
    is_active: bool,
}

/// Atomically reserves `quantity` units of a variant. The conditional update is the stock
/// authority: it only succeeds if the variant is active and has enough stock, so two orders
/// racing for the last units cannot both win.
pub async fn reserve_stock(variant_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    let result = sqlx::query(
        "UPDATE product_variants SET stock_on_hand = stock_on_hand - $1 WHERE id = $2 AND is_active = 1 AND \
         stock_on_hand >= $1",
    )
    .bind(quantity)
    .bind(variant_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 1 {
        return Ok(());
    }
    // The reservation failed; look at the row to say why.
    let variant: Option<VariantAvailability> =
        sqlx::query_as("SELECT product_slug, stock_on_hand, is_active FROM product_variants WHERE id = $1")
            .bind(variant_id)
            .fetch_optional(conn)
            .await?;
    match variant {
        Some(v) if !v.is_active => Err(LedgerError::ProductNotActive { slug: v.product_slug }),
        Some(v) => Err(LedgerError::InsufficientStock {
            slug: v.product_slug,
            requested: quantity,
            available: v.stock_on_hand,
        }),
        None => Err(LedgerError::ProductNotActive { slug: format!("variant #{variant_id}") }),
    }
}

/// Returns previously reserved units to the catalogue when an order is cancelled.
pub async fn restock(variant_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE product_variants SET stock_on_hand = stock_on_hand + $1 WHERE id = $2")
        .bind(quantity)
        .bind(variant_id)
        .execute(conn)
        .await?;
    debug!("📦️ Restocked {quantity} units of variant {variant_id}");
    Ok(())
}
