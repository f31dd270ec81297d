use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::CartLine;

/// Fetches the customer's cart, joined against the live catalogue. The join pulls in current
/// price, stock and eligibility flags; the result is the snapshot an order is built from.
pub async fn fetch_cart_lines(customer_id: &str, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines = sqlx::query_as(
        r#"
            SELECT
                c.variant_id,
                v.product_name,
                v.product_slug,
                v.pack_size,
                v.price AS unit_price,
                c.quantity,
                v.stock_on_hand,
                v.is_active,
                v.requires_approval
            FROM cart_lines c
            JOIN product_variants v ON v.id = c.variant_id
            WHERE c.customer_id = $1
            ORDER BY c.id;
        "#,
    )
    .bind(customer_id)
    .fetch_all(conn)
    .await?;
    trace!("🛒️ Fetched {} cart lines for customer [{customer_id}]", lines.len());
    Ok(lines)
}

/// Removes the given variants from the customer's cart. Lines added after the order snapshot
/// was taken (other variants) are left alone.
pub async fn clear_lines_for_variants(
    customer_id: &str,
    variant_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let mut deleted = 0;
    for variant_id in variant_ids {
        let result = sqlx::query("DELETE FROM cart_lines WHERE customer_id = $1 AND variant_id = $2")
            .bind(customer_id)
            .bind(variant_id)
            .execute(&mut *conn)
            .await?;
        deleted += result.rows_affected();
    }
    Ok(deleted)
}
