use sqlx::SqliteConnection;

use crate::db_types::CustomerProfile;

pub async fn fetch_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<CustomerProfile>, sqlx::Error> {
    let profile = sqlx::query_as(
        "SELECT id, email, identity_verified, credential_status FROM customers WHERE id = $1",
    )
    .bind(customer_id)
    .fetch_optional(conn)
    .await?;
    Ok(profile)
}

pub async fn shipping_address_exists(
    customer_id: &str,
    address_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM shipping_addresses WHERE id = $1 AND customer_id = $2")
            .bind(address_id)
            .bind(customer_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}
