use log::{debug, trace, warn};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    checkout_api::order_objects::OrderQueryFilter,
    db_types::{NewOrder, NewOrderLine, Order, OrderLine, OrderStatus},
    helpers::{new_order_number, MAX_ORDER_NUMBER_ATTEMPTS},
    traits::{LedgerError, PaymentSettlement, SettlementOutcome},
};

const DEFAULT_SEARCH_LIMIT: i64 = 50;

/// Inserts a new order row, retrying with a fresh order number if the generated one collides
/// with an existing row. This is not atomic on its own; callers embed it in a transaction
/// together with the line inserts and stock updates.
pub async fn insert_order_with_unique_number(
    order: &NewOrder,
    conn: &mut SqliteConnection,
) -> Result<Order, LedgerError> {
    for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
        let number = new_order_number();
        match insert_order(order, &number, &mut *conn).await {
            Ok(saved) => {
                debug!("📝️ Order {number} inserted with id {}", saved.id);
                return Ok(saved);
            },
            Err(sqlx::Error::Database(e))
                if e.is_unique_violation() && e.message().contains("orders.order_number") =>
            {
                warn!("📝️ Order number {number} collided on attempt {attempt}. Retrying with a new one.");
            },
            Err(e) => return Err(e.into()),
        }
    }
    Err(LedgerError::OrderNumberExhausted(MAX_ORDER_NUMBER_ATTEMPTS))
}

async fn insert_order(order: &NewOrder, number: &str, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let saved = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                customer_id,
                shipping_address_id,
                subtotal,
                shipping_fee,
                total,
                notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(number)
    .bind(&order.customer_id)
    .bind(order.shipping_address_id)
    .bind(order.subtotal)
    .bind(order.shipping_fee)
    .bind(order.total)
    .bind(&order.notes)
    .fetch_one(conn)
    .await?;
    Ok(saved)
}

pub async fn insert_order_lines(
    order_id: i64,
    lines: &[NewOrderLine],
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    for line in lines {
        sqlx::query(
            r#"
                INSERT INTO order_lines (order_id, variant_id, product_name, product_slug, pack_size, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7);
            "#,
        )
        .bind(order_id)
        .bind(line.variant_id)
        .bind(&line.product_name)
        .bind(&line.product_slug)
        .bind(&line.pack_size)
        .bind(line.unit_price)
        .bind(line.quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE payment_reference = $1")
        .bind(reference)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_lines(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let lines = sqlx::query_as("SELECT * FROM order_lines WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `created_at` in descending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(cid) = query.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(cid);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(payment_status) = query.payment_status {
        where_clause.push("payment_status = ");
        where_clause.push_bind_unseparated(payment_status.to_string());
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT));
    if let Some(offset) = query.offset {
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("Result of search_orders: {:?}", orders.len());
    Ok(orders)
}

/// Records the payment reference on an order. The column is write-once: a second call with the
/// same reference is a no-op, a call with a different reference is rejected.
pub async fn set_payment_reference(
    order_id: i64,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, LedgerError> {
    let updated: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_reference = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND \
         payment_reference IS NULL RETURNING *",
    )
    .bind(reference)
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(order) = updated {
        return Ok(order);
    }
    let current = fetch_order(order_id, conn).await?.ok_or(LedgerError::OrderNotFound(order_id))?;
    match current.payment_reference.as_deref() {
        Some(existing) if existing == reference => Ok(current),
        _ => Err(LedgerError::PaymentReferenceAlreadySet(order_id)),
    }
}

/// Applies a gateway verdict to the order carrying the settlement's payment reference.
///
/// The conditional `payment_status = 'pending'` guard is what makes concurrent webhook and poll
/// reconciliation safe: exactly one caller updates the row, everyone else observes the recorded
/// state via [`SettlementOutcome::AlreadySettled`].
pub async fn settle_payment(
    settlement: PaymentSettlement,
    conn: &mut SqliteConnection,
) -> Result<SettlementOutcome, LedgerError> {
    let updated: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_status = $1, payment_id = COALESCE($2, payment_id), updated_at = \
         CURRENT_TIMESTAMP WHERE payment_reference = $3 AND payment_status = 'pending' RETURNING *",
    )
    .bind(settlement.status)
    .bind(&settlement.transaction_id)
    .bind(&settlement.reference)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(order) => {
            debug!("📝️ Payment {} settled as {} for order {}", settlement.reference, settlement.status, order.order_number);
            Ok(SettlementOutcome::Applied(order))
        },
        None => {
            let order = fetch_order_by_reference(&settlement.reference, conn)
                .await?
                .ok_or_else(|| LedgerError::ReferenceNotFound(settlement.reference.clone()))?;
            trace!(
                "📝️ Payment {} was already settled as {} for order {}",
                settlement.reference,
                order.payment_status,
                order.order_number
            );
            Ok(SettlementOutcome::AlreadySettled(order))
        },
    }
}

/// Moves the order to `new_status`, enforcing the fulfillment transition table. The update is
/// conditional on the status the caller observed, so a concurrent transition makes this fail
/// rather than silently overwrite.
pub async fn update_order_status(
    id: i64,
    new_status: OrderStatus,
    notes: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<Order, LedgerError> {
    let current = fetch_order(id, &mut *conn).await?.ok_or(LedgerError::OrderNotFound(id))?;
    if !current.status.can_transition_to(new_status) {
        return Err(LedgerError::InvalidTransition { from: current.status, to: new_status });
    }
    let updated: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, notes = COALESCE($2, notes), cancelled_at = NULL, cancelled_reason = NULL, \
         updated_at = CURRENT_TIMESTAMP WHERE id = $3 AND status = $4 RETURNING *",
    )
    .bind(new_status)
    .bind(notes)
    .bind(id)
    .bind(current.status)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(order) => Ok(order),
        None => {
            // Lost a race; report against the status that is actually in the ledger now.
            let now = fetch_order(id, conn).await?.ok_or(LedgerError::OrderNotFound(id))?;
            Err(LedgerError::InvalidTransition { from: now.status, to: new_status })
        },
    }
}

/// Cancels the order if its current status is one of `allowed_from`. The restock of reserved
/// inventory is handled by the caller inside the same transaction.
pub async fn cancel_order(
    id: i64,
    reason: &str,
    allowed_from: &[OrderStatus],
    conn: &mut SqliteConnection,
) -> Result<Order, LedgerError> {
    let mut builder = QueryBuilder::new(
        "UPDATE orders SET status = 'cancelled', cancelled_at = CURRENT_TIMESTAMP, cancelled_reason = ",
    );
    builder.push_bind(reason);
    builder.push(", updated_at = CURRENT_TIMESTAMP WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND status IN (");
    let mut statuses = builder.separated(", ");
    for status in allowed_from {
        statuses.push_bind(status.to_string());
    }
    builder.push(") RETURNING *");
    let updated = builder.build_query_as::<Order>().fetch_optional(&mut *conn).await?;
    match updated {
        Some(order) => Ok(order),
        None => {
            let current = fetch_order(id, conn).await?.ok_or(LedgerError::OrderNotFound(id))?;
            Err(LedgerError::CancellationForbidden(format!(
                "order {} is {}",
                current.order_number, current.status
            )))
        },
    }
}
