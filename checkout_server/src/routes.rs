//! Request handlers for the authenticated `/api` scope.
//!
//! Handlers are generic over the backend and gateway traits, so the endpoint tests can run them
//! against mocks. [`configure_api`] wires them up for a concrete pair of implementations; route
//! order matters, since `/orders/verify-payment` must be registered before `/orders/{id}`.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;

use checkout_engine::{
    order_objects::OrderQueryFilter,
    traits::{CheckoutDatabase, OrderManagement, PaymentGateway},
    CheckoutRequest,
    OrderFlowApi,
    OrderQueryApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{CancelRequest, StatusUpdateRequest, VerifyPaymentQuery},
    errors::{AuthError, ServerError},
};

/// Route handler for the health check endpoint.
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Route handler for `POST /api/orders`.
///
/// Creates an order from the caller's current cart and opens a hosted-payment session for it.
/// Returns 201 with the order, the payment reference, and the redirect URL (absent if the
/// gateway was unreachable).
pub async fn create_order<B, G>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + OrderManagement,
    G: PaymentGateway,
{
    debug!("💻️ POST /orders for customer [{}]", claims.sub);
    let result = api.create_order_from_cart(&claims.sub, body.into_inner()).await?;
    info!("💻️ Order {} created for [{}]", result.order.order_number, claims.sub);
    Ok(HttpResponse::Created().json(result))
}

/// Route handler for `GET /api/orders/verify-payment?reference=...`.
///
/// Polls the gateway for the payment carrying `reference` and settles it if a verdict is in.
/// Safe to call any number of times; once settled, the recorded order is returned without
/// another gateway round-trip.
pub async fn verify_payment<B, G>(
    claims: JwtClaims,
    query: web::Query<VerifyPaymentQuery>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + OrderManagement,
    G: PaymentGateway,
{
    debug!("💻️ GET /orders/verify-payment for reference {}", query.reference);
    let order = api.verify_payment(&query.reference, &claims.requester()).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Route handler for `GET /api/orders/{id}`.
pub async fn order_by_id<B>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
{
    let order_id = path.into_inner();
    debug!("💻️ GET /orders/{order_id} for [{}]", claims.sub);
    let detail = api.order_with_lines(order_id, &claims.requester()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Route handler for `GET /api/orders`.
///
/// Customers always get their own orders; admins can filter across all customers.
pub async fn search_orders<B>(
    claims: JwtClaims,
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
{
    let filter = query.into_inner();
    debug!("💻️ GET /orders for [{}]: {filter}", claims.sub);
    let orders = api.search(filter, &claims.requester()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

/// Route handler for `PATCH /api/orders/{id}/status`. Admin only.
pub async fn update_order_status<B, G>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + OrderManagement,
    G: PaymentGateway,
{
    if !claims.is_admin() {
        return Err(AuthError::InsufficientPermissions("Only admins can update order status.".to_string()).into());
    }
    let order_id = path.into_inner();
    let req = body.into_inner();
    debug!("💻️ PATCH /orders/{order_id}/status -> {} by [{}]", req.status, claims.sub);
    let order = api.update_order_status(order_id, req.status, req.notes, &claims.requester()).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Route handler for `POST /api/orders/{id}/cancel`.
///
/// Customers can cancel their own orders while still pending; admins can cancel anything not
/// yet delivered. A reason of at least 5 characters is required.
pub async fn cancel_order<B, G>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<CancelRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + OrderManagement,
    G: PaymentGateway,
{
    let order_id = path.into_inner();
    let reason = body.into_inner().reason;
    if reason.trim().len() < 5 {
        return Err(ServerError::InvalidRequestBody(
            "A cancellation reason of at least 5 characters is required".to_string(),
        ));
    }
    debug!("💻️ POST /orders/{order_id}/cancel by [{}]", claims.sub);
    let order = api.cancel_order(order_id, reason.trim(), &claims.requester()).await?;
    info!("💻️ Order {} cancelled by [{}]", order.order_number, claims.sub);
    Ok(HttpResponse::Ok().json(order))
}

/// Registers the `/api` routes for a concrete backend and gateway.
pub fn configure_api<B, G>(cfg: &mut web::ServiceConfig)
where
    B: CheckoutDatabase + OrderManagement + 'static,
    G: PaymentGateway + 'static,
{
    cfg.route("/orders", web::post().to(create_order::<B, G>))
        .route("/orders", web::get().to(search_orders::<B>))
        .route("/orders/verify-payment", web::get().to(verify_payment::<B, G>))
        .route("/orders/{id}", web::get().to(order_by_id::<B>))
        .route("/orders/{id}/status", web::patch().to(update_order_status::<B, G>))
        .route("/orders/{id}/cancel", web::post().to(cancel_order::<B, G>));
}
