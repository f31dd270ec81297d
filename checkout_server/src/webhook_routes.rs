//! Webhook handlers for the payment gateway.
//!
//! The `/webhook` scope is wrapped in the HMAC middleware, so by the time a handler runs the
//! payload signature has already been verified. The payload contents are still untrusted; the
//! engine re-verifies the transaction with the gateway before settling anything.

use actix_web::{web, HttpResponse};
use log::*;

use checkout_engine::{
    traits::{CheckoutDatabase, OrderManagement, PaymentGateway},
    OrderFlowApi,
    OrderFlowError,
};
use paystack_tools::WebhookEvent;

use crate::data_objects::JsonResponse;

/// Route handler for `POST /webhook/paystack`.
///
/// Responses must always be in the 200 range once the signature has passed, otherwise the
/// gateway keeps retrying deliveries we have already decided about. That includes payloads
/// that do not deserialize, so the body is parsed here rather than by the Json extractor.
pub async fn paystack_webhook<B, G>(body: web::Bytes, api: web::Data<OrderFlowApi<B, G>>) -> HttpResponse
where
    B: CheckoutDatabase + OrderManagement,
    G: PaymentGateway,
{
    let event = match serde_json::from_slice::<WebhookEvent>(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("🛍️️ Could not deserialize webhook payload. {e}");
            return HttpResponse::Ok().json(JsonResponse::failure("Malformed event payload."));
        },
    };
    trace!("🛍️️ Received webhook event {} for reference {}", event.event, event.data.reference);
    let result = match api.process_gateway_event(&event.event, &event.data.reference).await {
        Ok(order) => {
            info!(
                "🛍️️ Event {} processed. Order {} payment is {}.",
                event.event, order.order_number, order.payment_status
            );
            JsonResponse::success(format!("Order {} is {}", order.order_number, order.payment_status))
        },
        Err(OrderFlowError::UnsupportedEvent(name)) => {
            debug!("🛍️️ Ignoring unsupported event {name}");
            JsonResponse::success(format!("Event {name} ignored"))
        },
        Err(OrderFlowError::Ledger(e)) => {
            warn!("🛍️️ Could not settle reference {}. {e}", event.data.reference);
            JsonResponse::failure(e)
        },
        Err(OrderFlowError::Gateway(e)) => {
            warn!("🛍️️ Verification of {} against the gateway failed. {e}", event.data.reference);
            JsonResponse::failure(e)
        },
        Err(e) => {
            warn!("🛍️️ Unexpected error while handling webhook event. {e}");
            JsonResponse::failure("Unexpected error handling event.")
        },
    };
    HttpResponse::Ok().json(result)
}

/// Registers the `/webhook` routes for a concrete backend and gateway.
pub fn configure_webhooks<B, G>(cfg: &mut web::ServiceConfig)
where
    B: CheckoutDatabase + OrderManagement + 'static,
    G: PaymentGateway + 'static,
{
    cfg.route("/paystack", web::post().to(paystack_webhook::<B, G>));
}
