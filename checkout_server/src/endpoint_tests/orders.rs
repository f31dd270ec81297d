use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;

use checkout_engine::{
    db_types::{OrderStatus, PaymentStatus},
    traits::{GatewayPaymentResult, PaymentSession, SettlementOutcome},
};
use scs_common::Money;

use super::{
    helpers::{admin_token, customer_token, sample_cart_line, sample_order, sample_profile, send_request},
    mocks::{MockGateway, MockLedger},
};

fn authed(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {token}")))
}

#[actix_web::test]
async fn requests_without_a_token_are_unauthorized() {
    let _ = env_logger::try_init();
    let req = TestRequest::post().uri("/api/orders").set_json(json!({"shipping_address_id": 1}));
    let (status, body) = send_request(MockLedger::new(), MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("unauthorized"), "body was: {body}");
}

#[actix_web::test]
async fn tampered_tokens_are_unauthorized() {
    let _ = env_logger::try_init();
    let mut token = customer_token("alice");
    token.replace_range(token.len() - 4.., "AAAA");
    let req = authed(TestRequest::get().uri("/api/orders"), &token);
    let (status, _) = send_request(MockLedger::new(), MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_order_happy_path() {
    let _ = env_logger::try_init();
    let mut flow_db = MockLedger::new();
    flow_db.expect_fetch_customer().returning(|cid| Ok(Some(sample_profile(cid))));
    flow_db.expect_fetch_cart().returning(|_| Ok(vec![sample_cart_line()]));
    flow_db.expect_shipping_address_exists().returning(|_, _| Ok(true));
    flow_db.expect_create_order().withf(|order| order.total == Money::from_major_units(20)).returning(|order| {
        let mut saved = sample_order(42, &order.customer_id);
        saved.payment_reference = None;
        Ok(saved)
    });
    flow_db.expect_set_payment_reference().returning(|id, reference| {
        let mut order = sample_order(id, "alice");
        order.payment_reference = Some(reference.to_string());
        Ok(order)
    });
    let mut gateway = MockGateway::new();
    gateway.expect_initialize_session().returning(|session| {
        Ok(PaymentSession {
            redirect_url: format!("https://gateway.test/pay/{}", session.reference),
            access_code: "AC_1".to_string(),
            reference: session.reference,
        })
    });

    let token = customer_token("alice");
    let req = authed(TestRequest::post().uri("/api/orders"), &token).set_json(json!({"shipping_address_id": 1}));
    let (status, body) = send_request(flow_db, gateway, MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::CREATED, "body was: {body}");
    assert!(body.contains("\"payment_reference\":\"PAY-"), "body was: {body}");
    assert!(body.contains("https://gateway.test/pay/"), "body was: {body}");
    assert!(body.contains("\"subtotal\":\"20.00\""), "body was: {body}");
}

#[actix_web::test]
async fn create_order_with_an_empty_cart_is_a_client_fault() {
    let _ = env_logger::try_init();
    let mut flow_db = MockLedger::new();
    flow_db.expect_fetch_customer().returning(|cid| Ok(Some(sample_profile(cid))));
    flow_db.expect_fetch_cart().returning(|_| Ok(vec![]));

    let token = customer_token("alice");
    let req = authed(TestRequest::post().uri("/api/orders"), &token).set_json(json!({"shipping_address_id": 1}));
    let (status, body) = send_request(flow_db, MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("empty_cart"), "body was: {body}");
}

#[actix_web::test]
async fn orders_to_unknown_shipping_addresses_are_not_found() {
    let _ = env_logger::try_init();
    let mut flow_db = MockLedger::new();
    flow_db.expect_fetch_customer().returning(|cid| Ok(Some(sample_profile(cid))));
    flow_db.expect_fetch_cart().returning(|_| Ok(vec![sample_cart_line()]));
    flow_db.expect_shipping_address_exists().returning(|_, _| Ok(false));

    let token = customer_token("alice");
    let req = authed(TestRequest::post().uri("/api/orders"), &token).set_json(json!({"shipping_address_id": 99}));
    let (status, body) = send_request(flow_db, MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("not_found"), "body was: {body}");
}

#[actix_web::test]
async fn verify_payment_settles_a_pending_order() {
    let _ = env_logger::try_init();
    let mut flow_db = MockLedger::new();
    flow_db.expect_fetch_order_by_reference().returning(|reference| {
        let mut order = sample_order(42, "alice");
        order.payment_reference = Some(reference.to_string());
        Ok(Some(order))
    });
    flow_db.expect_settle_payment().returning(|settlement| {
        let mut order = sample_order(42, "alice");
        order.payment_reference = Some(settlement.reference.clone());
        order.payment_status = settlement.status;
        Ok(SettlementOutcome::Applied(order))
    });
    let mut gateway = MockGateway::new();
    gateway.expect_verify_transaction().returning(|reference| {
        Ok(GatewayPaymentResult {
            reference: reference.to_string(),
            success: true,
            gateway_status: "success".to_string(),
            transaction_id: Some("4099260516".to_string()),
            amount: Money::from_major_units(20),
        })
    });

    let token = customer_token("alice");
    let req = authed(TestRequest::get().uri("/api/orders/verify-payment?reference=PAY-XYZ"), &token);
    let (status, body) = send_request(flow_db, gateway, MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::OK, "body was: {body}");
    assert!(body.contains("\"payment_status\":\"paid\""), "body was: {body}");
}

#[actix_web::test]
async fn customers_cannot_verify_other_peoples_payments() {
    let _ = env_logger::try_init();
    let mut flow_db = MockLedger::new();
    flow_db.expect_fetch_order_by_reference().returning(|_| Ok(Some(sample_order(42, "bob"))));

    let token = customer_token("alice");
    let req = authed(TestRequest::get().uri("/api/orders/verify-payment?reference=PAY-XYZ"), &token);
    let (status, body) = send_request(flow_db, MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("forbidden"), "body was: {body}");
}

#[actix_web::test]
async fn order_detail_is_owner_only() {
    let _ = env_logger::try_init();
    let mut query_db = MockLedger::new();
    query_db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "bob"))));

    let token = customer_token("alice");
    let req = authed(TestRequest::get().uri("/api/orders/42"), &token);
    let (status, body) = send_request(MockLedger::new(), MockGateway::new(), query_db, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("forbidden"), "body was: {body}");
}

#[actix_web::test]
async fn admins_see_any_order() {
    let _ = env_logger::try_init();
    let mut query_db = MockLedger::new();
    query_db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "bob"))));
    query_db.expect_fetch_order_lines().returning(|_| Ok(vec![]));

    let token = admin_token("support");
    let req = authed(TestRequest::get().uri("/api/orders/42"), &token);
    let (status, body) = send_request(MockLedger::new(), MockGateway::new(), query_db, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"customer_id\":\"bob\""), "body was: {body}");
}

#[actix_web::test]
async fn status_updates_require_the_admin_role() {
    let _ = env_logger::try_init();
    let token = customer_token("alice");
    let req = authed(TestRequest::patch().uri("/api/orders/42/status"), &token)
        .set_json(json!({"status": "processing"}));
    let (status, body) = send_request(MockLedger::new(), MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("forbidden"), "body was: {body}");
}

#[actix_web::test]
async fn admins_can_move_an_order_to_processing() {
    let _ = env_logger::try_init();
    let mut flow_db = MockLedger::new();
    flow_db.expect_update_order_status().returning(|id, new_status, _| {
        let mut order = sample_order(id, "alice");
        order.status = new_status;
        Ok(order)
    });

    let token = admin_token("support");
    let req = authed(TestRequest::patch().uri("/api/orders/42/status"), &token)
        .set_json(json!({"status": "processing"}));
    let (status, body) = send_request(flow_db, MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"status\":\"processing\""), "body was: {body}");
}

#[actix_web::test]
async fn cancellations_need_a_real_reason() {
    let _ = env_logger::try_init();
    let token = customer_token("alice");
    let req = authed(TestRequest::post().uri("/api/orders/42/cancel"), &token).set_json(json!({"reason": "no"}));
    let (status, body) = send_request(MockLedger::new(), MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("invalid_request"), "body was: {body}");
}

#[actix_web::test]
async fn owners_can_cancel_with_a_reason() {
    let _ = env_logger::try_init();
    let mut flow_db = MockLedger::new();
    flow_db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "alice"))));
    flow_db.expect_cancel_order().withf(|_, reason, allowed| reason == "changed my mind" && allowed == [OrderStatus::Pending]).returning(
        |id, reason, _| {
            let mut order = sample_order(id, "alice");
            order.status = OrderStatus::Cancelled;
            order.cancelled_reason = Some(reason.to_string());
            Ok(order)
        },
    );

    let token = customer_token("alice");
    let req =
        authed(TestRequest::post().uri("/api/orders/42/cancel"), &token).set_json(json!({"reason": "changed my mind"}));
    let (status, body) = send_request(flow_db, MockGateway::new(), MockLedger::new(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"status\":\"cancelled\""), "body was: {body}");
}

#[actix_web::test]
async fn searches_are_scoped_to_the_requester() {
    let _ = env_logger::try_init();
    let mut query_db = MockLedger::new();
    query_db
        .expect_search_orders()
        .withf(|filter| filter.customer_id.as_deref() == Some("alice"))
        .returning(|_| Ok(vec![sample_order(1, "alice")]));

    let token = customer_token("alice");
    // The explicit filter for bob's orders is overridden by the requester's identity.
    let req = authed(TestRequest::get().uri("/api/orders?customer_id=bob"), &token);
    let (status, body) = send_request(MockLedger::new(), MockGateway::new(), query_db, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"customer_id\":\"alice\""), "body was: {body}");
}

#[actix_web::test]
async fn payment_status_is_independent_of_fulfillment() {
    let _ = env_logger::try_init();
    let mut query_db = MockLedger::new();
    query_db.expect_fetch_order().returning(|id| {
        let mut order = sample_order(id, "alice");
        order.status = OrderStatus::Shipped;
        order.payment_status = PaymentStatus::Paid;
        Ok(Some(order))
    });
    query_db.expect_fetch_order_lines().returning(|_| Ok(vec![]));

    let token = customer_token("alice");
    let req = authed(TestRequest::get().uri("/api/orders/7"), &token);
    let (status, body) = send_request(MockLedger::new(), MockGateway::new(), query_db, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"status\":\"shipped\""), "body was: {body}");
    assert!(body.contains("\"payment_status\":\"paid\""), "body was: {body}");
}
