use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use scs_common::{Money, Secret};

use checkout_engine::{
    db_types::{CartLine, CustomerProfile, Order, OrderStatus, PaymentStatus, VerificationStatus},
    OrderFlowApi,
    OrderQueryApi,
};

use crate::{
    auth::{JwtClaims, Role, TokenIssuer},
    config::AuthConfig,
    endpoint_tests::mocks::{MockGateway, MockLedger},
    routes::{configure_api, health},
};

// A fixed test signing secret. DO NOT re-use this key anywhere.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("an-endpoint-test-secret-0123456789abcdef".to_string()) }
}

pub fn customer_token(customer_id: &str) -> String {
    issue_token(&JwtClaims::new(customer_id, vec![Role::Customer]))
}

pub fn admin_token(subject: &str) -> String {
    issue_token(&JwtClaims::new(subject, vec![Role::Customer, Role::Admin]))
}

pub fn issue_token(claims: &JwtClaims) -> String {
    TokenIssuer::new(&test_auth_config()).issue(claims).expect("Failed to sign token")
}

/// Builds the `/api` scope against the given mocks and executes the request.
pub async fn send_request(flow_db: MockLedger, gateway: MockGateway, query_db: MockLedger, req: TestRequest) -> (StatusCode, String) {
    let order_flow = OrderFlowApi::new(flow_db, gateway);
    let order_queries = OrderQueryApi::new(query_db);
    let app = App::new()
        .app_data(web::Data::new(order_flow))
        .app_data(web::Data::new(order_queries))
        .app_data(web::Data::new(TokenIssuer::new(&test_auth_config())))
        .service(health)
        .service(web::scope("/api").configure(configure_api::<MockLedger, MockGateway>));
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    (status, body)
}

pub fn sample_order(id: i64, customer_id: &str) -> Order {
    let now = Utc::now();
    Order {
        id,
        order_number: format!("ORD-20240815-TEST{id:02}"),
        customer_id: customer_id.to_string(),
        shipping_address_id: 1,
        subtotal: Money::from_major_units(20),
        shipping_fee: Money::zero(),
        total: Money::from_major_units(20),
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_reference: Some(format!("PAY-TESTREF{id:09}")),
        payment_id: None,
        notes: None,
        cancelled_at: None,
        cancelled_reason: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_profile(customer_id: &str) -> CustomerProfile {
    CustomerProfile {
        id: customer_id.to_string(),
        email: format!("{customer_id}@example.com"),
        identity_verified: false,
        credential_status: VerificationStatus::Unverified,
    }
}

pub fn sample_cart_line() -> CartLine {
    CartLine {
        variant_id: 7,
        product_name: "Widget".to_string(),
        product_slug: "widget".to_string(),
        pack_size: "10 pack".to_string(),
        unit_price: Money::from_major_units(10),
        quantity: 2,
        stock_on_hand: 10,
        is_active: true,
        requires_approval: false,
    }
}
