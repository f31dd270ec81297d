use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};

use checkout_engine::{FlatRateShipping, OrderFlowApi, OrderQueryApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    integrations::paystack::PaystackGateway,
    middleware::HmacMiddlewareFactory,
    routes::{configure_api, health},
    webhook_routes::configure_webhooks,
};

/// The header Paystack uses to deliver webhook signatures.
pub const PAYSTACK_SIGNATURE_HEADER: &str = "x-paystack-signature";

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::InitializeError(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let (host, port) = (config.host.clone(), config.port);
    let gateway = PaystackGateway::new(config.paystack_config.clone())?;
    let srv = HttpServer::new(move || {
        let shipping = Arc::new(FlatRateShipping(config.shipping_fee));
        let order_flow = OrderFlowApi::new(db.clone(), gateway.clone()).with_shipping_policy(shipping);
        let order_queries = OrderQueryApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.auth);
        let hmac = HmacMiddlewareFactory::new(
            PAYSTACK_SIGNATURE_HEADER,
            config.paystack_config.secret_key.clone(),
            config.webhook_signature_checks,
        );
        let api_scope =
            web::scope("/api").configure(configure_api::<SqliteDatabase, PaystackGateway>);
        let webhook_scope = web::scope("/webhook")
            .wrap(hmac)
            .configure(configure_webhooks::<SqliteDatabase, PaystackGateway>);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("scs::access_log"))
            .app_data(web::Data::new(order_flow))
            .app_data(web::Data::new(order_queries))
            .app_data(web::Data::new(token_issuer))
            .service(health)
            .service(api_scope)
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
