//! Shared plumbing for the engine integration tests: a throwaway SQLite database per test, seed
//! helpers, and a scripted payment gateway double.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use log::*;
use scs_common::Money;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

use checkout_engine::{
    db_types::VerificationStatus,
    traits::{GatewayError, GatewayPaymentResult, NewPaymentSession, PaymentGateway, PaymentSession},
    OrderFlowApi,
    SqliteDatabase,
};

pub fn random_db_url() -> String {
    let path = std::env::temp_dir().join(format!("checkout_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn prepare_test_env(url: &str) {
    let _ = env_logger::try_init();
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    // Close this pool before the test opens its own. Dropping it only closes the connections in
    // the background, and the last close checkpoints and deletes the WAL file underneath the
    // test pool's connections, leaving some of them reading a stale snapshot.
    db.pool().close().await;
    debug!("🚀️ Test database ready at {url}");
}

/// Builds a fresh database and an [`OrderFlowApi`] wired to a scripted gateway.
pub async fn new_checkout_api() -> (OrderFlowApi<SqliteDatabase, TestGateway>, SqliteDatabase, TestGateway) {
    let url = random_db_url();
    prepare_test_env(&url).await;
    // A single connection keeps reads ordered behind writes. With a larger pool, a SELECT on a
    // second connection can run before the background worker finishes committing a just-returned
    // `UPDATE ... RETURNING`, and the test observes stale data.
    let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
    let gateway = TestGateway::default();
    let api = OrderFlowApi::new(db.clone(), gateway.clone());
    (api, db, gateway)
}

//--------------------------------------    Seed helpers     ---------------------------------------------

pub async fn seed_customer(db: &SqliteDatabase, id: &str, verified: bool, status: VerificationStatus) {
    sqlx::query("INSERT INTO customers (id, email, identity_verified, credential_status) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("{id}@example.com"))
        .bind(verified)
        .bind(status.to_string())
        .execute(db.pool())
        .await
        .expect("Error seeding customer");
}

pub async fn seed_address(db: &SqliteDatabase, customer_id: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO shipping_addresses (customer_id, label) VALUES ($1, 'home') RETURNING id")
            .bind(customer_id)
            .fetch_one(db.pool())
            .await
            .expect("Error seeding address");
    id
}

pub async fn seed_variant(
    db: &SqliteDatabase,
    slug: &str,
    price: Money,
    stock: i64,
    active: bool,
    requires_approval: bool,
) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO product_variants (product_name, product_slug, pack_size, price, stock_on_hand, is_active, \
         requires_approval) VALUES ($1, $2, '1 pack', $3, $4, $5, $6) RETURNING id",
    )
    .bind(slug.to_uppercase())
    .bind(slug)
    .bind(price)
    .bind(stock)
    .bind(active)
    .bind(requires_approval)
    .fetch_one(db.pool())
    .await
    .expect("Error seeding variant");
    id
}

pub async fn add_cart_line(db: &SqliteDatabase, customer_id: &str, variant_id: i64, quantity: i64) {
    sqlx::query("INSERT INTO cart_lines (customer_id, variant_id, quantity) VALUES ($1, $2, $3)")
        .bind(customer_id)
        .bind(variant_id)
        .bind(quantity)
        .execute(db.pool())
        .await
        .expect("Error seeding cart line");
}

pub async fn cart_size(db: &SqliteDatabase, customer_id: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_lines WHERE customer_id = $1")
        .bind(customer_id)
        .fetch_one(db.pool())
        .await
        .expect("Error counting cart lines");
    n
}

pub async fn stock_of(db: &SqliteDatabase, variant_id: i64) -> i64 {
    let (stock,): (i64,) = sqlx::query_as("SELECT stock_on_hand FROM product_variants WHERE id = $1")
        .bind(variant_id)
        .fetch_one(db.pool())
        .await
        .expect("Error reading stock");
    stock
}

pub async fn set_variant_price(db: &SqliteDatabase, variant_id: i64, price: Money) {
    sqlx::query("UPDATE product_variants SET price = $1 WHERE id = $2")
        .bind(price)
        .bind(variant_id)
        .execute(db.pool())
        .await
        .expect("Error updating price");
}

pub async fn approve_customer(db: &SqliteDatabase, customer_id: &str) {
    sqlx::query("UPDATE customers SET identity_verified = 1, credential_status = 'approved' WHERE id = $1")
        .bind(customer_id)
        .execute(db.pool())
        .await
        .expect("Error approving customer");
}

//--------------------------------------    TestGateway      ---------------------------------------------

#[derive(Default)]
struct GatewayScript {
    verdicts: HashMap<String, bool>,
    init_should_fail: bool,
    init_calls: u32,
    verify_calls: u32,
}

/// A scripted [`PaymentGateway`]. Tests register a verdict per payment reference and can
/// simulate an outage of the initialize endpoint.
#[derive(Clone, Default)]
pub struct TestGateway {
    script: Arc<Mutex<GatewayScript>>,
}

impl TestGateway {
    pub fn approve(&self, reference: &str) {
        self.script.lock().unwrap().verdicts.insert(reference.to_string(), true);
    }

    pub fn decline(&self, reference: &str) {
        self.script.lock().unwrap().verdicts.insert(reference.to_string(), false);
    }

    pub fn fail_initialization(&self) {
        self.script.lock().unwrap().init_should_fail = true;
    }

    pub fn init_calls(&self) -> u32 {
        self.script.lock().unwrap().init_calls
    }

    pub fn verify_calls(&self) -> u32 {
        self.script.lock().unwrap().verify_calls
    }
}

impl PaymentGateway for TestGateway {
    async fn initialize_session(&self, session: NewPaymentSession) -> Result<PaymentSession, GatewayError> {
        let mut script = self.script.lock().unwrap();
        script.init_calls += 1;
        if script.init_should_fail {
            return Err(GatewayError::Unreachable("scripted outage".to_string()));
        }
        Ok(PaymentSession {
            redirect_url: format!("https://gateway.test/pay/{}", session.reference),
            access_code: "AC_test".to_string(),
            reference: session.reference,
        })
    }

    async fn verify_transaction(&self, reference: &str) -> Result<GatewayPaymentResult, GatewayError> {
        let mut script = self.script.lock().unwrap();
        script.verify_calls += 1;
        match script.verdicts.get(reference) {
            Some(&success) => Ok(GatewayPaymentResult {
                reference: reference.to_string(),
                success,
                gateway_status: if success { "success" } else { "failed" }.to_string(),
                transaction_id: Some(format!("txn-{}", script.verify_calls)),
                amount: Money::zero(),
            }),
            None => Err(GatewayError::Rejected(format!("unknown reference {reference}"))),
        }
    }
}
