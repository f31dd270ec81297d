use checkout_engine::{
    db_types::{CartLine, CustomerProfile, NewOrder, Order, OrderLine, OrderStatus},
    order_objects::OrderQueryFilter,
    traits::{
        CheckoutDatabase,
        GatewayError,
        GatewayPaymentResult,
        LedgerError,
        NewPaymentSession,
        OrderManagement,
        PaymentGateway,
        PaymentSession,
        PaymentSettlement,
        SettlementOutcome,
    },
};
use mockall::mock;

mock! {
    pub Ledger {}
    impl CheckoutDatabase for Ledger {
        fn url(&self) -> &str;
        async fn fetch_customer(&self, customer_id: &str) -> Result<Option<CustomerProfile>, LedgerError>;
        async fn fetch_cart(&self, customer_id: &str) -> Result<Vec<CartLine>, LedgerError>;
        async fn shipping_address_exists(&self, customer_id: &str, address_id: i64) -> Result<bool, LedgerError>;
        async fn create_order(&self, order: NewOrder) -> Result<Order, LedgerError>;
        async fn set_payment_reference(&self, order_id: i64, reference: &str) -> Result<Order, LedgerError>;
        async fn settle_payment(&self, settlement: PaymentSettlement) -> Result<SettlementOutcome, LedgerError>;
        async fn update_order_status(&self, order_id: i64, new_status: OrderStatus, notes: Option<String>) -> Result<Order, LedgerError>;
        async fn cancel_order(&self, order_id: i64, reason: &str, allowed_from: &[OrderStatus]) -> Result<Order, LedgerError>;
    }
    impl OrderManagement for Ledger {
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, LedgerError>;
        async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, LedgerError>;
        async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, LedgerError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn initialize_session(&self, session: NewPaymentSession) -> Result<PaymentSession, GatewayError>;
        async fn verify_transaction(&self, reference: &str) -> Result<GatewayPaymentResult, GatewayError>;
    }
}
