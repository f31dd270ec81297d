//! The public engine API.
//!
//! [`order_flow_api::OrderFlowApi`] carries orders from cart snapshot through payment
//! reconciliation and fulfillment. [`order_query_api::OrderQueryApi`] serves read queries with
//! ownership checks. Both are generic over the backend traits so the HTTP layer and the tests
//! can supply different implementations.

pub mod eligibility;
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod order_query_api;
pub mod shipping;
