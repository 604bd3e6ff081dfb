//! Dues engine for the association member system.
//!
//! Period calendar arithmetic, enrollment eligibility, historical price
//! resolution, payment ledger projection and expected-revenue aggregation,
//! exposed as a JSON API consumed by the administration front end.

pub mod calendar;
pub mod constants;
pub mod eligibility;
pub mod forecast;
pub mod ledger;
pub mod memo;
pub mod models;
pub mod prices;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use ledger::{PaymentOrigin, PaymentState};
pub use prices::{resolve_price, PriceKind};
pub use routes::router;
