//! Risk Kernel REST Service
//!
//! Exposes the risk engine as a REST API. Every metric endpoint takes a
//! system graph as its JSON body.
//!
//! ## Endpoints
//!
//! - `POST /risk` - System failure probability
//! - `POST /birnbaum-structural-importances` - Structural importance per entity
//! - `POST /birnbaum-importances` - Birnbaum importance per entity
//! - `POST /attribute/:att/:val/birnbaum-structural-importances` - Structural importance of a selected group
//! - `POST /attribute/:att/:val/birnbaum-importances` - Birnbaum importance of a selected group
//! - `POST /fractional-importance-traits` - Risk share per attribute value
//! - `GET /status` - Liveness check

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_computation};
pub use routes::{create_router, AppState};
pub use state::{ComputeGuard, ComputeLocks, ServiceState};
