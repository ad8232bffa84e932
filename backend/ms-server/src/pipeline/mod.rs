pub mod gatekeeper;
pub mod pipeline_state;
pub mod rejection;
pub mod request_id;
pub mod route_access;

pub use gatekeeper::{GateOutcome, Gatekeeper};
pub use pipeline_state::{PipelineState, RejectionReason, StateTrail};
pub use rejection::Rejection;
pub use request_id::{REQUEST_ID_HEADER, resolve_request_id};
pub use route_access::RouteAccess;
