// ==========================================
// Production Scheduling Engine - API layer
// ==========================================
// Thin facades over the engines and repositories. No business rules
// here beyond code resolution and configuration lookup.
// ==========================================

pub mod error;
pub mod scheduling_api;
pub mod work_order_api;

pub use error::{ApiError, ApiResult};
pub use scheduling_api::SchedulingApi;
pub use work_order_api::{CreatedWorkOrder, TransitionOutcome, WorkOrderApi};
