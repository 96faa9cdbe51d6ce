// ==========================================
// Production Scheduling Engine - repository layer
// ==========================================
// Data access only; business rules live in the engine layer. The
// three commit paths (sequence, projection, status CAS) are each
// atomic here.
// ==========================================

pub mod error;
pub mod operation_repo;
pub mod work_center_repo;
pub mod work_order_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use operation_repo::{NewOperation, OperationRepository};
pub use work_center_repo::{NewWorkCenter, WorkCenterRepository};
pub use work_order_repo::{DeleteOutcome, NewWorkOrder, WorkOrderRepository};
