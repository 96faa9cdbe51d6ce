// ==========================================
// Production Scheduling Engine - engine layer
// ==========================================
// Stateless business rules. Ordering, projection, and conflict math
// are pure and synchronous; persistence happens only through the
// repository layer at the orchestrator's and lifecycle controller's
// commit points.
// ==========================================

pub mod calendar;
pub mod capacity;
pub mod conflicts;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod projector;
pub mod reporter;
pub mod sequencer;

pub use conflicts::ConflictDetector;
pub use error::{SchedulingError, SchedulingResult};
pub use lifecycle::LifecycleController;
pub use orchestrator::{ScheduleOrchestrator, DEFAULT_HORIZON_DAYS};
pub use projector::{Projection, TimelineProjector};
pub use reporter::{CapacityReporter, DEFAULT_REPORT_PERIOD_DAYS};
pub use sequencer::Sequencer;
