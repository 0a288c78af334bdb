pub mod error;
pub mod evaluation;
pub mod ids;
pub mod operations;
pub mod policy;
pub mod preview;
pub mod schedule;
pub mod template;
pub mod time;

pub use error::CoreError;
pub use evaluation::{ConstraintKind, ConstraintResult, Diff};
pub use ids::*;
pub use operations::Operation;
pub use policy::SchedulingPolicy;
pub use preview::{Preview, PreviewStatus};
pub use schedule::ScheduleSnapshot;
