//! Task lifecycle and progress aggregation engine.

pub mod generator;
pub mod model;
pub mod progress;
pub mod recorder;
pub mod routes;

pub use generator::{ProfileSnapshot, TaskTemplateGenerator};
pub use model::{Category, Frequency, NewTask, Task};
pub use progress::{ProgressAggregator, ProgressSummary};
pub use recorder::CompletionRecorder;
