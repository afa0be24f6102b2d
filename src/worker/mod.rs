pub mod controller;
pub mod loop_worker;
pub mod queue;

pub use controller::{AnalysisController, WorkoutSnapshot};
pub use queue::{FrameQueue, QueueItem};
