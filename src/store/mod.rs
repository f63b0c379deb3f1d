pub mod checkpoint;
pub mod intake;
pub mod review;

pub use checkpoint::{Checkpoint, CheckpointStore, FileCheckpointStore};
pub use intake::{FileIntakeStore, IntakeRecord};
pub use review::{
    FileReviewStore, HumanReviewRequest, ReviewResolution, ReviewStatus, ReviewStore,
};
