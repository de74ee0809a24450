#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod progress;
pub mod stats;
pub mod time;

pub use error::Error;
pub use progress::{
    BestAccuracy, COMPLETION_THRESHOLD, compute_best_accuracy, compute_container_progress,
    filter_by_status,
};
pub use time::Clock;
