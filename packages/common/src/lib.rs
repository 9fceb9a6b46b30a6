pub mod event;
pub mod score_progress;
pub mod signal;

pub use score_progress::{ActivityProgress, GradingProgress};
