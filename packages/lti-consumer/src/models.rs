pub mod configuration;
pub mod line_item;
pub mod score;

pub use configuration::{LtiConfiguration, NewLtiConfiguration};
pub use line_item::{LineItemService, NewLineItem};
pub use score::{NewScore, ScoreService};
