#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of the grading process for an AGS score, as reported by the tool.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum GradingProgress {
    /// The grading process is completed; the score is final.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "FullyGraded"))]
    FullyGraded,
    /// Final grade is pending, may require further automatic processing.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pending"))]
    Pending,
    /// Final grade is pending a human review.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PendingManual"))]
    PendingManual,
    /// The grading could not complete.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Failed"))]
    Failed,
    /// There is no grading process occurring.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "NotReady"))]
    NotReady,
}

impl GradingProgress {
    pub const ALL: &'static [GradingProgress] = &[
        Self::FullyGraded,
        Self::Pending,
        Self::PendingManual,
        Self::Failed,
        Self::NotReady,
    ];

    /// Returns true if the score can be pushed to the gradebook.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::FullyGraded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullyGraded => "FullyGraded",
            Self::Pending => "Pending",
            Self::PendingManual => "PendingManual",
            Self::Failed => "Failed",
            Self::NotReady => "NotReady",
        }
    }
}

impl fmt::Display for GradingProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for GradingProgress {
    fn default() -> Self {
        Self::NotReady
    }
}

/// Status of the user's activity on the tool side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum ActivityProgress {
    /// The user has not started the activity, or the activity has been reset.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Initialized"))]
    Initialized,
    /// The activity associated with the line item has been started.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Started"))]
    Started,
    /// The activity is being drafted and is available for comment.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "InProgress"))]
    InProgress,
    /// The activity has been submitted at least once; it may still be retried.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Submitted"))]
    Submitted,
    /// The user has completed the activity.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Completed"))]
    Completed,
}

impl ActivityProgress {
    pub const ALL: &'static [ActivityProgress] = &[
        Self::Initialized,
        Self::Started,
        Self::InProgress,
        Self::Submitted,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "Initialized",
            Self::Started => "Started",
            Self::InProgress => "InProgress",
            Self::Submitted => "Submitted",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for ActivityProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ActivityProgress {
    fn default() -> Self {
        Self::Initialized
    }
}

/// Error when parsing an invalid progress string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProgressError {
    invalid: String,
    valid: Vec<&'static str>,
}

impl fmt::Display for ParseProgressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid progress '{}'. Valid values: {}",
            self.invalid,
            self.valid.join(", ")
        )
    }
}

impl std::error::Error for ParseProgressError {}

impl FromStr for GradingProgress {
    type Err = ParseProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseProgressError {
                invalid: s.to_string(),
                valid: Self::ALL.iter().map(|p| p.as_str()).collect(),
            })
    }
}

impl FromStr for ActivityProgress {
    type Err = ParseProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseProgressError {
                invalid: s.to_string(),
                valid: Self::ALL.iter().map(|p| p.as_str()).collect(),
            })
    }
}
