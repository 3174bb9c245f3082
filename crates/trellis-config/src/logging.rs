//! Log output formats.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::default_log_format;

/// How log events are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with fields flattened to the top level.
    Json,
    /// Single-line text for people reading a terminal.
    Compact,
}

impl LogFormat {
    /// Whether the format may carry ANSI colour codes.
    ///
    /// JSON output is consumed by machines and never coloured.
    #[must_use]
    pub const fn supports_colour(self) -> bool {
        matches!(self, Self::Compact)
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        default_log_format()
    }
}

/// Error returned when text names no [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;
