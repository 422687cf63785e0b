use alloc::string::{String, ToString};
use core::fmt::{Display, Formatter};
use core::str::FromStr;

use crate::schedule::Moment;

/// Terminal outcome of one schedule.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[cfg_attr(feature = "serde", serde(tag = "result", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Every operation passed the timestamp-order check.
    Ok { schedule: String },
    /// The operation at `moment` conflicted; later operations were not run.
    Rollback { schedule: String, moment: Moment },
}

impl Verdict {
    #[must_use]
    pub fn schedule(&self) -> &str {
        match self {
            Self::Ok { schedule } | Self::Rollback { schedule, .. } => schedule,
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Moment of the conflicting operation, if the schedule rolled back.
    #[must_use]
    pub const fn conflict_moment(&self) -> Option<Moment> {
        match self {
            Self::Ok { .. } => None,
            Self::Rollback { moment, .. } => Some(*moment),
        }
    }
}

/// Output-file form: `E_1-OK` or `E_1-ROLLBACK-3`.
impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Ok { schedule } => write!(f, "{schedule}-OK"),
            Self::Rollback { schedule, moment } => write!(f, "{schedule}-ROLLBACK-{moment}"),
        }
    }
}

/// Error parsing a [`Verdict`] from its output-file form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictParseError {
    pub line: String,
}

impl Display for VerdictParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "not a verdict line: `{}`", self.line)
    }
}

impl core::error::Error for VerdictParseError {}

impl FromStr for Verdict {
    type Err = VerdictParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end();
        if let Some(schedule) = line.strip_suffix("-OK") {
            return Ok(Self::Ok {
                schedule: schedule.to_string(),
            });
        }
        line.rsplit_once("-ROLLBACK-")
            .and_then(|(schedule, moment)| {
                moment.parse().ok().map(|moment| Self::Rollback {
                    schedule: schedule.to_string(),
                    moment,
                })
            })
            .ok_or_else(|| VerdictParseError {
                line: line.to_string(),
            })
    }
}
