//! Source and version selection policies.
//!
//! A product request names *which contributors* to consider
//! ([`SourceSelection`]) and *which versions* of each contributor's history
//! to return ([`VersionPolicy`]).

use core::fmt;
use core::str::FromStr;

/// The rejected input of a version-policy parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no version policy defined for {value:?}")]
pub struct InvalidPolicy {
    /// The value that did not name a policy.
    pub value: String,
}

/// Which contributing sources a product request considers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SourceSelection {
    /// The source of the single most authoritative submission.
    #[default]
    Preferred,
    /// Every source, each resolved independently.
    All,
    /// One named contributing network (`us`, `ci`, `ak`, ...).
    Source(String),
}

impl SourceSelection {
    /// Select one named source.
    pub fn source(id: impl Into<String>) -> Self {
        Self::Source(id.into())
    }

    /// The explicit source id, if this selection names one.
    pub fn as_source(&self) -> Option<&str> {
        match self {
            Self::Source(id) => Some(id),
            Self::Preferred | Self::All => None,
        }
    }
}

impl FromStr for SourceSelection {
    type Err = core::convert::Infallible;

    /// `"preferred"` and `"all"` are keywords in any case; anything else is
    /// a source id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("preferred") {
            Self::Preferred
        } else if s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Source(s.to_owned())
        })
    }
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preferred => f.write_str("preferred"),
            Self::All => f.write_str("all"),
            Self::Source(id) => f.write_str(id),
        }
    }
}

/// Which versions of a source's history a product request returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VersionPolicy {
    /// The highest-weight version, latest update on ties.
    #[default]
    Preferred,
    /// The chronologically first version.
    First,
    /// The chronologically last version.
    Last,
    /// Every version, oldest first.
    All,
}

impl VersionPolicy {
    /// Every policy, in declaration order.
    pub const ALL: [Self; 4] = [Self::Preferred, Self::First, Self::Last, Self::All];

    /// Legacy numeric code for this policy.
    pub const fn code(self) -> u8 {
        match self {
            Self::Last => 1,
            Self::First => 2,
            Self::All => 3,
            Self::Preferred => 4,
        }
    }

    /// Lowercase keyword for this policy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preferred => "preferred",
            Self::First => "first",
            Self::Last => "last",
            Self::All => "all",
        }
    }
}

impl TryFrom<i64> for VersionPolicy {
    type Error = InvalidPolicy;

    /// Map the legacy numeric codes (`LAST=1`, `FIRST=2`, `ALL=3`,
    /// `PREFERRED=4`).
    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Last),
            2 => Ok(Self::First),
            3 => Ok(Self::All),
            4 => Ok(Self::Preferred),
            other => Err(InvalidPolicy {
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for VersionPolicy {
    type Err = InvalidPolicy;

    /// Accepts the keywords case-insensitively, or a legacy numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Self::try_from(code);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "preferred" => Ok(Self::Preferred),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "all" => Ok(Self::All),
            _ => Err(InvalidPolicy {
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
