//! Moderation flags.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentRef, UserId};

/// Reason a user gives for flagging content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagReason {
    /// Not safe for work.
    Nsfw,
    /// Promotional content.
    Prom,
    /// Hurtful or abusive.
    Hurt,
    /// Low quality.
    Less,
}

impl FlagReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nsfw => "nsfw",
            Self::Prom => "prom",
            Self::Hurt => "hurt",
            Self::Less => "less",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "nsfw" => Some(Self::Nsfw),
            "prom" => Some(Self::Prom),
            "hurt" => Some(Self::Hurt),
            "less" => Some(Self::Less),
            _ => None,
        }
    }
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub id: Uuid,
    pub user: UserId,
    pub target: ContentRef,
    pub reason: FlagReason,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("nsfw", Some(FlagReason::Nsfw))]
    #[case("prom", Some(FlagReason::Prom))]
    #[case("hurt", Some(FlagReason::Hurt))]
    #[case("less", Some(FlagReason::Less))]
    #[case("spam", None)]
    #[case("NSFW", None)]
    fn parses_known_reasons(#[case] raw: &str, #[case] expected: Option<FlagReason>) {
        assert_eq!(FlagReason::parse(raw), expected);
    }
}
