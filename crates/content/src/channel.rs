//! Social channels a post can target.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use postpilot_core::DomainError;

/// Destination network for a post. Fixed set; wire names are the persisted
/// spellings (`LINKEDIN`, `X_TWITTER`, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Linkedin,
    Instagram,
    XTwitter,
    Facebook,
    Tiktok,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Linkedin,
        Channel::Instagram,
        Channel::XTwitter,
        Channel::Facebook,
        Channel::Tiktok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Linkedin => "LINKEDIN",
            Channel::Instagram => "INSTAGRAM",
            Channel::XTwitter => "X_TWITTER",
            Channel::Facebook => "FACEBOOK",
            Channel::Tiktok => "TIKTOK",
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LINKEDIN" => Ok(Channel::Linkedin),
            "INSTAGRAM" => Ok(Channel::Instagram),
            "X_TWITTER" => Ok(Channel::XTwitter),
            "FACEBOOK" => Ok(Channel::Facebook),
            "TIKTOK" => Ok(Channel::Tiktok),
            other => Err(DomainError::validation(format!(
                "unknown channel: {other} (expected one of LINKEDIN, INSTAGRAM, X_TWITTER, FACEBOOK, TIKTOK)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_names() {
        for channel in Channel::ALL {
            let parsed: Channel = channel.as_str().parse().unwrap();
            assert_eq!(parsed, channel);
        }
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "MYSPACE".parse::<Channel>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
