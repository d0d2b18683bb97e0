//! Identifying channels and the identifiers bound to them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Medium a passwordless token is scoped to and delivered over.
///
/// Wire format: `"EMAIL"` / `"MOBILE"` (also the stored column value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Email,
    Mobile,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Email, Channel::Mobile];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Mobile => "MOBILE",
        }
    }

    /// Request body field that carries the identifier for this channel.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Mobile => "phone_number",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL" => Ok(Self::Email),
            "MOBILE" => Ok(Self::Mobile),
            other => Err(UnknownChannel(other.to_owned())),
        }
    }
}

/// Reasons a raw identifier is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("enter a valid phone number")]
    InvalidPhoneNumber,
}

/// An account identifier tagged with the channel it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Email(String),
    Mobile(String),
}

impl Identifier {
    /// Parse and normalize a raw identifier for `channel`.
    ///
    /// Emails keep their local part verbatim and have the domain lower-cased.
    /// Phone numbers must be E.164 (`+` then 8 to 15 digits, no leading zero).
    pub fn parse(channel: Channel, raw: &str) -> Result<Self, IdentifierError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(IdentifierError::Missing(channel.field_name()));
        }
        match channel {
            Channel::Email => normalize_email(raw).map(Self::Email),
            Channel::Mobile => normalize_phone_number(raw).map(Self::Mobile),
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Self::Email(_) => Channel::Email,
            Self::Mobile(_) => Channel::Mobile,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(v) | Self::Mobile(v) => v,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_email(raw: &str) -> Result<String, IdentifierError> {
    let (local, domain) = raw.rsplit_once('@').ok_or(IdentifierError::InvalidEmail)?;
    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || raw.chars().any(char::is_whitespace)
    {
        return Err(IdentifierError::InvalidEmail);
    }
    Ok(format!("{local}@{}", domain.to_lowercase()))
}

fn normalize_phone_number(raw: &str) -> Result<String, IdentifierError> {
    let digits = raw
        .strip_prefix('+')
        .ok_or(IdentifierError::InvalidPhoneNumber)?;
    let valid = (8..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');
    if !valid {
        return Err(IdentifierError::InvalidPhoneNumber);
    }
    Ok(raw.to_owned())
}
