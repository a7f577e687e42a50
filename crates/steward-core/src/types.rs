//! Identifier newtypes shared across the kernel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why an identifier string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    /// The identifier is empty.
    Empty,
    /// The identifier is whitespace-only or has leading/trailing whitespace.
    Whitespace,
    /// The identifier contains characters outside the allowed set.
    InvalidCharacters,
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier cannot be empty"),
            Self::Whitespace => write!(f, "identifier cannot contain surrounding whitespace"),
            Self::InvalidCharacters => write!(
                f,
                "identifier may only contain alphanumeric characters, hyphens, underscores, and dots"
            ),
        }
    }
}

impl std::error::Error for IdValidationError {}

fn validate(s: &str) -> Result<(), IdValidationError> {
    if s.is_empty() {
        return Err(IdValidationError::Empty);
    }
    if s.trim() != s || s.trim().is_empty() {
        return Err(IdValidationError::Whitespace);
    }
    if !s
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(IdValidationError::InvalidCharacters);
    }
    Ok(())
}

/// Unique name of an agent registered with the communication hub.
///
/// Valid ids are non-empty, carry no surrounding whitespace, and use only
/// alphanumeric characters, hyphens, underscores, and dots. Use
/// [`AgentId::parse`] for fallible construction; the `From<&str>` conversion
/// panics on invalid input and is meant for literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    /// Parse and validate an agent id from a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use steward_core::AgentId;
    ///
    /// assert!(AgentId::parse("billing-agent").is_ok());
    /// assert!(AgentId::parse("tier2.support").is_ok());
    /// assert!(AgentId::parse("").is_err());
    /// assert!(AgentId::parse("agent one").is_err());
    /// ```
    pub fn parse(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
        let s = id.as_ref();
        validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Get the agent id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AgentId {
    type Err = IdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for AgentId {
    /// # Panics
    ///
    /// Panics if the string fails validation. Use [`AgentId::parse`] for
    /// non-panicking construction.
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|e| panic!("invalid agent id '{}': {}", s, e))
    }
}

impl From<String> for AgentId {
    /// # Panics
    ///
    /// Panics if the string fails validation. Use [`AgentId::parse`] for
    /// non-panicking construction.
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or_else(|e| panic!("invalid agent id '{}': {}", s, e))
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Topic name for publish/subscribe delivery.
///
/// Shares the validation rules of [`AgentId`]. Subscriptions are keyed on
/// the exact `(agent, topic)` pair; topics never match by substring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic(String);

impl Topic {
    /// Parse and validate a topic from a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use steward_core::Topic;
    ///
    /// assert!(Topic::parse("billing").is_ok());
    /// assert!(Topic::parse("order.updates").is_ok());
    /// assert!(Topic::parse("bad topic").is_err());
    /// ```
    pub fn parse(topic: impl AsRef<str>) -> Result<Self, IdValidationError> {
        let s = topic.as_ref();
        validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Get the topic as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Topic {
    type Err = IdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for Topic {
    /// # Panics
    ///
    /// Panics if the string fails validation. Use [`Topic::parse`] for
    /// non-panicking construction.
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|e| panic!("invalid topic '{}': {}", s, e))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_ids() {
        assert!(AgentId::parse("billing-agent").is_ok());
        assert!(AgentId::parse("tech_support.2").is_ok());
        assert!(Topic::parse("order.updates").is_ok());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(AgentId::parse(""), Err(IdValidationError::Empty));
        assert_eq!(AgentId::parse("   "), Err(IdValidationError::Whitespace));
        assert_eq!(AgentId::parse(" agent"), Err(IdValidationError::Whitespace));
        assert_eq!(
            AgentId::parse("agent/one"),
            Err(IdValidationError::InvalidCharacters)
        );
        assert_eq!(
            Topic::parse("a topic"),
            Err(IdValidationError::InvalidCharacters)
        );
    }

    #[test]
    fn round_trips_through_display() {
        let id = AgentId::parse("escalation").unwrap();
        assert_eq!(id.to_string(), "escalation");
        assert_eq!(id.as_str(), "escalation");
    }
}
