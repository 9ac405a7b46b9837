//! Participants and their identities.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque participant identity.
///
/// Integer ids are carried in their decimal form, so `ParticipantId::from(7u64)`
/// and `ParticipantId::from("7")` are the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ParticipantId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant: both a giver and a potential recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Identities this participant must never be assigned to give to.
    #[serde(default)]
    pub excluded: BTreeSet<ParticipantId>,
}

impl Participant {
    /// A participant with no exclusions.
    pub fn new(id: impl Into<ParticipantId>) -> Self {
        Self {
            id: id.into(),
            excluded: BTreeSet::new(),
        }
    }

    /// Add one excluded recipient.
    pub fn excluding(mut self, other: impl Into<ParticipantId>) -> Self {
        self.excluded.insert(other.into());
        self
    }

    /// Add several excluded recipients.
    pub fn with_exclusions<I, T>(mut self, others: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ParticipantId>,
    {
        self.excluded.extend(others.into_iter().map(Into::into));
        self
    }

    /// Whether `recipient` may be drawn for this participant.
    pub fn may_give_to(&self, recipient: &ParticipantId) -> bool {
        *recipient != self.id && !self.excluded.contains(recipient)
    }
}
