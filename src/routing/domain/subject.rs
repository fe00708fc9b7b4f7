//! Subject catalog and capability sets.

use super::ParseSubjectError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A topic a requester can ask for help with.
///
/// The catalog is fixed and small; ordering follows declaration order so
/// capability sets iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// Mathematics.
    Math,
    /// History.
    History,
    /// Geography.
    Geography,
    /// Biology.
    Biology,
    /// Chemistry.
    Chemistry,
    /// Physics.
    Physics,
    /// Computer science.
    ComputerScience,
}

impl Subject {
    /// Every subject in catalog order.
    pub const ALL: [Self; 7] = [
        Self::Math,
        Self::History,
        Self::Geography,
        Self::Biology,
        Self::Chemistry,
        Self::Physics,
        Self::ComputerScience,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Math => "math",
            Self::History => "history",
            Self::Geography => "geography",
            Self::Biology => "biology",
            Self::Chemistry => "chemistry",
            Self::Physics => "physics",
            Self::ComputerScience => "computer_science",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Subject {
    type Error = ParseSubjectError;

    /// Accepts canonical names as well as the short keys hosts historically
    /// used (`hist`, `geo`, `bio`, `chem`, `comp sci`).
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "math" => Ok(Self::Math),
            "hist" | "history" => Ok(Self::History),
            "geo" | "geography" => Ok(Self::Geography),
            "bio" | "biology" => Ok(Self::Biology),
            "chem" | "chemistry" => Ok(Self::Chemistry),
            "physics" => Ok(Self::Physics),
            "comp sci" | "comp_sci" | "computer_science" | "computer science" => {
                Ok(Self::ComputerScience)
            }
            _ => Err(ParseSubjectError(value.to_owned())),
        }
    }
}

/// The set of subjects a specialist can handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectSet(BTreeSet<Subject>);

impl SubjectSet {
    /// Creates an empty capability set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns whether `subject` is in the set.
    #[must_use]
    pub fn contains(&self, subject: Subject) -> bool {
        self.0.contains(&subject)
    }

    /// Adds a subject, returning `true` when it was not already present.
    pub fn insert(&mut self, subject: Subject) -> bool {
        self.0.insert(subject)
    }

    /// Removes a subject, returning `true` when it was present.
    pub fn remove(&mut self, subject: Subject) -> bool {
        self.0.remove(&subject)
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of subjects in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates subjects in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = Subject> + '_ {
        self.0.iter().copied()
    }

    /// Subjects present in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = Subject> + 'a {
        self.0.difference(&other.0).copied()
    }
}

impl FromIterator<Subject> for SubjectSet {
    fn from_iter<I: IntoIterator<Item = Subject>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Subject; N]> for SubjectSet {
    fn from(subjects: [Subject; N]) -> Self {
        subjects.into_iter().collect()
    }
}
