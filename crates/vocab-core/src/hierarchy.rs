//! Request scope: which overlay hierarchy a query sees, and through which edges.

use crate::error::{Error, Result};
use crate::graph::{Direction, Predicate, PredicateCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Allow-list of relationship types a traversal may follow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateSet(BTreeSet<Predicate>);

impl PredicateSet {
    pub fn contains(&self, predicate: Predicate) -> bool {
        self.0.contains(&predicate)
    }

    pub fn insert(&mut self, predicate: Predicate) -> bool {
        self.0.insert(predicate)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Predicate> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Predicate> for PredicateSet {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One overlay hierarchy as seen by a request.
///
/// `functional` is the single relationship type that counts as a hierarchy
/// level; `structural` types only group or alias terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub root: String,
    pub direction: Direction,
    pub functional: Predicate,
    pub structural: Vec<Predicate>,
}

impl Hierarchy {
    /// Scope with the default structural types.
    pub fn new(root: impl Into<String>, functional: Predicate, direction: Direction) -> Result<Self> {
        let hierarchy = Self {
            root: root.into(),
            direction,
            functional,
            structural: Predicate::DEFAULT_STRUCTURAL.to_vec(),
        };
        hierarchy.check()?;
        Ok(hierarchy)
    }

    /// Build a scope from caller-supplied names, failing before any store access
    /// when a name falls outside the vocabulary or the wrong category is used.
    pub fn parse(
        root: &str,
        ascending: bool,
        functional: &str,
        structural: Option<&[String]>,
    ) -> Result<Self> {
        let functional: Predicate = functional.parse()?;
        let structural = match structural {
            Some(names) => names
                .iter()
                .map(|n| n.parse())
                .collect::<Result<Vec<Predicate>>>()?,
            None => Predicate::DEFAULT_STRUCTURAL.to_vec(),
        };
        let hierarchy = Self {
            root: root.to_string(),
            direction: Direction::from_ascending(ascending),
            functional,
            structural,
        };
        hierarchy.check()?;
        Ok(hierarchy)
    }

    pub fn with_structural(mut self, structural: impl IntoIterator<Item = Predicate>) -> Result<Self> {
        self.structural = structural.into_iter().collect();
        self.check()?;
        Ok(self)
    }

    fn check(&self) -> Result<()> {
        if self.root.is_empty() {
            return Err(Error::invalid("root handle", ""));
        }
        if !self.functional.is_functional() {
            return Err(Error::CategoryMismatch {
                predicate: self.functional,
                expected: PredicateCategory::Functional,
            });
        }
        if let Some(&bad) = self.structural.iter().find(|p| p.is_functional()) {
            return Err(Error::CategoryMismatch {
                predicate: bad,
                expected: PredicateCategory::Structural,
            });
        }
        Ok(())
    }

    /// The functional type alone.
    pub fn functional_set(&self) -> PredicateSet {
        PredicateSet::from_iter([self.functional])
    }

    /// The functional type together with every structural type.
    pub fn bound_set(&self) -> PredicateSet {
        self.structural
            .iter()
            .copied()
            .chain([self.functional])
            .collect()
    }
}
