//! Target and trigger models
//!
//! A [`Target`] says *where* a pipeline runs (the ref that gets checked out),
//! a [`Trigger`] says *which* pipeline definition runs. Custom triggers may
//! carry [`Variables`], either as a plain mapping or as an ordered list of
//! [`Variable`] records that can be marked as secured.

use crate::core::error::SentenzaError;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// The repository ref a pipeline run checks out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Branch(String),
    Commit(String),
    Tag(String),
}

impl Target {
    pub fn is_branch(&self) -> bool {
        matches!(self, Target::Branch(_))
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, Target::Commit(_))
    }

    /// The branch name, commit hash or tag name
    pub fn value(&self) -> &str {
        match self {
            Target::Branch(name) | Target::Commit(name) | Target::Tag(name) => name,
        }
    }
}

impl From<&str> for Target {
    fn from(branch: &str) -> Self {
        Target::Branch(branch.to_string())
    }
}

impl From<String> for Target {
    fn from(branch: String) -> Self {
        Target::Branch(branch)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Branch(name) => write!(f, "branch {}", name),
            Target::Commit(hash) => write!(f, "commit {}", hash),
            Target::Tag(name) => write!(f, "tag {}", name),
        }
    }
}

/// Which pipeline definition to run
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// The default pipeline of a branch
    Branch(String),
    /// A named custom pipeline
    Custom {
        name: String,
        variables: Option<Variables>,
    },
}

impl Trigger {
    pub fn custom(name: impl Into<String>) -> Self {
        Trigger::Custom {
            name: name.into(),
            variables: None,
        }
    }

    pub fn custom_with(name: impl Into<String>, variables: Variables) -> Self {
        Trigger::Custom {
            name: name.into(),
            variables: Some(variables),
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Trigger::Branch(_))
    }

    /// Pipeline name (branch name for branch pipelines)
    pub fn name(&self) -> &str {
        match self {
            Trigger::Branch(name) => name,
            Trigger::Custom { name, .. } => name,
        }
    }
}

impl From<&str> for Trigger {
    fn from(branch: &str) -> Self {
        Trigger::Branch(branch.to_string())
    }
}

impl From<String> for Trigger {
    fn from(branch: String) -> Self {
        Trigger::Branch(branch)
    }
}

/// Parses the `branch:<name>` / `custom:<name>` syntax used on the command line
impl FromStr for Trigger {
    type Err = SentenzaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("branch:").filter(|n| !n.is_empty()) {
            Ok(Trigger::Branch(name.to_string()))
        } else if let Some(name) = s.strip_prefix("custom:").filter(|n| !n.is_empty()) {
            Ok(Trigger::custom(name))
        } else {
            Err(SentenzaError::InvalidPipelineName(s.to_string()))
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Branch(name) => write!(f, "branch:{}", name),
            Trigger::Custom { name, .. } => write!(f, "custom:{}", name),
        }
    }
}

/// A variable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

/// One entry of the ordered variable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: Scalar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secured: Option<bool>,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            secured: None,
        }
    }

    pub fn secured(key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            secured: Some(true),
        }
    }
}

/// Variables passed to a custom pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Variables {
    /// Plain name -> value mapping, in insertion order
    Map(IndexMap<String, Scalar>),
    /// Ordered records, each optionally secured
    Secured(Vec<Variable>),
}

impl Variables {
    pub fn is_secured(&self) -> bool {
        matches!(self, Variables::Secured(_))
    }

    /// The ordered list form. Mapping entries keep the mapping's iteration
    /// order and carry no `secured` flag.
    pub fn into_ordered(self) -> Vec<Variable> {
        match self {
            Variables::Secured(list) => list,
            Variables::Map(map) => map
                .into_iter()
                .map(|(key, value)| Variable {
                    key,
                    value,
                    secured: None,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Variables::Map(map) => map.len(),
            Variables::Secured(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Variables::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Vec<Variable>> for Variables {
    fn from(list: Vec<Variable>) -> Self {
        Variables::Secured(list)
    }
}
