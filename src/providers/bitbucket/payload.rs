//! Bitbucket pipeline trigger payload

use crate::core::{Target, Trigger, Variable};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetType {
    #[serde(rename = "pipeline_commit_target")]
    Commit,
    #[serde(rename = "pipeline_ref_target")]
    Ref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Branch,
    Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorType {
    Branches,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    pub hash: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl CommitRef {
    fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            kind: "commit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    #[serde(rename = "type")]
    pub kind: SelectorType,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadTarget {
    #[serde(rename = "type")]
    pub kind: TargetType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<RefType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitRef>,
    pub selector: Selector,
}

/// Body of `POST repositories/{repository}/pipelines/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerPayload {
    pub target: PayloadTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<Variable>>,
}

/// Build the payload for a resolved target and trigger
///
/// `tag_commit` is the commit a tag target points to; Bitbucket needs it
/// alongside the tag name.
pub fn build_payload(target: &Target, trigger: &Trigger, tag_commit: Option<&str>) -> TriggerPayload {
    let (kind, ref_type, ref_name, commit) = match target {
        Target::Commit(hash) => (TargetType::Commit, None, None, Some(CommitRef::new(hash.as_str()))),
        Target::Branch(name) => (TargetType::Ref, Some(RefType::Branch), Some(name.clone()), None),
        Target::Tag(name) => (
            TargetType::Ref,
            Some(RefType::Tag),
            Some(name.clone()),
            tag_commit.map(CommitRef::new),
        ),
    };

    let (selector, variables) = match trigger {
        Trigger::Branch(name) => (
            Selector {
                kind: SelectorType::Branches,
                pattern: name.clone(),
            },
            None,
        ),
        Trigger::Custom { name, variables } => (
            Selector {
                kind: SelectorType::Custom,
                pattern: name.clone(),
            },
            variables.clone().map(|vars| vars.into_ordered()),
        ),
    };

    TriggerPayload {
        target: PayloadTarget {
            kind,
            ref_type,
            ref_name,
            commit,
            selector,
        },
        variables,
    }
}
