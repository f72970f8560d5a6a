//! Ordered, name-keyed capability tables.
//!
//! Each namespace is a closed enum of capabilities. The enum variant is the
//! handler key: the dispatcher matches on it exhaustively, so every
//! descriptor has exactly one handler. The registry adds the string side,
//! checking at construction that names are unique and that every descriptor
//! carries the name it is registered under.

use std::collections::HashMap;
use std::fmt;

use crate::error::GithubMcpError;

/// One of the two independent capability sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Tools,
    Prompts,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Tools => f.write_str("tool"),
            Namespace::Prompts => f.write_str("prompt"),
        }
    }
}

/// Static metadata that can report the key it was declared under.
pub trait Descriptor: Clone {
    fn name(&self) -> &str;
}

/// A capability set whose members are known at compile time.
pub trait Capability: Copy + Eq + fmt::Debug + 'static {
    type Descriptor: Descriptor;

    const NAMESPACE: Namespace;

    /// Every member, in registration order.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn descriptor(self) -> Self::Descriptor;
}

pub struct Registry<C: Capability> {
    entries: Vec<(C, C::Descriptor)>,
    index: HashMap<&'static str, usize>,
}

impl<C: Capability> Registry<C> {
    /// Build the table for `C`, rejecting duplicate or mismatched names.
    pub fn new() -> Result<Self, GithubMcpError> {
        let mut entries = Vec::with_capacity(C::ALL.len());
        let mut index = HashMap::with_capacity(C::ALL.len());

        for &capability in C::ALL {
            let key = capability.name();
            let descriptor = capability.descriptor();

            if descriptor.name() != key {
                return Err(GithubMcpError::InconsistentRegistry(format!(
                    "{} {:?} is registered as '{}' but describes itself as '{}'",
                    C::NAMESPACE,
                    capability,
                    key,
                    descriptor.name()
                )));
            }
            if index.insert(key, entries.len()).is_some() {
                return Err(GithubMcpError::InconsistentRegistry(format!(
                    "duplicate {} name '{}'",
                    C::NAMESPACE,
                    key
                )));
            }
            entries.push((capability, descriptor));
        }

        Ok(Self { entries, index })
    }

    pub fn namespace(&self) -> Namespace {
        C::NAMESPACE
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &C::Descriptor> + '_ {
        self.entries.iter().map(|(_, descriptor)| descriptor)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(capability, _)| capability.name())
    }

    pub fn resolve(&self, name: &str) -> Result<C, GithubMcpError> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].0)
            .ok_or_else(|| GithubMcpError::CapabilityNotFound {
                namespace: C::NAMESPACE,
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
