//! # Deny-List
//!
//! Explicit `(module, operation) -> forbidden` table checked before any
//! module runs. The default table forbids relaying into the engine's own
//! entry points.

use super::value_objects::Selector;
use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Signature of the engine's relay entry point.
pub const ENGINE_EXECUTE_SIGNATURE: &str =
    "execute(address,address,bytes,uint256,bytes,uint256,uint256,address,address)";

/// Signature of the engine's direct entry point.
pub const ENGINE_INVOKE_SIGNATURE: &str = "invoke(address,address,bytes)";

/// Which modules an entry applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleTarget {
    /// Every module.
    Any,
    /// One module.
    Module(Address),
}

impl ModuleTarget {
    fn matches(&self, module: &Address) -> bool {
        match self {
            Self::Any => true,
            Self::Module(target) => target == module,
        }
    }
}

/// One forbidden operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenyEntry {
    /// Module(s) the entry covers.
    pub target: ModuleTarget,
    /// Forbidden selector.
    pub selector: Selector,
}

impl DenyEntry {
    /// Entry for an operation signature on `target`.
    #[must_use]
    pub fn for_signature(target: ModuleTarget, signature: &str) -> Self {
        Self {
            target,
            selector: Selector::from_signature(signature),
        }
    }
}

/// The deny table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DenyList {
    entries: Vec<DenyEntry>,
}

impl DenyList {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default table: the engine's `execute` and `invoke` on the engine itself.
    #[must_use]
    pub fn default_for(engine: Address) -> Self {
        Self {
            entries: vec![
                DenyEntry::for_signature(ModuleTarget::Module(engine), ENGINE_EXECUTE_SIGNATURE),
                DenyEntry::for_signature(ModuleTarget::Module(engine), ENGINE_INVOKE_SIGNATURE),
            ],
        }
    }

    /// Adds entries.
    #[must_use]
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = DenyEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// True if `selector` on `module` is forbidden.
    #[must_use]
    pub fn is_denied(&self, module: &Address, selector: &Selector) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.selector == *selector && entry.target.matches(module))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
