//! Per-call context: who is calling and which repository serves them

use crate::repository::MetadataRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity and visibility scope of the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,

    /// Zones the caller may see. Empty means no zone restriction.
    #[serde(default)]
    pub zones: Vec<String>,
}

impl Caller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            zones: Vec::new(),
        }
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zones.push(zone.into());
        self
    }

    /// Whether an element in `element_zones` is visible to this caller.
    /// Elements outside any zone are visible to everyone.
    pub fn can_see_zones(&self, element_zones: &[String]) -> bool {
        self.zones.is_empty()
            || element_zones.is_empty()
            || element_zones.iter().any(|z| self.zones.contains(z))
    }
}

/// Everything one catalog operation needs, passed explicitly into every call
#[derive(Clone)]
pub struct CallContext {
    pub repository: Arc<dyn MetadataRepository>,
    pub caller: Caller,
}

impl CallContext {
    pub fn new(repository: Arc<dyn MetadataRepository>, caller: Caller) -> Self {
        Self { repository, caller }
    }

    pub fn user_id(&self) -> &str {
        &self.caller.user_id
    }
}

impl std::fmt::Debug for CallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallContext")
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}
