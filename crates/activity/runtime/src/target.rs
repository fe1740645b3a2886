//! What an async entry schedules.

use std::fmt;
use std::sync::Arc;

use crate::registry::ActivityHandler;

/// Label used for inline targets in logs and activity contexts.
pub const INLINE_LABEL: &str = "<inline>";

/// An implementation passed directly to a local async entry.
#[derive(Clone)]
pub struct InlineActivity {
    handler: Arc<dyn ActivityHandler>,
}

impl InlineActivity {
    pub fn new(handler: Arc<dyn ActivityHandler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Arc<dyn ActivityHandler> {
        &self.handler
    }
}

impl fmt::Debug for InlineActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InlineActivity")
    }
}

/// Resolved invocation target.
#[derive(Clone, Debug)]
pub enum Target {
    /// Dispatch through the registry by logical name
    ByName(String),
    /// Run the supplied implementation directly
    Inline(InlineActivity),
}

impl Target {
    pub fn by_name(name: impl Into<String>) -> Self {
        Target::ByName(name.into())
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Target::Inline(_))
    }

    pub fn label(&self) -> &str {
        match self {
            Target::ByName(name) => name,
            Target::Inline(_) => INLINE_LABEL,
        }
    }
}
