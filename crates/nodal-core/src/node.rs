//! Element ports.

use std::fmt;

/// Handle identifying an element within its netlist.
///
/// Nodes refer back to their owning element through this handle; the
/// element collection itself belongs to the topology manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    /// Create an ElementId from a raw value.
    pub fn new(id: u32) -> Self {
        ElementId(id)
    }

    /// Get the raw ID value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One port of an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Netlist name of the node this port connects to.
    name: String,
    /// Port index within the owning element.
    port: usize,
    /// Synthesized node that is not visible to the user.
    internal: bool,
    /// Owning element.
    owner: ElementId,
    /// Harmonic-balance numbering label.
    label: i32,
}

impl Node {
    /// Create a port.
    pub fn new(name: impl Into<String>, port: usize, internal: bool, owner: ElementId) -> Self {
        Self {
            name: name.into(),
            port,
            internal,
            owner,
            label: 0,
        }
    }

    /// An unnamed port, as created when an element is sized.
    pub fn unnamed(port: usize, owner: ElementId) -> Self {
        Self::new(String::new(), port, false, owner)
    }

    /// Get the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the port index.
    pub fn port(&self) -> usize {
        self.port
    }

    /// Check whether the node was synthesized internally.
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Get the owning element.
    pub fn owner(&self) -> ElementId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: ElementId) {
        self.owner = owner;
    }

    /// Get the harmonic-balance label.
    pub fn label(&self) -> i32 {
        self.label
    }

    /// Set the harmonic-balance label.
    pub fn set_label(&mut self, label: i32) {
        self.label = label;
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}:{}", self.owner, self.port)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
