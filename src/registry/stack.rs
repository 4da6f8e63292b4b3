//! In-progress stack
//!
//! Names of the types currently under construction, innermost last. A name
//! found here while resolving means the type graph loops back on itself.

use crate::error::{Error, Result};
use crate::namespaces::QName;

/// Recursion guard for one resolution session
#[derive(Debug, Default)]
pub struct InProgressStack {
    names: Vec<QName>,
}

impl InProgressStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `name` is under construction
    pub fn contains(&self, name: &QName) -> bool {
        self.names.contains(name)
    }

    /// Mark `name` as under construction
    pub fn push(&mut self, name: QName) -> Result<()> {
        if self.contains(&name) {
            return Err(Error::RecursionGuardViolation(name));
        }
        self.names.push(name);
        Ok(())
    }

    /// Unmark the innermost name, which must be `name`
    pub fn pop(&mut self, name: &QName) {
        let popped = self.names.pop();
        debug_assert_eq!(popped.as_ref(), Some(name), "in-progress stack out of order");
    }

    /// Names under construction, outermost first
    pub fn names(&self) -> &[QName] {
        &self.names
    }

    /// Depth of the stack
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if nothing is under construction
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
