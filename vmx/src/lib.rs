//! Line-oriented reader and writer for VMware `.vmx` configuration text.
//!
//! A document is kept as the ordered sequence of its lines. Assignments of
//! the form `key = "value"` are parsed; everything else (comments, blank
//! lines, anything unrecognised) passes through untouched. Writing a
//! document back emits every untouched line byte-for-byte, so only lines
//! that were explicitly changed differ from the input.

mod adapter;
mod line;

pub use crate::adapter::{adapter_id, is_generated_address_key};
pub use crate::line::{Assignment, Line};

use indexmap::IndexMap;
use std::fmt::{self, Display};

pub const TOOLS_REMIND_INSTALL: &str = "tools.remindInstall";
pub const UUID_ACTION: &str = "uuid.action";

/// Whether [`VmxDocument::rewrite_for_clone`] may add keys that are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    /// The primary `.vmx`: missing keys are appended.
    Config,
    /// Auxiliary configs such as `.vmxf`: only existing keys change.
    Auxiliary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmxDocument {
    lines: Vec<Line>,
}

impl VmxDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(Line::parse).collect(),
        }
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.lines.iter().filter_map(Line::as_assignment)
    }

    /// Updates every existing assignment to `key`. Returns whether any matched.
    pub fn replace(&mut self, key: &str, value: &str) -> bool {
        let mut found = false;
        for line in self.lines.iter_mut() {
            if let Line::Assignment(assignment) = line {
                if assignment.key() == key {
                    assignment.set_value(value);
                    found = true;
                }
            }
        }
        found
    }

    /// Like [`Self::replace`], appending a new assignment when `key` is absent.
    pub fn set(&mut self, key: &str, value: &str) {
        if self.replace(key, value) {
            return;
        }
        let line = Line::Assignment(Assignment::new(key, value));
        // keep a trailing newline trailing
        match self.lines.last() {
            Some(Line::Raw(raw)) if raw.is_empty() => {
                let at = self.lines.len() - 1;
                self.lines.insert(at, line);
            }
            _ => self.lines.push(line),
        }
    }

    /// Drops every assignment whose key satisfies `predicate`.
    pub fn remove_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let before = self.lines.len();
        self.lines.retain(|line| match line {
            Line::Assignment(assignment) => !predicate(assignment.key()),
            Line::Raw(_) => true,
        });
        before - self.lines.len()
    }

    /// Adapter id to MAC address, in order of each adapter's first appearance.
    ///
    /// Both `ethernetN.generatedAddress` and `ethernetN.address` name a MAC;
    /// when an adapter has both, the one appearing later in the file wins.
    pub fn adapters(&self) -> IndexMap<String, String> {
        let mut adapters = IndexMap::new();
        for assignment in self.assignments() {
            if let Some(id) = adapter_id(assignment.key()) {
                adapters.insert(id.to_owned(), assignment.value().to_owned());
            }
        }
        adapters
    }

    /// Prepares a copied config so the clone boots as a distinct machine:
    /// tools reminders off, generated MACs dropped, a fresh uuid on boot.
    pub fn rewrite_for_clone(&mut self, mode: RewriteMode) {
        self.remove_where(is_generated_address_key);
        match mode {
            RewriteMode::Config => {
                self.set(TOOLS_REMIND_INSTALL, "FALSE");
                self.set(UUID_ACTION, "create");
            }
            RewriteMode::Auxiliary => {
                self.replace(TOOLS_REMIND_INSTALL, "FALSE");
                self.replace(UUID_ACTION, "create");
            }
        }
    }
}

impl Display for VmxDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Literal, case-sensitive substitution of a machine name inside config text.
pub fn rename(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_owned();
    }
    text.replace(from, to)
}
