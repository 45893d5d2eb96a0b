//! Collected validation findings.
//!
//! Validation never stops at the first problem: every rule runs and appends to
//! a [`Findings`] list so a planner can fix all topology issues in one pass.
//! Each finding carries:
//!
//! - a severity (warning or error)
//! - a category for grouping (topology, naming, spec, ports)
//! - the node label and graph index it refers to
//!
//! # Example
//!
//! ```
//! use powerplan_core::diagnostics::{Category, Findings};
//!
//! let mut findings = Findings::new();
//! findings.add_warning(Category::Spec, "Node has no type", "Distro(A3)", Some(3));
//! findings.add_error(Category::Naming, "Duplicate node name", "Distro(A1)", Some(1));
//!
//! assert_eq!(findings.warning_count(), 1);
//! assert_eq!(findings.error_count(), 1);
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Plan can still be generated, but part of it will be skipped
    Warning,
    /// Plan is not a valid installation as drawn
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Source/distro wiring rules
    Topology,
    /// Name uniqueness
    Naming,
    /// Equipment type and catalog resolution
    Spec,
    /// Port counts and ratings against the catalog
    Ports,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Topology => "topology",
            Category::Naming => "naming",
            Category::Spec => "spec",
            Category::Ports => "ports",
        };
        f.write_str(name)
    }
}

/// A single validation finding against a node of the plan
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Display label of the node, e.g. `Distro(A1)`
    pub entity: String,
    /// Graph index of the node, if it belongs to a plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<usize>,
}

impl Finding {
    pub fn new(
        severity: Severity,
        category: Category,
        message: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            entity: entity.into(),
            node: None,
        }
    }

    pub fn with_node(mut self, node: usize) -> Self {
        self.node = Some(node);
        self
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "[{}:{}] {}: {}",
            severity, self.category, self.entity, self.message
        )
    }
}

/// Ordered collection of findings from one validation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Findings {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, finding: Finding) {
        self.items.push(finding);
    }

    pub fn add_warning(
        &mut self,
        category: Category,
        message: impl Into<String>,
        entity: impl Into<String>,
        node: Option<usize>,
    ) {
        self.push(Severity::Warning, category, message, entity, node);
    }

    pub fn add_error(
        &mut self,
        category: Category,
        message: impl Into<String>,
        entity: impl Into<String>,
        node: Option<usize>,
    ) {
        self.push(Severity::Error, category, message, entity, node);
    }

    fn push(
        &mut self,
        severity: Severity,
        category: Category,
        message: impl Into<String>,
        entity: impl Into<String>,
        node: Option<usize>,
    ) {
        let mut finding = Finding::new(severity, category, message, entity);
        finding.node = node;
        self.items.push(finding);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter()
    }

    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Finding> {
        self.items.iter().filter(move |i| i.category == category)
    }

    /// Findings attached to one node index
    pub fn for_node(&self, node: usize) -> impl Iterator<Item = &Finding> {
        self.items.iter().filter(move |i| i.node == Some(node))
    }

    pub fn merge(&mut self, other: Findings) {
        self.items.extend(other.items);
    }

    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, plural(w)),
            (0, e) => format!("{} error{}", e, plural(e)),
            (w, e) => format!("{} warning{}, {} error{}", w, plural(w), e, plural(e)),
        }
    }
}

impl IntoIterator for Findings {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl std::fmt::Display for Findings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Validation: {}", self.summary())?;
        for item in &self.items {
            writeln!(f, "  {}", item)?;
        }
        Ok(())
    }
}
