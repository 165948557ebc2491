use serde::{Deserialize, Serialize};

use super::header::PropertyType;

/// How a leaf cell behaves in the renderer.
///
/// Resolved once at schema-compile time and stored on the leaf, so renderers
/// switch on the tag instead of re-inspecting binding-key strings per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    /// Editable free text
    PlainText,
    /// Displayed, never editable
    ReadOnly,
    /// Opens a date-picker session on edit
    DateEditor,
    /// Opens an enumerated status dropdown, rendered as a colored pill
    StatusEditor,
    /// ISO-code-derived flag image plus country-name tooltip
    CountryFlag,
    /// Present in the tree but never rendered
    Hidden,
}

/// A data-bearing column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafColumn {
    pub header: String,
    /// Globally unique key linking this column to flattened row values
    pub binding_key: String,
    /// Suggested width in pixels; advisory, the renderer may override
    pub width: u32,
    pub kind: CellKind,
    /// The source property type, when this leaf came from a deliverable
    /// property (identity and task-date leaves carry `None`)
    pub value_type: Option<PropertyType>,
}

/// A header-only column grouping child columns; carries no data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupColumn {
    pub header: String,
    pub children: Vec<ColumnNode>,
}

/// One node of the compiled column tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum ColumnNode {
    Leaf(LeafColumn),
    Group(GroupColumn),
}

impl ColumnNode {
    pub fn header(&self) -> &str {
        match self {
            ColumnNode::Leaf(leaf) => &leaf.header,
            ColumnNode::Group(group) => &group.header,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafColumn> {
        match self {
            ColumnNode::Leaf(leaf) => Some(leaf),
            ColumnNode::Group(_) => None,
        }
    }
}

/// Collect all leaf columns in display order
pub fn leaves(columns: &[ColumnNode]) -> Vec<&LeafColumn> {
    let mut out = Vec::new();
    collect_leaves(columns, &mut out);
    out
}

fn collect_leaves<'a>(columns: &'a [ColumnNode], out: &mut Vec<&'a LeafColumn>) {
    for node in columns {
        match node {
            ColumnNode::Leaf(leaf) => out.push(leaf),
            ColumnNode::Group(group) => collect_leaves(&group.children, out),
        }
    }
}

/// Find a leaf column by its binding key
pub fn find_leaf<'a>(columns: &'a [ColumnNode], binding_key: &str) -> Option<&'a LeafColumn> {
    for node in columns {
        match node {
            ColumnNode::Leaf(leaf) if leaf.binding_key == binding_key => return Some(leaf),
            ColumnNode::Leaf(_) => {}
            ColumnNode::Group(group) => {
                if let Some(found) = find_leaf(&group.children, binding_key) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Render the column tree as indented text, one node per line.
/// Groups end with `/`; leaves show their binding key and cell kind.
pub fn format_tree(columns: &[ColumnNode]) -> String {
    let mut lines = Vec::new();
    for node in columns {
        format_node(node, 0, &mut lines);
    }
    lines.join("\n")
}

fn format_node(node: &ColumnNode, depth: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(depth);
    match node {
        ColumnNode::Leaf(leaf) => {
            lines.push(format!(
                "{pad}{} [{}] ({:?})",
                leaf.header, leaf.binding_key, leaf.kind
            ));
        }
        ColumnNode::Group(group) => {
            lines.push(format!("{pad}{}/", group.header));
            for child in &group.children {
                format_node(child, depth + 1, lines);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
