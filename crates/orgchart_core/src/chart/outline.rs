//! Headless box-drawing outline renderer.

use super::ChartRenderer;
use crate::model::node::OrgNode;
use crate::model::snapshot::Hierarchy;
use std::collections::HashSet;

/// Lays the hierarchy out as an indented text outline.
///
/// One line per node: `name (title)`, children in node-list order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutlineRenderer {
    output: String,
    render_count: usize,
}

impl OutlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered outline; empty when nothing is drawn.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }
}

impl ChartRenderer for OutlineRenderer {
    fn render(&mut self, snapshot: &Hierarchy) {
        self.output = render_outline(snapshot);
        self.render_count += 1;
    }

    fn clear(&mut self) {
        self.output.clear();
    }
}

/// Renders `snapshot` into an outline string.
pub fn render_outline(snapshot: &Hierarchy) -> String {
    let mut out = String::new();
    let Some(root) = snapshot.root() else {
        return out;
    };
    let mut visited = HashSet::new();
    out.push_str(&label(root));
    out.push('\n');
    visited.insert(root.id.as_str());
    write_children(snapshot, &root.id, "", &mut visited, &mut out);
    out
}

fn write_children<'a>(
    snapshot: &'a Hierarchy,
    parent_id: &'a str,
    prefix: &str,
    visited: &mut HashSet<&'a str>,
    out: &mut String,
) {
    let children: Vec<&'a OrgNode> = snapshot
        .children_of(parent_id)
        .filter(|child| !visited.contains(child.id.as_str()))
        .collect();

    for (index, child) in children.iter().copied().enumerate() {
        if !visited.insert(child.id.as_str()) {
            continue;
        }
        let is_last = index + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if is_last { "└─ " } else { "├─ " });
        out.push_str(&label(child));
        out.push('\n');

        let nested = format!("{prefix}{}", if is_last { "   " } else { "│  " });
        write_children(snapshot, &child.id, &nested, visited, out);
    }
}

fn label(node: &OrgNode) -> String {
    format!("{} ({})", node.name, node.title)
}
