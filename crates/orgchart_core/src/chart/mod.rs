//! Chart rendering seam.
//!
//! # Responsibility
//! - Define the swappable renderer backend contract.
//! - Translate node clicks into typed `NodeSelected` events.
//! - Rebuild the rendered layout whenever the snapshot changes.
//!
//! # Invariants
//! - Secretary and unknown nodes never produce a selection event.
//! - A snapshot is rendered at most once; identical snapshots are skipped.

mod outline;

pub use outline::OutlineRenderer;

use crate::model::node::NodeId;
use crate::model::snapshot::Hierarchy;
use log::debug;
use std::sync::Arc;

/// Selection emitted when the user clicks an editable node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSelected {
    pub node_id: NodeId,
    pub current_parent_id: Option<NodeId>,
}

/// Rendering backend for the hierarchical diagram.
///
/// Implementations do a full layout rebuild per call; no differential update
/// is expected.
pub trait ChartRenderer {
    /// Draws the whole snapshot.
    fn render(&mut self, snapshot: &Hierarchy);

    /// Removes any drawn chart (failed fetch).
    fn clear(&mut self) {}
}

/// Keeps one renderer in sync with the current snapshot and resolves clicks
/// against what is actually on screen.
pub struct ChartAdapter<R: ChartRenderer> {
    renderer: R,
    rendered: Option<Arc<Hierarchy>>,
}

impl<R: ChartRenderer> ChartAdapter<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            rendered: None,
        }
    }

    /// Re-renders when `snapshot` differs from the one on screen.
    ///
    /// Returns whether a render happened.
    pub fn sync(&mut self, snapshot: &Arc<Hierarchy>) -> bool {
        if let Some(current) = &self.rendered {
            if Arc::ptr_eq(current, snapshot) || current.version() == snapshot.version() {
                return false;
            }
        }

        self.renderer.render(snapshot);
        debug!(
            "event=render module=chart status=ok version={} nodes={}",
            snapshot.version(),
            snapshot.len()
        );
        self.rendered = Some(Arc::clone(snapshot));
        true
    }

    /// Drops the drawn chart.
    pub fn clear(&mut self) {
        if self.rendered.take().is_some() {
            self.renderer.clear();
            debug!("event=render module=chart status=cleared");
        }
    }

    /// Resolves a click on `node_id`.
    pub fn click(&self, node_id: &str) -> Option<NodeSelected> {
        let node = self.rendered.as_ref()?.get(node_id)?;
        if node.is_secretary {
            return None;
        }
        Some(NodeSelected {
            node_id: node.id.clone(),
            current_parent_id: node.parent_id.clone(),
        })
    }

    /// Version currently on screen.
    pub fn rendered_version(&self) -> Option<u64> {
        self.rendered.as_ref().map(|snapshot| snapshot.version())
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartAdapter, ChartRenderer, NodeSelected};
    use crate::model::node::OrgNode;
    use crate::model::snapshot::Hierarchy;
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingRenderer {
        renders: Vec<u64>,
        clears: usize,
    }

    impl ChartRenderer for CountingRenderer {
        fn render(&mut self, snapshot: &Hierarchy) {
            self.renders.push(snapshot.version());
        }

        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    fn snapshot(version: u64) -> Arc<Hierarchy> {
        let node = |id: &str, parent: Option<&str>, is_secretary: bool| OrgNode {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            name: id.to_string(),
            title: "Member".to_string(),
            image_ref: String::new(),
            is_secretary,
        };
        Arc::new(Hierarchy::new(
            version,
            vec![
                node("A", None, false),
                node("sec-0", Some("A"), true),
                node("B", Some("A"), false),
            ],
        ))
    }

    #[test]
    fn sync_renders_each_version_once() {
        let mut adapter = ChartAdapter::new(CountingRenderer::default());
        let first = snapshot(1);

        assert!(adapter.sync(&first));
        assert!(!adapter.sync(&first));
        assert!(adapter.sync(&snapshot(2)));
        assert_eq!(adapter.renderer().renders, vec![1, 2]);
        assert_eq!(adapter.rendered_version(), Some(2));
    }

    #[test]
    fn click_emits_selection_for_editable_nodes_only() {
        let mut adapter = ChartAdapter::new(CountingRenderer::default());
        assert_eq!(adapter.click("B"), None);

        adapter.sync(&snapshot(1));
        assert_eq!(
            adapter.click("B"),
            Some(NodeSelected {
                node_id: "B".to_string(),
                current_parent_id: Some("A".to_string()),
            })
        );
        assert_eq!(
            adapter.click("A"),
            Some(NodeSelected {
                node_id: "A".to_string(),
                current_parent_id: None,
            })
        );
        assert_eq!(adapter.click("sec-0"), None);
        assert_eq!(adapter.click("missing"), None);
    }

    #[test]
    fn clear_only_touches_renderer_when_something_is_drawn() {
        let mut adapter = ChartAdapter::new(CountingRenderer::default());
        adapter.clear();
        adapter.sync(&snapshot(1));
        adapter.clear();
        assert_eq!(adapter.renderer().clears, 1);
        assert_eq!(adapter.click("B"), None);
    }
}
