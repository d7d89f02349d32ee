//! Range-to-range dependency edges.
//!
//! Each edge says "when cells in `source` change, run `callback` to rewrite
//! `target`". Edges live in an ordered arena and are addressed by stable
//! integer ids.
//!
//! # Invariants
//!
//! 1. **No self-dependency:** an edge's source never intersects its target.
//! 2. **One writer per cell:** no two edges have intersecting targets.
//! 3. **Single-level propagation:** a pass fires each matching edge once;
//!    mutations made by a callback do not trigger further edges.
//!
//! Cycles across edges (A writes B's source, B writes A's source) are legal
//! and harmless because of (3).

use gridview_core::GridRange;

use crate::error::{GridError, GridResult};
use crate::model::GridDataModel;

/// Handle of a registered edge. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyId(i32);

impl DependencyId {
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// Called as `callback(model, target, source, user_data)`. The callback owns
/// every write to the target cells.
pub type DependencyCallback = Box<dyn FnMut(&mut GridDataModel, &GridRange, &GridRange, usize)>;

pub struct DependencyEdge {
    pub id: DependencyId,
    pub source: GridRange,
    pub target: GridRange,
    pub user_data: usize,
    callback: DependencyCallback,
}

impl std::fmt::Debug for DependencyEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyEdge")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("user_data", &self.user_data)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    edges: Vec<DependencyEdge>,
    last_id: i32,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    pub fn get(&self, id: DependencyId) -> Option<&DependencyEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Register an edge.
    ///
    /// Rejected when `source` intersects `target`, or when `target`
    /// intersects an existing edge's target. The caller is expected to run
    /// [`DependencyGraph::update_on_change`] over `source` afterwards so the
    /// new target is initialized.
    pub fn add(
        &mut self,
        source: GridRange,
        target: GridRange,
        callback: DependencyCallback,
        user_data: usize,
    ) -> GridResult<DependencyId> {
        let conflict = source.intersects(&target) || self.edges.iter().any(|e| e.target.intersects(&target));
        if conflict {
            log::warn!("Rejected dependency {} -> {}", source, target);
            return Err(GridError::OverlapRejected { source, target });
        }

        self.last_id += 1;
        let id = DependencyId(self.last_id);
        self.edges.push(DependencyEdge { id, source, target, user_data, callback });
        log::debug!("Added dependency {} ({} -> {})", id.raw(), source, target);
        Ok(id)
    }

    pub fn delete(&mut self, id: DependencyId) -> GridResult<()> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or(GridError::NoSuchDependency(id))?;
        self.edges.remove(index);
        log::debug!("Deleted dependency {}", id.raw());
        Ok(())
    }

    /// Fire every edge whose source intersects `changed`, in registration
    /// order. Returns the number of callbacks run.
    pub fn update_on_change(&mut self, changed: &GridRange, model: &mut GridDataModel) -> usize {
        let mut fired = 0;
        for edge in self.edges.iter_mut() {
            if edge.source.intersects(changed) {
                (edge.callback)(model, &edge.target, &edge.source, edge.user_data);
                fired += 1;
            }
        }
        if fired > 0 {
            log::debug!("Propagated change in {} to {} dependenc(ies)", changed, fired);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::GridCell;
    use std::cell::RefCell;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<(GridRange, GridRange, usize)>>>;

    fn recording(log: &CallLog) -> DependencyCallback {
        let log = Rc::clone(log);
        Box::new(move |_model: &mut GridDataModel, target: &GridRange, source: &GridRange, data: usize| {
            log.borrow_mut().push((*target, *source, data))
        })
    }

    fn model() -> GridDataModel {
        GridDataModel::new(5, 5, 24, 80).unwrap()
    }

    #[test]
    fn test_ids_increment() {
        let calls = CallLog::default();
        let mut graph = DependencyGraph::new();
        let a = graph.add(GridRange::single(1, 1), GridRange::single(2, 2), recording(&calls), 0).unwrap();
        let b = graph.add(GridRange::single(1, 1), GridRange::single(3, 3), recording(&calls), 0).unwrap();
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        graph.delete(a).unwrap();
        let c = graph.add(GridRange::single(1, 1), GridRange::single(2, 2), recording(&calls), 0).unwrap();
        assert_eq!(c.raw(), 3);
    }

    #[test]
    fn test_self_overlap_rejected() {
        let calls = CallLog::default();
        let mut graph = DependencyGraph::new();
        let err = graph
            .add(GridRange::new(1, 1, 2, 2), GridRange::single(2, 2), recording(&calls), 0)
            .unwrap_err();
        assert!(matches!(err, GridError::OverlapRejected { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_second_writer_rejected() {
        let calls = CallLog::default();
        let mut graph = DependencyGraph::new();
        graph.add(GridRange::single(1, 1), GridRange::new(3, 1, 3, 1), recording(&calls), 0).unwrap();
        let err = graph.add(GridRange::single(1, 2), GridRange::single(3, 2), recording(&calls), 0);
        assert!(err.is_err());
        // A whole-column target overlaps any target in that column.
        let err = graph.add(GridRange::single(5, 5), GridRange::entire_col(1, 3), recording(&calls), 0);
        assert!(err.is_err());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_update_fires_matching_edges_once() {
        let calls = CallLog::default();
        let mut graph = DependencyGraph::new();
        let mut model = model();
        graph.add(GridRange::single(1, 1), GridRange::single(2, 2), recording(&calls), 42).unwrap();
        graph.add(GridRange::single(4, 4), GridRange::single(5, 5), recording(&calls), 0).unwrap();

        assert_eq!(graph.update_on_change(&GridRange::single(1, 1), &mut model), 1);
        assert_eq!(*calls.borrow(), vec![(GridRange::single(2, 2), GridRange::single(1, 1), 42)]);

        assert_eq!(graph.update_on_change(&GridRange::new(1, 1, 0, 0), &mut model), 0);
    }

    #[test]
    fn test_propagation_is_single_level() {
        let mut graph = DependencyGraph::new();
        let mut model = model();
        // (1,1) -> (2,2) copies text; (2,2) -> (3,3) copies text.
        let copy = |target_row: i32, target_col: i32| -> DependencyCallback {
            Box::new(move |m: &mut GridDataModel, _t: &GridRange, s: &GridRange, _data: usize| {
                let text = m.value_or_default_at(s.row, s.col).map(|c| c.text_value(s.row, s.col)).unwrap_or_default();
                m.set_value_at(target_row, target_col, Some(GridCell::text(text))).unwrap();
            })
        };
        graph.add(GridRange::single(1, 1), GridRange::single(2, 2), copy(2, 2), 0).unwrap();
        graph.add(GridRange::single(2, 2), GridRange::single(3, 3), copy(3, 3), 0).unwrap();

        model.set_value_at(1, 1, Some(GridCell::text("v"))).unwrap();
        assert_eq!(graph.update_on_change(&GridRange::single(1, 1), &mut model), 1);
        assert_eq!(model.value_at(2, 2).unwrap().text_value(2, 2), "v");
        assert!(model.value_at(3, 3).is_none());
    }

    #[test]
    fn test_delete_unknown() {
        let mut graph = DependencyGraph::new();
        assert_eq!(
            graph.delete(DependencyId::from_raw(9)),
            Err(GridError::NoSuchDependency(DependencyId::from_raw(9)))
        );
    }
}
