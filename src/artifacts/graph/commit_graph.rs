//! Commit graph
//!
//! Maps commit identities to their parent identities. Edges are registered
//! when a commit is created and otherwise reconstructed lazily from the
//! commit records themselves through a loader function, so the graph never
//! needs to be persisted on its own.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::cell::RefCell;
use std::collections::HashMap;

/// Loads the parents of a commit, `None` when the commit is unknown
pub type ParentLoader = Box<dyn Fn(&ObjectId) -> Result<Option<Vec<ObjectId>>>>;

pub struct CommitGraph {
    edges: RefCell<HashMap<ObjectId, Vec<ObjectId>>>,
    loader: Option<ParentLoader>,
}

impl CommitGraph {
    /// A graph that only knows the edges recorded into it
    pub fn new() -> Self {
        CommitGraph {
            edges: RefCell::new(HashMap::new()),
            loader: None,
        }
    }

    /// A graph that falls back to `loader` for commits it has not seen yet
    pub fn with_loader(
        loader: impl Fn(&ObjectId) -> Result<Option<Vec<ObjectId>>> + 'static,
    ) -> Self {
        CommitGraph {
            edges: RefCell::new(HashMap::new()),
            loader: Some(Box::new(loader)),
        }
    }

    pub fn record_parent(&self, commit_id: ObjectId, parent_ids: Vec<ObjectId>) {
        self.edges.borrow_mut().insert(commit_id, parent_ids);
    }

    /// Parents of a commit in recorded order; empty for root and unknown commits
    pub fn parents_of(&self, commit_id: &ObjectId) -> Result<Vec<ObjectId>> {
        Ok(self.lookup(commit_id)?.unwrap_or_default())
    }

    pub fn contains(&self, commit_id: &ObjectId) -> Result<bool> {
        Ok(self.lookup(commit_id)?.is_some())
    }

    /// Whether `ancestor` is reachable from `descendant` through parent links
    ///
    /// A commit counts as its own ancestor.
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> Result<bool> {
        let mut pending = vec![descendant.clone()];
        let mut seen = std::collections::HashSet::new();

        while let Some(current) = pending.pop() {
            if &current == ancestor {
                return Ok(true);
            }
            if seen.insert(current.clone()) {
                pending.extend(self.parents_of(&current)?);
            }
        }

        Ok(false)
    }

    fn lookup(&self, commit_id: &ObjectId) -> Result<Option<Vec<ObjectId>>> {
        if let Some(parents) = self.edges.borrow().get(commit_id) {
            return Ok(Some(parents.clone()));
        }

        let Some(loader) = &self.loader else {
            return Ok(None);
        };

        let parents = loader(commit_id)?;
        if let Some(parents) = &parents {
            self.record_parent(commit_id.clone(), parents.clone());
        }

        Ok(parents)
    }
}

impl Default for CommitGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommitGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitGraph")
            .field("edges", &self.edges.borrow().len())
            .field("lazy", &self.loader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::graph::tests::create_oid;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn recorded_edges_are_returned_in_order() {
        let graph = CommitGraph::new();
        graph.record_parent(create_oid("b"), vec![create_oid("a")]);

        assert_eq!(graph.parents_of(&create_oid("b")).unwrap(), vec![create_oid("a")]);
        assert!(graph.parents_of(&create_oid("unknown")).unwrap().is_empty());
        assert!(!graph.contains(&create_oid("unknown")).unwrap());
    }

    #[test]
    fn loader_results_are_cached() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let graph = CommitGraph::with_loader(move |oid| {
            counter.set(counter.get() + 1);
            Ok((oid == &create_oid("b")).then(|| vec![create_oid("a")]))
        });

        assert_eq!(graph.parents_of(&create_oid("b")).unwrap(), vec![create_oid("a")]);
        assert_eq!(graph.parents_of(&create_oid("b")).unwrap(), vec![create_oid("a")]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn ancestry_follows_parent_links() {
        let graph = CommitGraph::new();
        graph.record_parent(create_oid("a"), vec![]);
        graph.record_parent(create_oid("b"), vec![create_oid("a")]);
        graph.record_parent(create_oid("c"), vec![create_oid("b")]);

        assert!(graph.is_ancestor(&create_oid("a"), &create_oid("c")).unwrap());
        assert!(graph.is_ancestor(&create_oid("c"), &create_oid("c")).unwrap());
        assert!(!graph.is_ancestor(&create_oid("c"), &create_oid("a")).unwrap());
    }
}
