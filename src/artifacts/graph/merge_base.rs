//! Merge-base search
//!
//! ## Algorithm
//!
//! A bidirectional breadth-first search: one frontier expands from each
//! commit in lockstep, one step per side per round. Each commit remembers
//! which sides have visited it. The first commit popped by one side that the
//! other side has already visited is returned.
//!
//! When every commit has at most one parent this is exactly the lowest
//! common ancestor. On a general DAG with several common ancestors at
//! different depths it is an approximation: the result is *a* common
//! ancestor reachable from both sides, not necessarily the lowest one, and
//! which one is returned is unspecified.
//!
//! If both frontiers run dry without meeting, the histories are disjoint.

use crate::artifacts::graph::commit_graph::CommitGraph;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use bitflags::bitflags;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::trace;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_OURS = 0b01;
        const VISITED_FROM_THEIRS = 0b10;
    }
}

impl VisitState {
    fn other(self) -> Self {
        if self == VisitState::VISITED_FROM_OURS {
            VisitState::VISITED_FROM_THEIRS
        } else {
            VisitState::VISITED_FROM_OURS
        }
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_OURS) {
            flags.push("OURS");
        }
        if self.contains(VisitState::VISITED_FROM_THEIRS) {
            flags.push("THEIRS");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

impl CommitGraph {
    /// Find a common ancestor of `ours` and `theirs`
    ///
    /// Returns `None` when either commit is unknown or the histories are
    /// disjoint. `merge_base(a, a)` is `a`.
    pub fn merge_base(&self, ours: &ObjectId, theirs: &ObjectId) -> Result<Option<ObjectId>> {
        if !self.contains(ours)? || !self.contains(theirs)? {
            return Ok(None);
        }
        if ours == theirs {
            return Ok(Some(ours.clone()));
        }

        let mut states = HashMap::<ObjectId, VisitState>::new();
        let mut frontiers = [
            (VisitState::VISITED_FROM_OURS, VecDeque::from([ours.clone()])),
            (VisitState::VISITED_FROM_THEIRS, VecDeque::from([theirs.clone()])),
        ];

        while frontiers.iter().any(|(_, queue)| !queue.is_empty()) {
            for (side, queue) in frontiers.iter_mut() {
                let Some(current) = queue.pop_front() else {
                    continue;
                };

                let state = states.get(&current).copied().unwrap_or(VisitState::NONE);
                trace!(commit = %current, side = ?side, state = ?state, "expanding frontier");

                if state.contains(side.other()) {
                    trace!(commit = %current, "frontiers met");
                    return Ok(Some(current));
                }
                states.insert(current.clone(), state | *side);

                for parent in self.parents_of(&current)? {
                    let parent_state = states.get(&parent).copied().unwrap_or(VisitState::NONE);
                    if !parent_state.contains(*side) {
                        queue.push_back(parent);
                    }
                }
            }
        }

        Ok(None)
    }
}
