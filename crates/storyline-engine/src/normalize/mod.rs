//! Structural repair of the nested working document.
//!
//! The [`Normalizer`] keeps a worklist of nodes that may be invalid. Draining
//! it visits each node and then its ancestors bottom-up (leaf, scene, part,
//! root) through [`rules::fix_chain`]. A rewrite invalidates every path
//! computed so far, so after each one the same node is located again by key
//! and revisited, and everything the rewrite touched joins the worklist. The
//! loop ends when the worklist is empty, which is the fixed point.

pub mod rules;

use std::collections::{HashSet, VecDeque};

use log::{debug, warn};

use crate::editing::Editor;
use crate::editing::buffer::{Buffer, Change, ChangeKind, Target};
use crate::ids::IdAllocator;
use crate::model::Block;

pub use rules::Rule;

/// Rewrites allowed per run, on top of a per-node allowance.
const BASE_BUDGET: usize = 256;
const BUDGET_PER_NODE: usize = 16;

#[derive(Debug, Default)]
pub struct Normalizer {
    queue: VecDeque<Target>,
    queued: HashSet<Target>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn enqueue(&mut self, target: Target) {
        if self.queued.insert(target) {
            self.queue.push_back(target);
        }
    }

    /// Queues every leaf; the ancestor walk covers the containers.
    pub fn enqueue_all(&mut self, buffer: &Buffer) {
        for key in buffer.leaf_keys_under(&[]) {
            self.enqueue(Target::Node(key));
        }
        self.enqueue(Target::Root);
    }

    /// Queues whatever `change` may have invalidated.
    pub fn observe(&mut self, buffer: &Buffer, change: &Change) {
        match change.kind {
            ChangeKind::Id | ChangeKind::Fold => return,
            ChangeKind::Reset => return self.enqueue_all(buffer),
            ChangeKind::Inserted | ChangeKind::Moved => {
                // a moved or inserted subtree may carry invalid leaves anywhere
                if let Target::Node(key) = change.target
                    && let Some(path) = buffer.locate(key)
                {
                    for leaf in buffer.leaf_keys_under(&path) {
                        self.enqueue(Target::Node(leaf));
                    }
                }
            }
            _ => {}
        }
        self.enqueue(change.target);
        for target in &change.touched {
            self.enqueue(*target);
        }
    }

    /// Drains the worklist, returning the number of rewrites performed.
    pub fn run(&mut self, buffer: &mut Buffer) -> usize {
        let budget = BASE_BUDGET + BUDGET_PER_NODE * buffer.node_count();
        let mut rewrites = 0;
        while let Some(target) = self.queue.pop_front() {
            self.queued.remove(&target);
            while let Some(path) = buffer.path_of(target) {
                let mark = buffer.pending_changes();
                let Some(rule) = rules::fix_chain(buffer, &path) else {
                    break;
                };
                rewrites += 1;
                debug!("normalize: {rule} at {path:?}");
                let fresh: Vec<Change> = buffer.changes_since(mark).to_vec();
                for change in &fresh {
                    self.observe(buffer, change);
                }
                if rewrites >= budget {
                    warn!(
                        "normalization stopped after {rewrites} rewrites with {} nodes pending",
                        self.queue.len()
                    );
                    self.queue.clear();
                    self.queued.clear();
                    return rewrites;
                }
            }
        }
        rewrites
    }
}

/// Normalizes a flat sequence: structure, ids and counts, exactly as the
/// editor would settle it. Idempotent.
pub fn normalize(blocks: Vec<Block>, ids: impl IdAllocator + 'static) -> Vec<Block> {
    Editor::builder().ids(ids).load_blocks(blocks).blocks()
}
