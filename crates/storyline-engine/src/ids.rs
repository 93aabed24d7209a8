//! Block identifier allocation and uniqueness repair.

use std::collections::HashSet;
use std::fmt;

use log::debug;
use uuid::Uuid;

use crate::model::{Block, BlockId};

/// Issues fresh block ids. Injected into the editor so tests can make
/// allocation deterministic.
pub trait IdAllocator: fmt::Debug {
    fn allocate(&mut self) -> BlockId;
}

impl<A: IdAllocator + ?Sized> IdAllocator for Box<A> {
    fn allocate(&mut self) -> BlockId {
        (**self).allocate()
    }
}

/// Random v4 UUIDs in simple (unhyphenated) form. The default allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdAllocator for RandomIds {
    fn allocate(&mut self) -> BlockId {
        BlockId::new(Uuid::new_v4().simple().to_string())
    }
}

/// `prefix` followed by a monotonically increasing counter.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::seeded(prefix, 1)
    }

    pub fn seeded(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: start,
        }
    }
}

impl IdAllocator for SequentialIds {
    fn allocate(&mut self) -> BlockId {
        let id = BlockId::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// Walks ids in document order and reports which ones must be replaced: empty
/// ids and any id already claimed by an earlier block.
#[derive(Debug, Default)]
pub struct IdScan {
    seen: HashSet<BlockId>,
}

impl IdScan {
    /// Claims `id`, returning false if it cannot be kept.
    pub fn claim(&mut self, id: &BlockId) -> bool {
        !id.is_empty() && self.seen.insert(id.clone())
    }

    /// Allocates an id that no block seen so far uses, and claims it.
    pub fn fresh(&mut self, ids: &mut dyn IdAllocator) -> BlockId {
        loop {
            let id = ids.allocate();
            if self.claim(&id) {
                return id;
            }
        }
    }
}

/// Scans `ids` in document order and allocates a replacement for every empty
/// or duplicate one (the later block loses). Returns `(position, new id)` pairs.
pub fn plan_repairs<'a>(
    ids: impl IntoIterator<Item = &'a BlockId>,
    alloc: &mut dyn IdAllocator,
) -> Vec<(usize, BlockId)> {
    let mut scan = IdScan::default();
    let mut repairs = Vec::new();
    for (index, id) in ids.into_iter().enumerate() {
        if scan.claim(id) {
            continue;
        }
        let fresh = scan.fresh(alloc);
        debug!("reassigned id {:?} at block {index} to {fresh}", id.as_str());
        repairs.push((index, fresh));
    }
    repairs
}

/// [`plan_repairs`] applied to a flat sequence. Returns the number of blocks
/// changed.
pub fn repair_ids(blocks: &mut [Block], ids: &mut dyn IdAllocator) -> usize {
    let repairs = plan_repairs(blocks.iter().map(|b| &b.id), ids);
    for (index, fresh) in &repairs {
        blocks[*index].id = fresh.clone();
    }
    repairs.len()
}
