//! Immutable views of a settled document.
//!
//! A [`Snapshot`] is taken between edits and can be handed to another thread
//! for searching or statistics while the editor keeps going. It owns its blocks
//! behind an `Arc`, so cloning a snapshot is cheap.

use std::sync::Arc;

use serde::Serialize;

use crate::model::counts::{self, SectionCount};
use crate::model::{Block, BlockId, BlockType, WordCount};

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    blocks: Arc<[Block]>,
    version: u64,
}

/// A match position. `offset` is in chars from the start of the block's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub index: usize,
    pub id: BlockId,
    pub offset: usize,
}

/// One header in document order, as shown in a navigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub index: usize,
    pub id: BlockId,
    pub kind: BlockType,
    pub name: String,
    pub folded: bool,
}

impl Snapshot {
    pub fn new(blocks: Vec<Block>, version: u64) -> Self {
        Self {
            blocks: blocks.into(),
            version,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn cumulative(&self) -> Vec<WordCount> {
        counts::cumulative(&self.blocks)
    }

    pub fn total(&self) -> WordCount {
        counts::total(&self.blocks)
    }

    pub fn sections(&self) -> Vec<SectionCount> {
        counts::sections(&self.blocks)
    }

    /// Title, part and scene headers.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.kind.is_break() || b.kind == BlockType::Title)
            .map(|(index, b)| OutlineEntry {
                index,
                id: b.id.clone(),
                kind: b.kind,
                name: b.text.to_string(),
                folded: b.folded,
            })
            .collect()
    }

    /// Every occurrence of `needle`, ignoring ASCII case. Matches do not span
    /// blocks and do not overlap. An empty needle matches nothing.
    pub fn search(&self, needle: &str) -> Vec<SearchHit> {
        if needle.is_empty() {
            return Vec::new();
        }
        self.blocks
            .iter()
            .enumerate()
            .flat_map(|(index, block)| {
                find_all(&block.text.to_string(), needle)
                    .into_iter()
                    .map(move |offset| SearchHit {
                        index,
                        id: block.id.clone(),
                        offset,
                    })
            })
            .collect()
    }

    /// First hit strictly after `(index, offset)`, wrapping to the top.
    pub fn find_next(&self, needle: &str, index: usize, offset: usize) -> Option<SearchHit> {
        let hits = self.search(needle);
        hits.iter()
            .find(|h| (h.index, h.offset) > (index, offset))
            .or_else(|| hits.first())
            .cloned()
    }

    /// Last hit strictly before `(index, offset)`, wrapping to the bottom.
    pub fn find_prev(&self, needle: &str, index: usize, offset: usize) -> Option<SearchHit> {
        let hits = self.search(needle);
        hits.iter()
            .rev()
            .find(|h| (h.index, h.offset) < (index, offset))
            .or_else(|| hits.last())
            .cloned()
    }
}

fn find_all(haystack: &str, needle: &str) -> Vec<usize> {
    let hay: Vec<char> = haystack.chars().collect();
    let pat: Vec<char> = needle.chars().collect();
    let mut out = Vec::new();
    let mut at = 0;
    while at + pat.len() <= hay.len() {
        let hit = hay[at..at + pat.len()]
            .iter()
            .zip(&pat)
            .all(|(a, b)| a.eq_ignore_ascii_case(b));
        if hit {
            out.push(at);
            at += pat.len();
        } else {
            at += 1;
        }
    }
    out
}
