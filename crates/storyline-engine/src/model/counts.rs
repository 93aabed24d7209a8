use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::block::{Block, BlockId, BlockType};
use super::text::Text;

/// Word and character totals. Words are whitespace-separated tokens, chars are
/// Unicode scalar values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordCount {
    pub words: usize,
    pub chars: usize,
}

impl WordCount {
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
        }
    }

    /// Counts the plain view, so a word split across styled runs is one word.
    pub fn of_text(text: &Text) -> Self {
        match text.runs() {
            [] => Self::default(),
            [run] => Self::of(&run.text),
            _ => Self::of(&text.to_string()),
        }
    }
}

impl Add for WordCount {
    type Output = WordCount;

    fn add(self, rhs: Self) -> Self::Output {
        WordCount {
            words: self.words + rhs.words,
            chars: self.chars + rhs.chars,
        }
    }
}

impl AddAssign for WordCount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for WordCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Inclusive prefix sums of own counts: entry `k` covers blocks `0..=k`.
pub fn cumulative(blocks: &[Block]) -> Vec<WordCount> {
    blocks
        .iter()
        .scan(WordCount::default(), |running, block| {
            *running += block.counts;
            Some(*running)
        })
        .collect()
}

pub fn total(blocks: &[Block]) -> WordCount {
    blocks.iter().map(|b| b.counts).sum()
}

/// Totals for one part or scene, header included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCount {
    pub index: usize,
    pub id: BlockId,
    pub kind: BlockType,
    pub name: String,
    pub counts: WordCount,
}

/// One entry per Part-Break and Scene-Break, in document order. A part's range
/// runs to the next Part-Break, a scene's to the next break of either kind.
pub fn sections(blocks: &[Block]) -> Vec<SectionCount> {
    let mut out = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        if !block.kind.is_break() {
            continue;
        }
        let end = blocks[index + 1..]
            .iter()
            .position(|b| match block.kind {
                BlockType::PartBreak => b.kind == BlockType::PartBreak,
                _ => b.kind.is_break(),
            })
            .map_or(blocks.len(), |p| index + 1 + p);
        out.push(SectionCount {
            index,
            id: block.id.clone(),
            kind: block.kind,
            name: block.text.to_string(),
            counts: total(&blocks[index..end]),
        });
    }
    out
}
