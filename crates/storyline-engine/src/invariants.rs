//! Structure checks over a flat block sequence.
//!
//! [`check_structure`] accepts anything that decomposes into a tree, which is
//! what `flatten` produces and what manuscripts on disk hold. [`check`] is the
//! stricter settled form every editor state must satisfy: at least one part,
//! no empty scenes, canonical Blank/Plain representation and counts in step
//! with text.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Block, BlockId, BlockType, WordCount};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("document has no blocks")]
    EmptyDocument,
    #[error("document has no part")]
    NoParts,
    #[error("title at {index} is not the first block")]
    TitleNotLeading { index: usize },
    #[error("block {index} is not inside a part")]
    MissingPartBreak { index: usize },
    #[error("paragraph {index} is not inside a scene")]
    MissingSceneBreak { index: usize },
    #[error("scene at {index} has no paragraphs")]
    EmptyScene { index: usize },
    #[error("block {index} has no id")]
    MissingId { index: usize },
    #[error("id {id} is used more than once (again at {index})")]
    DuplicateId { index: usize, id: BlockId },
    #[error("blank paragraph {index} has text")]
    BlankWithText { index: usize },
    #[error("plain paragraph {index} is empty")]
    EmptyPlain { index: usize },
    #[error("cached counts at {index} are {cached:?}, text has {actual:?}")]
    StaleCount {
        index: usize,
        cached: WordCount,
        actual: WordCount,
    },
}

/// Tree decomposition and id uniqueness.
pub fn check_structure(blocks: &[Block]) -> Result<(), Violation> {
    let mut in_part = false;
    let mut in_scene = false;
    for (index, block) in blocks.iter().enumerate() {
        match block.kind {
            BlockType::Title if index != 0 => return Err(Violation::TitleNotLeading { index }),
            BlockType::Title => {}
            BlockType::PartBreak => {
                in_part = true;
                in_scene = false;
            }
            BlockType::SceneBreak if !in_part => {
                return Err(Violation::MissingPartBreak { index });
            }
            BlockType::SceneBreak => in_scene = true,
            _ if !in_part => return Err(Violation::MissingPartBreak { index }),
            _ if !in_scene => return Err(Violation::MissingSceneBreak { index }),
            _ => {}
        }
    }
    check_ids(blocks)
}

/// Everything [`check_structure`] does, plus the settled-state rules.
pub fn check(blocks: &[Block]) -> Result<(), Violation> {
    if blocks.is_empty() {
        return Err(Violation::EmptyDocument);
    }
    check_structure(blocks)?;
    if !blocks.iter().any(|b| b.kind == BlockType::PartBreak) {
        return Err(Violation::NoParts);
    }

    for (index, block) in blocks.iter().enumerate() {
        if block.kind == BlockType::SceneBreak
            && !blocks
                .get(index + 1)
                .is_some_and(|next| next.kind.is_paragraph())
        {
            return Err(Violation::EmptyScene { index });
        }
        match block.kind {
            BlockType::Blank if !block.text.is_empty() => {
                return Err(Violation::BlankWithText { index });
            }
            BlockType::Plain if block.text.is_empty() => {
                return Err(Violation::EmptyPlain { index });
            }
            _ => {}
        }
        let actual = WordCount::of_text(&block.text);
        if block.counts != actual {
            return Err(Violation::StaleCount {
                index,
                cached: block.counts,
                actual,
            });
        }
    }
    Ok(())
}

fn check_ids(blocks: &[Block]) -> Result<(), Violation> {
    let mut seen = HashSet::new();
    for (index, block) in blocks.iter().enumerate() {
        if block.id.is_empty() {
            return Err(Violation::MissingId { index });
        }
        if !seen.insert(&block.id) {
            return Err(Violation::DuplicateId {
                index,
                id: block.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn settled() -> Vec<Block> {
        vec![
            Block::new(BlockType::Title, "t", "Book"),
            Block::part_break("p", "One"),
            Block::scene_break("s", "Start"),
            Block::plain("a", "words"),
            Block::new(BlockType::Blank, "b", ""),
        ]
    }

    #[test]
    fn test_settled_document_passes() {
        assert_eq!(check(&settled()), Ok(()));
    }

    #[test]
    fn test_header_only_part_passes() {
        let blocks = vec![Block::part_break("p", "Empty"), Block::part_break("q", "Next")];
        assert_eq!(check(&blocks), Ok(()));
    }

    #[test]
    fn test_persisted_form_passes_structure_only() {
        let blocks = vec![
            Block::part_break("p", ""),
            Block::scene_break("s", ""),
            Block::plain("a", ""),
            Block::scene_break("s2", ""),
        ];
        assert_eq!(check_structure(&blocks), Ok(()));
        assert_eq!(check(&blocks), Err(Violation::EmptyPlain { index: 2 }));
    }

    #[rstest]
    #[case::empty(vec![], Violation::EmptyDocument)]
    #[case::title_only(vec![Block::new(BlockType::Title, "t", "Book")], Violation::NoParts)]
    #[case::title_late(
        vec![Block::part_break("p", ""), Block::new(BlockType::Title, "t", "x")],
        Violation::TitleNotLeading { index: 1 }
    )]
    #[case::no_part(vec![Block::plain("a", "x")], Violation::MissingPartBreak { index: 0 })]
    #[case::scene_without_part(
        vec![Block::scene_break("s", "")],
        Violation::MissingPartBreak { index: 0 }
    )]
    #[case::no_scene(
        vec![Block::part_break("p", ""), Block::plain("a", "x")],
        Violation::MissingSceneBreak { index: 1 }
    )]
    #[case::empty_scene(
        vec![Block::part_break("p", ""), Block::scene_break("s", "")],
        Violation::EmptyScene { index: 1 }
    )]
    #[case::blank_with_text(
        vec![
            Block::part_break("p", ""),
            Block::scene_break("s", ""),
            Block::new(BlockType::Blank, "a", "x"),
        ],
        Violation::BlankWithText { index: 2 }
    )]
    #[case::duplicate(
        vec![
            Block::part_break("p", ""),
            Block::scene_break("p", ""),
            Block::plain("a", "x"),
        ],
        Violation::DuplicateId { index: 1, id: "p".into() }
    )]
    #[case::missing_id(
        vec![Block::part_break("", "")],
        Violation::MissingId { index: 0 }
    )]
    fn test_violations(#[case] blocks: Vec<Block>, #[case] expected: Violation) {
        assert_eq!(check(&blocks), Err(expected));
    }

    #[test]
    fn test_stale_counts_are_reported() {
        let mut blocks = settled();
        blocks[3].counts = WordCount::default();
        assert!(matches!(
            check(&blocks),
            Err(Violation::StaleCount { index: 3, .. })
        ));
    }
}
