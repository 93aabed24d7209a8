use crate::editing::buffer::{Level, Path, child_path};
use crate::model::{Block, BlockId, BlockType, Text};

/// One edit intent. Caret-relative primitives act at the editor's caret; raw
/// tree edits address nodes by path.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    InsertText(String),
    SplitBlock,
    /// A user line break. Unlike [`Primitive::SplitBlock`] this is subject to
    /// the markup continuation and reset rules.
    InsertBreak,
    DeleteBackward,
    DeleteForward,
    SetBlockType(BlockType),
    Edit(TreeEdit),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeEdit {
    InsertBlock {
        parent: Path,
        index: usize,
        block: Block,
    },
    Remove {
        at: Path,
    },
    /// `to_parent` addresses the tree after the node has been detached.
    Move {
        from: Path,
        to_parent: Path,
        index: usize,
    },
    Merge {
        at: Path,
    },
    Wrap {
        at: Path,
        level: Level,
    },
    Lift {
        at: Path,
    },
    Split {
        at: Path,
    },
    SetText {
        at: Path,
        text: Text,
    },
    SetType {
        at: Path,
        kind: BlockType,
    },
    SetFolded {
        at: Path,
        folded: bool,
    },
    SetId {
        at: Path,
        id: BlockId,
    },
}

impl TreeEdit {
    /// Paths whose content this edit changes; empty for fold toggles.
    pub fn affected(&self) -> Vec<Path> {
        match self {
            TreeEdit::InsertBlock { parent, .. } => vec![parent.clone()],
            TreeEdit::Move {
                from, to_parent, ..
            } => vec![from.clone(), to_parent.clone()],
            TreeEdit::Merge { at } => {
                let mut paths = vec![at.clone()];
                if let Some((&last, parent)) = at.split_last()
                    && last > 0
                {
                    paths.push(child_path(parent, last - 1));
                }
                paths
            }
            TreeEdit::Remove { at }
            | TreeEdit::Wrap { at, .. }
            | TreeEdit::Lift { at }
            | TreeEdit::Split { at }
            | TreeEdit::SetText { at, .. }
            | TreeEdit::SetType { at, .. }
            | TreeEdit::SetId { at, .. } => vec![at.clone()],
            TreeEdit::SetFolded { .. } => Vec::new(),
        }
    }
}
