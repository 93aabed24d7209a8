//! Single-step structural repairs. Each function inspects one node and either
//! reports it clean or performs exactly one rewrite.

use std::fmt;

use crate::editing::buffer::{Buffer, Level, Node, child_path};
use crate::model::{Block, BlockType, Text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    EmptyDocument,
    CanonicalBlank,
    CanonicalPlain,
    LiftTitle,
    DemoteTitle,
    WrapInScene,
    WrapInPart,
    SplitAtBreak,
    LiftContainer,
    RemoveEmpty,
    MergeHeaderless,
    SynthesizeHeader,
    FillScene,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::EmptyDocument => "empty document",
            Rule::CanonicalBlank => "empty plain to blank",
            Rule::CanonicalPlain => "blank with text to plain",
            Rule::LiftTitle => "lift title",
            Rule::DemoteTitle => "demote title",
            Rule::WrapInScene => "wrap in scene",
            Rule::WrapInPart => "wrap in part",
            Rule::SplitAtBreak => "split at break",
            Rule::LiftContainer => "lift container",
            Rule::RemoveEmpty => "remove empty container",
            Rule::MergeHeaderless => "merge headerless container",
            Rule::SynthesizeHeader => "synthesize header",
            Rule::FillScene => "fill header-only scene",
        };
        f.write_str(name)
    }
}

/// Checks the node at `path` and then each ancestor up to the root, stopping
/// at the first rewrite.
pub fn fix_chain(buffer: &mut Buffer, path: &[usize]) -> Option<Rule> {
    (0..=path.len())
        .rev()
        .find_map(|depth| fix_node(buffer, &path[..depth]))
}

fn fix_node(buffer: &mut Buffer, path: &[usize]) -> Option<Rule> {
    if path.is_empty() {
        return fix_root(buffer);
    }
    match buffer.node(path)? {
        Node::Leaf { block, .. } => {
            let (kind, empty) = (block.kind, block.text.is_empty());
            fix_leaf(buffer, path, kind, empty)
        }
        Node::Container { level, .. } => {
            let level = *level;
            fix_container(buffer, path, level)
        }
    }
}

/// A document with nothing besides its title gets one Blank paragraph, which
/// the leaf rules then wrap into an anonymous scene and part.
fn fix_root(buffer: &mut Buffer) -> Option<Rule> {
    let roots = buffer.roots();
    let title_only = roots
        .iter()
        .all(|node| node.block().is_some_and(|b| b.kind == BlockType::Title));
    if !title_only {
        return None;
    }
    let end = roots.len();
    let id = buffer.allocate_id();
    buffer.insert_block(&[], end, Block::new(BlockType::Blank, id, Text::new()))?;
    Some(Rule::EmptyDocument)
}

fn parent_level(buffer: &Buffer, path: &[usize]) -> Option<Level> {
    let (_, parent) = path.split_last()?;
    buffer.node(parent).and_then(Node::level)
}

fn fix_leaf(buffer: &mut Buffer, path: &[usize], kind: BlockType, empty: bool) -> Option<Rule> {
    match kind {
        BlockType::Plain if empty => {
            buffer.set_kind(path, BlockType::Blank);
            return Some(Rule::CanonicalBlank);
        }
        BlockType::Blank if !empty => {
            buffer.set_kind(path, BlockType::Plain);
            return Some(Rule::CanonicalPlain);
        }
        BlockType::Title => {
            // only the first leaf of the document may be the title
            if path.iter().any(|&i| i != 0) {
                let kind = if empty { BlockType::Blank } else { BlockType::Plain };
                buffer.set_kind(path, kind);
                return Some(Rule::DemoteTitle);
            }
            if path.len() == 1 {
                return None;
            }
            return buffer.lift(path).then_some(Rule::LiftTitle);
        }
        _ => {}
    }

    let required = if kind == BlockType::PartBreak {
        Level::Part
    } else {
        Level::Scene
    };
    if parent_level(buffer, path) != Some(required) {
        buffer.wrap(path, required)?;
        return Some(match required {
            Level::Part => Rule::WrapInPart,
            Level::Scene => Rule::WrapInScene,
        });
    }
    let index = path.last().copied().unwrap_or_default();
    if kind.is_break() && index > 0 {
        buffer.split(path)?;
        return Some(Rule::SplitAtBreak);
    }
    None
}

fn fix_container(buffer: &mut Buffer, path: &[usize], level: Level) -> Option<Rule> {
    let depth = path.len();
    match level {
        Level::Part if depth > Level::Part.depth() => {
            return buffer.lift(path).then_some(Rule::LiftContainer);
        }
        Level::Scene if depth < Level::Scene.depth() => {
            buffer.wrap(path, Level::Part)?;
            return Some(Rule::WrapInPart);
        }
        Level::Scene
            if depth > Level::Scene.depth() || parent_level(buffer, path) != Some(Level::Part) =>
        {
            return buffer.lift(path).then_some(Rule::LiftContainer);
        }
        _ => {}
    }

    let node = buffer.node(path)?;
    if node.children().is_empty() {
        buffer.remove(path)?;
        return Some(Rule::RemoveEmpty);
    }
    let child_count = node.children().len();
    if node.header().is_none() {
        return fix_headerless(buffer, path, level);
    }
    if level == Level::Scene && child_count == 1 {
        let id = buffer.allocate_id();
        buffer.insert_block(path, 1, Block::new(BlockType::Blank, id, Text::new()))?;
        return Some(Rule::FillScene);
    }
    None
}

/// A container whose first child is not its break: merge into a previous
/// sibling of the same level if there is one, otherwise give it an anonymous
/// header. A scene at the very start of its part waits for the part to be
/// repaired first, since the part may merge and give the scene a predecessor.
fn fix_headerless(buffer: &mut Buffer, path: &[usize], level: Level) -> Option<Rule> {
    let (&index, parent) = path.split_last()?;
    if index > 0 {
        let prev = child_path(parent, index - 1);
        if buffer.node(&prev).and_then(Node::level) == Some(level) {
            unfold_header(buffer, &prev);
            unfold_header(buffer, path);
            return buffer.merge(path).then_some(Rule::MergeHeaderless);
        }
    } else if level == Level::Scene {
        return None;
    }
    let id = buffer.allocate_id();
    buffer.insert_block(path, 0, Block::new(level.header(), id, Text::new()))?;
    Some(Rule::SynthesizeHeader)
}

fn unfold_header(buffer: &mut Buffer, container: &[usize]) {
    let first = child_path(container, 0);
    if buffer.block(&first).is_some_and(|b| b.folded) {
        buffer.set_folded(&first, false);
    }
}
