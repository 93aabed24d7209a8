//! Conversion between the persisted tree and the flat block sequence.
//!
//! `flatten` is total and order/id preserving. `unflatten` never fails: a
//! group of blocks that lacks its leading break gets an anonymous header with a
//! fresh id.

use crate::ids::{IdAllocator, RandomIds};
use crate::model::{Block, BlockType, DocTree, Paragraph, Part, Scene, Text, TitleBlock};

pub fn flatten(tree: &DocTree) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(
        tree.paragraph_count() + tree.parts.len() + tree.scenes().count() + 1,
    );
    if let Some(title) = &tree.title {
        blocks.push(Block::new(BlockType::Title, title.id.clone(), title.text.clone()));
    }
    for part in &tree.parts {
        blocks.push(
            Block::new(BlockType::PartBreak, part.id.clone(), part.name.clone())
                .with_folded(part.folded),
        );
        for scene in &part.children {
            blocks.push(
                Block::new(BlockType::SceneBreak, scene.id.clone(), scene.name.clone())
                    .with_folded(scene.folded),
            );
            for paragraph in &scene.children {
                let kind = match paragraph.kind {
                    BlockType::Blank => BlockType::Plain,
                    kind => kind,
                };
                blocks.push(
                    Block::new(kind, paragraph.id.clone(), paragraph.text.clone())
                        .with_folded(paragraph.folded),
                );
            }
        }
    }
    blocks
}

/// [`unflatten_with`] using random ids for any synthesized header.
pub fn unflatten(blocks: &[Block]) -> DocTree {
    unflatten_with(blocks, &mut RandomIds)
}

pub fn unflatten_with(blocks: &[Block], ids: &mut dyn IdAllocator) -> DocTree {
    let mut tree = DocTree::default();
    let mut rest = blocks;
    if let Some((first, tail)) = blocks.split_first()
        && first.kind == BlockType::Title
    {
        tree.title = Some(TitleBlock {
            id: first.id.clone(),
            text: first.text.clone(),
        });
        rest = tail;
    }

    for block in rest {
        match block.kind {
            BlockType::PartBreak => tree.parts.push(Part {
                id: block.id.clone(),
                name: block.text.clone(),
                folded: block.folded,
                children: Vec::new(),
            }),
            BlockType::SceneBreak => current_part(&mut tree, ids).children.push(Scene {
                id: block.id.clone(),
                name: block.text.clone(),
                folded: block.folded,
                children: Vec::new(),
            }),
            kind => current_scene(&mut tree, ids).children.push(Paragraph {
                id: block.id.clone(),
                kind: paragraph_kind(kind, &block.text),
                text: block.text.clone(),
                folded: block.folded,
            }),
        }
    }
    tree
}

/// Stored paragraph type: a stray Title is kept as text, and Plain/Blank follow
/// whether the paragraph has content.
fn paragraph_kind(kind: BlockType, text: &Text) -> BlockType {
    match kind {
        BlockType::Plain | BlockType::Blank | BlockType::Title if text.is_empty() => {
            BlockType::Blank
        }
        BlockType::Blank | BlockType::Title => BlockType::Plain,
        kind => kind,
    }
}

fn current_part<'a>(tree: &'a mut DocTree, ids: &mut dyn IdAllocator) -> &'a mut Part {
    if tree.parts.is_empty() {
        tree.parts.push(Part::new(ids.allocate(), "", Vec::new()));
    }
    let last = tree.parts.len() - 1;
    &mut tree.parts[last]
}

fn current_scene<'a>(tree: &'a mut DocTree, ids: &mut dyn IdAllocator) -> &'a mut Scene {
    let part = current_part(tree, ids);
    if part.children.is_empty() {
        part.children.push(Scene::new(ids.allocate(), "", Vec::new()));
    }
    let last = part.children.len() - 1;
    &mut part.children[last]
}
