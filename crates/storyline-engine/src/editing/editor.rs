use crate::convert;
use crate::editing::aspects::{self, MarkupRules};
use crate::editing::buffer::{Buffer, Path};
use crate::editing::pipeline::{EditContext, Pipeline};
use crate::editing::primitives::{Primitive, TreeEdit};
use crate::ids::{IdAllocator, RandomIds};
use crate::model::{Block, BlockId, BlockType, DocTree, Mark, Marks, WordCount, counts};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no block with id {0}")]
    UnknownBlock(BlockId),
}

/// Configures how an [`Editor`] allocates ids and which markup tables it uses.
#[derive(Debug)]
pub struct EditorBuilder {
    ids: Box<dyn IdAllocator>,
    markup: MarkupRules,
}

impl Default for EditorBuilder {
    fn default() -> Self {
        Self {
            ids: Box::new(RandomIds),
            markup: MarkupRules::default(),
        }
    }
}

impl EditorBuilder {
    pub fn ids(mut self, ids: impl IdAllocator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn markup(mut self, rules: MarkupRules) -> Self {
        self.markup = rules;
        self
    }

    pub fn empty(self) -> Editor {
        Editor::start(Buffer::from_blocks(Vec::new(), self.ids), self.markup)
    }

    pub fn load_blocks(self, blocks: Vec<Block>) -> Editor {
        Editor::start(Buffer::from_blocks(blocks, self.ids), self.markup)
    }

    pub fn load_tree(self, tree: &DocTree) -> Editor {
        Editor::start(Buffer::from_tree(tree, self.ids), self.markup)
    }
}

/// An editable manuscript: the settled flat block sequence plus a caret.
///
/// Every method that changes the document returns only after the pipeline has
/// settled, so [`Editor::blocks`] always satisfies the structural invariants.
#[derive(Debug)]
pub struct Editor {
    ctx: EditContext,
    pipeline: Pipeline,
    version: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::builder().empty()
    }
}

impl Editor {
    pub fn builder() -> EditorBuilder {
        EditorBuilder::default()
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self::builder().load_blocks(blocks)
    }

    pub fn from_tree(tree: &DocTree) -> Self {
        Self::builder().load_tree(tree)
    }

    fn start(buffer: Buffer, rules: MarkupRules) -> Self {
        let mut editor = Self {
            ctx: EditContext::new(buffer),
            pipeline: Pipeline::new(aspects::standard(rules)),
            version: 0,
        };
        editor.pipeline.settle(&mut editor.ctx);
        editor.repair_caret();
        editor
    }

    // ---- editing -------------------------------------------------------

    pub fn dispatch(&mut self, primitive: Primitive) {
        if !matches!(primitive, Primitive::InsertText(_)) {
            self.ctx.pending_marks = None;
        }
        self.pipeline.dispatch(&mut self.ctx, primitive);
        self.repair_caret();
        self.version += 1;
    }

    pub fn insert_text(&mut self, text: &str) {
        self.dispatch(Primitive::InsertText(text.to_string()));
    }

    pub fn insert_break(&mut self) {
        self.dispatch(Primitive::InsertBreak);
    }

    pub fn split_block(&mut self) {
        self.dispatch(Primitive::SplitBlock);
    }

    pub fn delete_backward(&mut self) {
        self.dispatch(Primitive::DeleteBackward);
    }

    pub fn delete_forward(&mut self) {
        self.dispatch(Primitive::DeleteForward);
    }

    pub fn set_block_type(&mut self, kind: BlockType) {
        self.dispatch(Primitive::SetBlockType(kind));
    }

    pub fn apply(&mut self, edit: TreeEdit) {
        self.dispatch(Primitive::Edit(edit));
    }

    /// Keeps the caret on a live leaf: falls back to the first leaf when its
    /// block is gone, and clamps the offset to the block's length.
    fn repair_caret(&mut self) {
        match self.ctx.caret_path() {
            Some(path) => {
                let offset = self.ctx.caret.map_or(0, |c| c.offset);
                self.ctx.place_caret(&path, offset);
            }
            None => {
                if let Some(first) = self.ctx.buffer.leaf_paths().into_iter().next() {
                    self.ctx.place_caret(&first, 0);
                }
            }
        }
    }

    // ---- caret and marks -----------------------------------------------

    /// Block id and char offset of the caret.
    pub fn caret(&self) -> Option<(BlockId, usize)> {
        let (_, block) = self.ctx.caret_block()?;
        Some((block.id.clone(), self.ctx.caret.map_or(0, |c| c.offset)))
    }

    pub fn set_caret(&mut self, id: &BlockId, offset: usize) -> Result<(), EditError> {
        let path = self.path_of(id)?;
        self.ctx.place_caret(&path, offset);
        self.ctx.pending_marks = None;
        Ok(())
    }

    /// Marks the next typed text will carry.
    pub fn active_marks(&self) -> Marks {
        if let Some(marks) = self.ctx.pending_marks {
            return marks;
        }
        match (self.ctx.caret_block(), self.ctx.caret) {
            (Some((_, block)), Some(caret)) => block.text.marks_at(caret.offset),
            _ => Marks::NONE,
        }
    }

    pub fn toggle_mark(&mut self, mark: Mark) {
        self.ctx.pending_marks = Some(self.active_marks().toggled(mark));
    }

    /// Moves the caret to the next Scene-Break after it. Returns false at the
    /// last scene.
    pub fn next_scene(&mut self) -> bool {
        let leaves = self.ctx.buffer.leaf_paths();
        let from = self.caret_index(&leaves).map_or(0, |i| i + 1);
        self.jump_to_scene(leaves.iter().skip(from))
    }

    /// Moves the caret to the closest Scene-Break before it.
    pub fn prev_scene(&mut self) -> bool {
        let leaves = self.ctx.buffer.leaf_paths();
        let Some(at) = self.caret_index(&leaves) else {
            return false;
        };
        self.jump_to_scene(leaves[..at].iter().rev())
    }

    fn caret_index(&self, leaves: &[Path]) -> Option<usize> {
        let path = self.ctx.caret_path()?;
        leaves.iter().position(|p| *p == path)
    }

    fn jump_to_scene<'a>(&mut self, mut candidates: impl Iterator<Item = &'a Path>) -> bool {
        let found = candidates.find(|p| {
            self.ctx
                .buffer
                .block(p)
                .is_some_and(|b| b.kind == BlockType::SceneBreak)
        });
        match found {
            Some(path) => {
                self.ctx.place_caret(path, 0);
                self.ctx.pending_marks = None;
                true
            }
            None => false,
        }
    }

    // ---- folding -------------------------------------------------------

    /// Flips one block's fold flag, returning the new state.
    pub fn toggle_fold(&mut self, id: &BlockId) -> Result<bool, EditError> {
        let path = self.path_of(id)?;
        let folded = !self.ctx.buffer.block(&path).is_some_and(|b| b.folded);
        self.ctx.buffer.set_folded(&path, folded);
        self.pipeline.settle(&mut self.ctx);
        self.version += 1;
        Ok(folded)
    }

    /// Folds or unfolds every Part-Break and Scene-Break. Returns how many
    /// changed.
    pub fn fold_all(&mut self, folded: bool) -> usize {
        let mut changed = 0;
        for path in self.ctx.buffer.leaf_paths() {
            let is_break = self
                .ctx
                .buffer
                .block(&path)
                .is_some_and(|b| b.kind.is_break());
            if is_break && self.ctx.buffer.set_folded(&path, folded) {
                changed += 1;
            }
        }
        self.pipeline.settle(&mut self.ctx);
        self.version += 1;
        changed
    }

    // ---- reading -------------------------------------------------------

    pub fn blocks(&self) -> Vec<Block> {
        self.ctx.buffer.blocks()
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        let path = self.ctx.buffer.find_block(id)?;
        self.ctx.buffer.block(&path)
    }

    pub fn buffer(&self) -> &Buffer {
        &self.ctx.buffer
    }

    pub fn aspect_names(&self) -> Vec<&'static str> {
        self.pipeline.aspect_names()
    }

    pub fn to_tree(&self) -> DocTree {
        convert::unflatten(&self.blocks())
    }

    /// Incremented by every settled change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Own count of each block, in document order.
    pub fn counts(&self) -> Vec<WordCount> {
        self.blocks().iter().map(|b| b.counts).collect()
    }

    pub fn cumulative(&self) -> Vec<WordCount> {
        counts::cumulative(&self.blocks())
    }

    pub fn total(&self) -> WordCount {
        counts::total(&self.blocks())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.blocks(), self.version)
    }

    fn path_of(&self, id: &BlockId) -> Result<Path, EditError> {
        self.ctx
            .buffer
            .find_block(id)
            .ok_or_else(|| EditError::UnknownBlock(id.clone()))
    }
}
