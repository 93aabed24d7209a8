//! Ordered middleware around primitive edits.

use log::warn;

use crate::editing::buffer::{Buffer, Change, NodeKey, Path};
use crate::editing::defaults;
use crate::editing::primitives::Primitive;
use crate::model::{Block, Marks};

/// Collapsed edit position: a leaf and a char offset into its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub key: NodeKey,
    pub offset: usize,
}

/// Mutable state shared by every aspect during one dispatch.
#[derive(Debug)]
pub struct EditContext {
    pub buffer: Buffer,
    pub caret: Option<Caret>,
    /// Marks for the next inserted text, set by a mark toggle.
    pub pending_marks: Option<Marks>,
}

impl EditContext {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            caret: None,
            pending_marks: None,
        }
    }

    pub fn caret_path(&self) -> Option<Path> {
        self.caret.and_then(|c| self.buffer.locate(c.key))
    }

    pub fn caret_block(&self) -> Option<(Path, &Block)> {
        let path = self.caret_path()?;
        let block = self.buffer.block(&path)?;
        Some((path, block))
    }

    /// Moves the caret to the leaf at `path`.
    pub fn place_caret(&mut self, path: &[usize], offset: usize) {
        if let Some(node) = self.buffer.node(path)
            && let Some(block) = node.block()
        {
            self.caret = Some(Caret {
                key: node.key(),
                offset: offset.min(block.text.len()),
            });
        }
    }
}

/// One link of the pipeline.
///
/// `intercept` sees every primitive before the aspects after it; calling
/// `next.run` delegates, not calling it claims the primitive. `after_change`
/// sees every journaled change and `settle` runs once per round afterwards.
pub trait Aspect: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn intercept(&mut self, ctx: &mut EditContext, primitive: Primitive, next: Next<'_>) {
        next.run(ctx, primitive);
    }

    fn after_change(&mut self, _ctx: &mut EditContext, _change: &Change) {}

    fn settle(&mut self, _ctx: &mut EditContext) {}
}

/// The rest of the chain. Running an empty tail applies the default effect.
pub struct Next<'a> {
    rest: &'a mut [Box<dyn Aspect>],
}

impl Next<'_> {
    pub fn run(self, ctx: &mut EditContext, primitive: Primitive) {
        match self.rest.split_first_mut() {
            Some((aspect, rest)) => aspect.intercept(ctx, primitive, Next { rest }),
            None => defaults::apply(ctx, primitive),
        }
    }
}

/// Settle rounds allowed before giving up on a fixed point.
const MAX_ROUNDS: usize = 64;

#[derive(Debug, Default)]
pub struct Pipeline {
    aspects: Vec<Box<dyn Aspect>>,
}

impl Pipeline {
    pub fn new(aspects: Vec<Box<dyn Aspect>>) -> Self {
        Self { aspects }
    }

    pub fn aspect_names(&self) -> Vec<&'static str> {
        self.aspects.iter().map(|a| a.name()).collect()
    }

    /// Runs `primitive` through the chain, then settles.
    pub fn dispatch(&mut self, ctx: &mut EditContext, primitive: Primitive) {
        Next {
            rest: &mut self.aspects,
        }
        .run(ctx, primitive);
        self.settle(ctx);
    }

    /// Feeds journaled changes to every aspect and lets each settle, until a
    /// round produces no further change.
    pub fn settle(&mut self, ctx: &mut EditContext) {
        for _ in 0..MAX_ROUNDS {
            let changes = ctx.buffer.take_changes();
            if changes.is_empty() {
                return;
            }
            for change in &changes {
                for aspect in &mut self.aspects {
                    aspect.after_change(ctx, change);
                }
            }
            for aspect in &mut self.aspects {
                aspect.settle(ctx);
            }
        }
        warn!("editor did not settle after {MAX_ROUNDS} rounds");
        ctx.buffer.take_changes();
    }
}
