use crate::editing::buffer::Change;
use crate::editing::pipeline::{Aspect, EditContext};
use crate::normalize::Normalizer;

/// Runs the normalization engine over everything the round's changes touched.
/// Last in the chain, so it sees the document after every other aspect.
#[derive(Debug, Default)]
pub struct Normalize {
    engine: Normalizer,
}

impl Aspect for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn after_change(&mut self, ctx: &mut EditContext, change: &Change) {
        self.engine.observe(&ctx.buffer, change);
    }

    fn settle(&mut self, ctx: &mut EditContext) {
        self.engine.run(&mut ctx.buffer);
    }
}
