use log::debug;

use crate::editing::buffer::{Buffer, Path, child_path};
use crate::editing::pipeline::{Aspect, EditContext, Next};
use crate::editing::primitives::Primitive;

/// Unfolds whatever folded range an edit would land in before letting the edit
/// through. A break's fold covers its whole part or scene; any other block's
/// fold covers only itself.
#[derive(Debug, Default)]
pub struct FoldGuard;

impl FoldGuard {
    /// Paths a primitive will modify, resolved against the current caret.
    fn guarded_paths(ctx: &EditContext, primitive: &Primitive) -> Vec<Path> {
        let Some((path, block)) = ctx.caret_block() else {
            return match primitive {
                Primitive::Edit(edit) => edit.affected(),
                _ => Vec::new(),
            };
        };
        let offset = ctx.caret.map_or(0, |c| c.offset);
        let mut paths = Vec::new();
        match primitive {
            Primitive::Edit(edit) => return edit.affected(),
            Primitive::DeleteBackward if offset == 0 => {
                paths.extend(ctx.buffer.prev_leaf(&path));
            }
            Primitive::DeleteForward if offset >= block.text.len() => {
                paths.extend(ctx.buffer.next_leaf(&path));
            }
            _ => {}
        }
        paths.push(path);
        paths
    }
}

/// Header paths of every folded range containing `path`, nearest first.
pub fn folded_ranges(buffer: &Buffer, path: &[usize]) -> Vec<Path> {
    let mut candidates: Vec<Path> = Vec::new();
    match buffer.node(path) {
        Some(node) if node.block().is_some() => candidates.push(path.to_vec()),
        Some(_) => candidates.push(child_path(path, 0)),
        None => {}
    }
    for depth in (1..path.len()).rev() {
        candidates.push(child_path(&path[..depth], 0));
    }
    candidates.dedup();
    candidates
        .into_iter()
        .filter(|candidate| {
            let Some(block) = buffer.block(candidate) else {
                return false;
            };
            // only a container's own break folds the container
            let is_own = candidate.as_slice() == path || block.kind.is_break();
            block.folded && is_own
        })
        .collect()
}

/// Unfolds every folded range around `path`, nearest first.
pub fn unfold_around(buffer: &mut Buffer, path: &[usize]) -> usize {
    let ranges = folded_ranges(buffer, path);
    for header in &ranges {
        debug!("unfolding {header:?} before edit at {path:?}");
        buffer.set_folded(header, false);
    }
    ranges.len()
}

impl Aspect for FoldGuard {
    fn name(&self) -> &'static str {
        "fold-guard"
    }

    fn intercept(&mut self, ctx: &mut EditContext, primitive: Primitive, next: Next<'_>) {
        for path in Self::guarded_paths(ctx, &primitive) {
            unfold_around(&mut ctx.buffer, &path);
        }
        next.run(ctx, primitive);
    }
}
