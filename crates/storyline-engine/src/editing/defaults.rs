//! What a primitive does when no aspect claims it.

use crate::editing::buffer::Buffer;
use crate::editing::pipeline::{Caret, EditContext};
use crate::editing::primitives::{Primitive, TreeEdit};

pub(crate) fn apply(ctx: &mut EditContext, primitive: Primitive) {
    match primitive {
        Primitive::InsertText(text) => insert_text(ctx, &text),
        Primitive::SplitBlock | Primitive::InsertBreak => split_block(ctx),
        Primitive::DeleteBackward => delete_backward(ctx),
        Primitive::DeleteForward => delete_forward(ctx),
        Primitive::SetBlockType(kind) => {
            if let Some(path) = ctx.caret_path() {
                ctx.buffer.set_kind(&path, kind);
            }
        }
        Primitive::Edit(edit) => apply_edit(&mut ctx.buffer, edit),
    }
}

fn insert_text(ctx: &mut EditContext, text: &str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            split_block(ctx);
        }
        let Some((path, block)) = ctx.caret_block() else {
            return;
        };
        let Some(caret) = ctx.caret else {
            return;
        };
        let offset = caret.offset.min(block.text.len());
        let marks = match ctx.pending_marks {
            Some(marks) => marks,
            None => block.text.marks_at(offset),
        };
        if ctx.buffer.insert_text(&path, offset, line, marks) {
            ctx.caret = Some(Caret {
                key: caret.key,
                offset: offset + line.chars().count(),
            });
        }
    }
}

fn split_block(ctx: &mut EditContext) {
    let Some((path, block)) = ctx.caret_block() else {
        return;
    };
    let offset = ctx.caret.map_or(0, |c| c.offset).min(block.text.len());
    let id = ctx.buffer.allocate_id();
    if let Some(key) = ctx.buffer.split_leaf(&path, offset, id) {
        ctx.caret = Some(Caret { key, offset: 0 });
    }
}

fn delete_backward(ctx: &mut EditContext) {
    let Some(caret) = ctx.caret else {
        return;
    };
    let Some(path) = ctx.caret_path() else {
        return;
    };
    if caret.offset > 0 {
        ctx.buffer.remove_text(&path, caret.offset - 1..caret.offset);
        ctx.caret = Some(Caret {
            offset: caret.offset - 1,
            ..caret
        });
        return;
    }
    let Some(prev) = ctx.buffer.prev_leaf(&path) else {
        return;
    };
    let joined_at = ctx.buffer.block(&prev).map_or(0, |b| b.text.len());
    let Some(node) = ctx.buffer.remove(&path) else {
        return;
    };
    if let Some(block) = node.block() {
        ctx.buffer.append_text(&prev, block.text.clone());
    }
    ctx.place_caret(&prev, joined_at);
}

fn delete_forward(ctx: &mut EditContext) {
    let Some((path, block)) = ctx.caret_block() else {
        return;
    };
    let Some(caret) = ctx.caret else {
        return;
    };
    if caret.offset < block.text.len() {
        ctx.buffer.remove_text(&path, caret.offset..caret.offset + 1);
        return;
    }
    let Some(next) = ctx.buffer.next_leaf(&path) else {
        return;
    };
    // removing a later leaf never shifts the caret's path
    if let Some(node) = ctx.buffer.remove(&next)
        && let Some(block) = node.block()
    {
        ctx.buffer.append_text(&path, block.text.clone());
    }
}

pub(crate) fn apply_edit(buffer: &mut Buffer, edit: TreeEdit) {
    match edit {
        TreeEdit::InsertBlock {
            parent,
            index,
            block,
        } => {
            buffer.insert_block(&parent, index, block);
        }
        TreeEdit::Remove { at } => {
            buffer.remove(&at);
        }
        TreeEdit::Move {
            from,
            to_parent,
            index,
        } => {
            buffer.move_node(&from, &to_parent, index);
        }
        TreeEdit::Merge { at } => {
            buffer.merge(&at);
        }
        TreeEdit::Wrap { at, level } => {
            buffer.wrap(&at, level);
        }
        TreeEdit::Lift { at } => {
            buffer.lift(&at);
        }
        TreeEdit::Split { at } => {
            buffer.split(&at);
        }
        TreeEdit::SetText { at, text } => {
            buffer.set_text(&at, text);
        }
        TreeEdit::SetType { at, kind } => {
            buffer.set_kind(&at, kind);
        }
        TreeEdit::SetFolded { at, folded } => {
            buffer.set_folded(&at, folded);
        }
        TreeEdit::SetId { at, id } => {
            buffer.set_id(&at, id);
        }
    }
}
