use crate::editing::buffer::{Change, ChangeKind, Path};
use crate::editing::pipeline::{Aspect, EditContext};
use crate::ids::plan_repairs;
use crate::model::BlockId;

/// Document-wide uniqueness scan, run once per settle round after anything
/// that can introduce an id (inserts, id changes, loads).
#[derive(Debug, Default)]
pub struct IdRepair {
    dirty: bool,
}

impl Aspect for IdRepair {
    fn name(&self) -> &'static str {
        "id-repair"
    }

    fn after_change(&mut self, _ctx: &mut EditContext, change: &Change) {
        if matches!(
            change.kind,
            ChangeKind::Inserted | ChangeKind::Id | ChangeKind::Reset
        ) {
            self.dirty = true;
        }
    }

    fn settle(&mut self, ctx: &mut EditContext) {
        if !std::mem::take(&mut self.dirty) {
            return;
        }
        let leaves: Vec<(Path, BlockId)> = ctx
            .buffer
            .leaf_paths()
            .into_iter()
            .filter_map(|path| {
                let id = ctx.buffer.block(&path)?.id.clone();
                Some((path, id))
            })
            .collect();
        let repairs = plan_repairs(leaves.iter().map(|(_, id)| id), ctx.buffer.ids_mut());
        for (index, fresh) in repairs {
            ctx.buffer.set_id(&leaves[index].0, fresh);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::editing::Editor;
    use crate::ids::SequentialIds;
    use crate::model::Block;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inserted_duplicate_gets_fresh_id() {
        let mut editor = Editor::builder().ids(SequentialIds::new("n")).load_blocks(vec![
            Block::part_break("p", "One"),
            Block::scene_break("s", ""),
            Block::plain("a", "first"),
            Block::plain("a", "second"),
            Block::plain("", "third"),
        ]);
        let ids: Vec<String> = editor.blocks().iter().map(|b| b.id.to_string()).collect();
        assert_eq!(ids, vec!["p", "s", "a", "n1", "n2"]);

        editor.set_caret(&"a".into(), 5).unwrap();
        editor.split_block();
        let blocks = editor.blocks();
        let unique: std::collections::HashSet<_> = blocks.iter().map(|b| &b.id).collect();
        assert_eq!(unique.len(), blocks.len());
    }
}
