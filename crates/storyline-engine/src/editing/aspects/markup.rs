use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::editing::pipeline::{Aspect, Caret, EditContext, Next};
use crate::editing::primitives::Primitive;
use crate::model::BlockType;

/// Tables driving the markup shortcuts. Serialized as part of the user
/// configuration; any table left out falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupRules {
    /// Text typed at the start of a block that retypes it.
    pub shortcuts: BTreeMap<String, BlockType>,
    /// Type given to the new block after a line break in a block of the key type.
    pub continue_after: BTreeMap<BlockType, BlockType>,
    /// Types that revert to plain on a line break while empty.
    pub reset_on_empty: BTreeSet<BlockType>,
    /// Types that revert to plain on backspace at column zero.
    pub unformat_on_backspace: BTreeSet<BlockType>,
}

impl Default for MarkupRules {
    fn default() -> Self {
        use BlockType::*;

        let shortcuts = [
            ("** ", PartBreak),
            ("## ", SceneBreak),
            (">> ", Synopsis),
            ("// ", Comment),
            ("!! ", Missing),
            ("++ ", Filler),
            ("@ ", Tags),
        ];
        let continue_after = [
            (Title, PartBreak),
            (PartBreak, SceneBreak),
            (SceneBreak, Plain),
            (Synopsis, Plain),
            (Missing, Plain),
            (Filler, Plain),
            (Tags, Plain),
        ];
        let reset = [Synopsis, Comment, Missing, Filler, Tags];
        Self {
            shortcuts: shortcuts
                .into_iter()
                .map(|(trigger, kind)| (trigger.to_string(), kind))
                .collect(),
            continue_after: continue_after.into_iter().collect(),
            reset_on_empty: reset.into_iter().collect(),
            unformat_on_backspace: reset.into_iter().chain([PartBreak, SceneBreak]).collect(),
        }
    }
}

impl MarkupRules {
    /// Type for a block whose text before the caret, followed by `typed`,
    /// exactly matches a trigger.
    pub fn shortcut(&self, before_caret: &str, typed: &str) -> Option<BlockType> {
        let mut candidate = String::with_capacity(before_caret.len() + typed.len());
        candidate.push_str(before_caret);
        candidate.push_str(typed);
        self.shortcuts.get(&candidate).copied()
    }
}

/// Turns typed triggers into block types and applies the continuation and
/// reset tables to line breaks and backspaces.
#[derive(Debug, Default)]
pub struct Markup {
    rules: MarkupRules,
}

impl Markup {
    pub fn new(rules: MarkupRules) -> Self {
        Self { rules }
    }

    fn apply_shortcut(&self, ctx: &mut EditContext, typed: &str) -> bool {
        let Some((path, block)) = ctx.caret_block() else {
            return false;
        };
        let Some(caret) = ctx.caret else {
            return false;
        };
        let offset = caret.offset.min(block.text.len());
        let Some(kind) = self.rules.shortcut(&block.text.prefix(offset), typed) else {
            return false;
        };
        debug!("markup shortcut {typed:?} retypes {} as {kind}", block.id);
        ctx.buffer.remove_text(&path, 0..offset);
        ctx.buffer.set_kind(&path, kind);
        let id = ctx.buffer.allocate_id();
        ctx.buffer.set_id(&path, id);
        ctx.caret = Some(Caret { offset: 0, ..caret });
        true
    }

    fn reset_empty(&self, ctx: &mut EditContext) -> bool {
        let Some((path, block)) = ctx.caret_block() else {
            return false;
        };
        if !block.text.is_empty() || !self.rules.reset_on_empty.contains(&block.kind) {
            return false;
        }
        ctx.buffer.set_kind(&path, BlockType::Plain);
        true
    }

    fn unformat(&self, ctx: &mut EditContext) -> bool {
        let Some((path, block)) = ctx.caret_block() else {
            return false;
        };
        let at_start = ctx.caret.is_some_and(|c| c.offset == 0);
        if !at_start || !self.rules.unformat_on_backspace.contains(&block.kind) {
            return false;
        }
        ctx.buffer.set_kind(&path, BlockType::Plain);
        true
    }

    fn continuation(&self, ctx: &EditContext) -> Option<BlockType> {
        let (_, block) = ctx.caret_block()?;
        self.rules.continue_after.get(&block.kind).copied()
    }
}

impl Aspect for Markup {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn intercept(&mut self, ctx: &mut EditContext, primitive: Primitive, next: Next<'_>) {
        match &primitive {
            Primitive::InsertText(typed) if !typed.contains('\n') => {
                if self.apply_shortcut(ctx, typed) {
                    return;
                }
            }
            Primitive::InsertBreak => {
                if self.reset_empty(ctx) {
                    return;
                }
                if let Some(follow) = self.continuation(ctx) {
                    next.run(ctx, Primitive::SplitBlock);
                    if let Some(path) = ctx.caret_path() {
                        ctx.buffer.set_kind(&path, follow);
                    }
                    return;
                }
            }
            Primitive::DeleteBackward => {
                if self.unformat(ctx) {
                    return;
                }
            }
            _ => {}
        }
        next.run(ctx, primitive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "## ", Some(BlockType::SceneBreak))]
    #[case("##", " ", Some(BlockType::SceneBreak))]
    #[case("*", "* ", Some(BlockType::PartBreak))]
    #[case("@", " ", Some(BlockType::Tags))]
    #[case("x##", " ", None)]
    #[case("##", "x", None)]
    fn test_shortcut_lookup(
        #[case] before: &str,
        #[case] typed: &str,
        #[case] expected: Option<BlockType>,
    ) {
        assert_eq!(MarkupRules::default().shortcut(before, typed), expected);
    }

    #[test]
    fn test_default_tables() {
        let rules = MarkupRules::default();
        assert_eq!(rules.shortcuts.len(), 7);
        assert_eq!(
            rules.continue_after.get(&BlockType::PartBreak),
            Some(&BlockType::SceneBreak)
        );
        assert!(!rules.continue_after.contains_key(&BlockType::Comment));
        assert!(rules.reset_on_empty.contains(&BlockType::Comment));
        assert!(!rules.reset_on_empty.contains(&BlockType::SceneBreak));
        assert!(rules.unformat_on_backspace.contains(&BlockType::SceneBreak));
    }

    #[test]
    fn test_rules_json_uses_type_names() {
        let json = serde_json::to_value(MarkupRules::default()).unwrap();
        assert_eq!(json["shortcuts"]["## "], "scene_break");
        assert_eq!(json["continue_after"]["title"], "part_break");
    }
}
