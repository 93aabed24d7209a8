use proptest::prelude::*;
use storyline_engine::editing::{Editor, TreeEdit};
use storyline_engine::model::{
    Block, BlockId, BlockType, DocTree, Marks, Paragraph, Part, Scene, Text, TitleBlock,
    WordCount,
};
use storyline_engine::{SequentialIds, flatten, invariants, normalize, unflatten};

/// An edit addressed by position so it can be applied to any document.
#[derive(Debug, Clone)]
enum Op {
    Caret(usize, usize),
    Type(String),
    Break,
    Split,
    Backspace,
    Delete,
    Retype(BlockType),
    Fold(usize),
    RemoveBlock(usize),
}

fn any_kind() -> impl Strategy<Value = BlockType> {
    prop::sample::select(BlockType::ALL.to_vec())
}

fn paragraph_kind() -> impl Strategy<Value = BlockType> {
    prop::sample::select(
        BlockType::ALL
            .iter()
            .copied()
            .filter(|k| k.is_paragraph())
            .collect::<Vec<_>>(),
    )
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..64, 0usize..16).prop_map(|(b, o)| Op::Caret(b, o)),
        4 => "[ab #*/@\n]{1,4}".prop_map(Op::Type),
        2 => Just(Op::Break),
        1 => Just(Op::Split),
        2 => Just(Op::Backspace),
        1 => Just(Op::Delete),
        1 => any_kind().prop_map(Op::Retype),
        1 => (0usize..64).prop_map(Op::Fold),
        1 => (0usize..64).prop_map(Op::RemoveBlock),
    ]
}

fn apply(editor: &mut Editor, op: &Op) {
    let blocks = editor.blocks();
    let pick = |i: usize| &blocks[i % blocks.len()];
    match op {
        Op::Caret(b, o) => {
            let block = pick(*b);
            let offset = o % (block.text.len() + 1);
            editor.set_caret(&block.id, offset).unwrap();
        }
        Op::Type(text) => editor.insert_text(text),
        Op::Break => editor.insert_break(),
        Op::Split => editor.split_block(),
        Op::Backspace => editor.delete_backward(),
        Op::Delete => editor.delete_forward(),
        Op::Retype(kind) => editor.set_block_type(*kind),
        Op::Fold(b) => {
            editor.toggle_fold(&pick(*b).id).unwrap();
        }
        Op::RemoveBlock(b) => {
            if let Some(at) = editor.buffer().find_block(&pick(*b).id) {
                editor.apply(TreeEdit::Remove { at });
            }
        }
    }
}

fn sample_editor() -> Editor {
    let tree = DocTree::new(vec![Part::new(
        "p",
        "One",
        vec![
            Scene::new("s1", "Start", vec![Paragraph::plain("a", "ab ba")]),
            Scene::new(
                "s2",
                "",
                vec![Paragraph::new("c", BlockType::Synopsis, "b"), Paragraph::blank("d")],
            ),
        ],
    )])
    .with_title("t", "Book");
    Editor::builder().ids(SequentialIds::new("n")).load_tree(&tree)
}

/// A header name whose tail may carry bold or italic.
fn header_name(head: &'static str) -> impl Strategy<Value = Text> {
    (head, "[a-z!]{0,3}", any::<bool>(), any::<bool>()).prop_map(
        |(head, tail, bold, italic)| {
            let mut name = Text::from(head.as_str());
            name.push(&tail, Marks { bold, italic });
            name
        },
    )
}

/// Valid trees: unique ids, Blank paragraphs empty, Plain paragraphs not.
fn valid_tree() -> impl Strategy<Value = DocTree> {
    let paragraph = (paragraph_kind(), "[a-z ]{0,8}", any::<bool>()).prop_map(
        |(kind, text, folded)| {
            let (kind, text) = match kind {
                BlockType::Blank => (kind, String::new()),
                BlockType::Plain if text.is_empty() => (BlockType::Blank, text),
                _ => (kind, text),
            };
            let mut p = Paragraph::new("", kind, text.as_str());
            p.folded = folded;
            p
        },
    );
    let scene = (header_name("[A-Z][a-z]{0,5}"), any::<bool>(), prop::collection::vec(paragraph, 0..4))
        .prop_map(|(name, folded, children)| {
            let mut s = Scene::new("", name, children);
            s.folded = folded;
            s
        });
    let part = (header_name("[A-Z]{0,3}"), any::<bool>(), prop::collection::vec(scene, 0..3)).prop_map(
        |(name, folded, children)| {
            let mut p = Part::new("", name, children);
            p.folded = folded;
            p
        },
    );
    (
        prop::option::of("[A-Z][a-z ]{0,8}"),
        prop::collection::vec(part, 0..3),
    )
        .prop_map(|(title, parts)| {
            let mut tree = DocTree::new(parts);
            let mut next = 0;
            let mut id = || {
                next += 1;
                BlockId::new(format!("b{next}"))
            };
            tree.title = title.map(|text| TitleBlock {
                id: id(),
                text: text.as_str().into(),
            });
            for part in &mut tree.parts {
                part.id = id();
                for scene in &mut part.children {
                    scene.id = id();
                    for paragraph in &mut scene.children {
                        paragraph.id = id();
                    }
                }
            }
            tree
        })
}

/// Arbitrary flat sequences, including duplicate and missing ids.
fn any_blocks() -> impl Strategy<Value = Vec<Block>> {
    let block = (any_kind(), "[abc]?", "[a-z ]{0,6}", any::<bool>()).prop_map(
        |(kind, id, text, folded)| Block::new(kind, id, text.as_str()).with_folded(folded),
    );
    prop::collection::vec(block, 0..12)
}

proptest! {
    #[test]
    fn every_reachable_state_is_settled(ops in prop::collection::vec(op(), 0..40)) {
        let mut editor = sample_editor();
        for op in &ops {
            apply(&mut editor, op);
            let blocks = editor.blocks();
            if let Err(violation) = invariants::check(&blocks) {
                return Err(TestCaseError::fail(format!(
                    "{violation} after {op:?}\n{blocks:#?}"
                )));
            }
            prop_assert!(editor.caret().is_some());
        }
    }

    #[test]
    fn tree_round_trips_through_flat_form(tree in valid_tree()) {
        let blocks = flatten(&tree);
        prop_assert!(invariants::check_structure(&blocks).is_ok());
        prop_assert_eq!(flatten(&unflatten(&blocks)), blocks.clone());
        prop_assert_eq!(unflatten(&blocks), tree);
    }

    #[test]
    fn normalization_is_idempotent(blocks in any_blocks()) {
        let once = normalize(blocks, SequentialIds::new("n"));
        prop_assert!(invariants::check(&once).is_ok());
        let twice = normalize(once.clone(), SequentialIds::new("m"));
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn cumulative_ends_at_total(blocks in any_blocks()) {
        let editor = Editor::builder().ids(SequentialIds::new("n")).load_blocks(blocks);
        let cumulative = editor.cumulative();
        let sum: WordCount = editor.counts().into_iter().sum();
        prop_assert_eq!(cumulative.last().copied(), Some(editor.total()));
        prop_assert_eq!(editor.total(), sum);
    }
}
