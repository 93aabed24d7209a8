/*!
 * # Editing Core Module
 *
 * Everything that changes a manuscript goes through this module. A caller
 * sends a [`Primitive`] (type text, press Enter, backspace, retype a block, or
 * a raw [`TreeEdit`]) and gets back a document that is already settled: the
 * structure decomposes into parts and scenes, ids are unique, counts are
 * current, and nothing inside a folded range was touched without unfolding it.
 *
 * ## Architecture Overview
 *
 * ### 1. Nested Buffer, Flat View
 * - The live document is a [`Buffer`]: containers for parts and scenes, leaves
 *   for blocks, stored as owned child vectors
 * - Nodes are addressed by **index paths** from the root; there are no parent
 *   links, so ancestors are found by walking a path's prefixes
 * - Every node also carries a [`NodeKey`] that survives moves, which is how the
 *   caret and the normalizer follow a node across rewrites
 * - The flat block sequence is a depth-first walk of the leaves
 *
 * ### 2. Aspect Pipeline
 * - Behaviour is layered as an ordered list of [`Aspect`]s sharing one
 *   interface: `intercept`, `after_change`, `settle`
 * - `intercept` wraps dispatch like middleware: an aspect can rewrite a
 *   primitive, swallow it, or call `next` and act afterwards
 * - When the chain runs out, the **default effect** applies the primitive to
 *   the buffer
 * - Every buffer mutation is journaled as a [`Change`]; the pipeline feeds the
 *   journal to `after_change` and then calls `settle`, in rounds, until a round
 *   produces no changes
 *
 * ### 3. Standard Aspects (in order)
 * - **fold-guard**: unfolds any folded header whose range an edit would touch
 * - **markup**: typed shortcuts, block-type continuation on Enter, reset of
 *   empty blocks, unformat on backspace
 * - **word-count**: rewrites cached counts for blocks whose text changed
 * - **id-repair**: reassigns duplicate or missing ids
 * - **normalize**: the worklist rule engine restoring part/scene structure
 *
 * ## Module Structure
 *
 * - **`buffer`**: the nested buffer, its paths and its change journal
 * - **`primitives`**: edit intents
 * - **`pipeline`**: `Aspect`, `Next`, `Pipeline` and the shared `EditContext`
 * - **`aspects`**: the standard aspects
 * - **`editor`**: the owned `Editor` façade and its builder
 *
 * ## Usage Pattern
 *
 * ```rust
 * use storyline_engine::editing::Editor;
 * use storyline_engine::model::{BlockType, DocTree, Paragraph, Part, Scene};
 *
 * // 1. Load a manuscript tree
 * let tree = DocTree::new(vec![Part::new(
 *     "p",
 *     "One",
 *     vec![Scene::new("s", "Start", vec![Paragraph::blank("a")])],
 * )]);
 * let mut editor = Editor::from_tree(&tree);
 *
 * // 2. Place the caret and type
 * editor.set_caret(&"a".into(), 0).unwrap();
 * editor.insert_text("It began.");
 *
 * // 3. The blank paragraph is now plain text
 * assert_eq!(editor.block(&"a".into()).unwrap().kind, BlockType::Plain);
 *
 * // 4. Hand an immutable snapshot to background work
 * let snapshot = editor.snapshot();
 * assert_eq!(snapshot.search("began").len(), 1);
 * ```
 */

pub mod aspects;
pub mod buffer;
mod defaults;
pub mod editor;
pub mod pipeline;
pub mod primitives;

pub use aspects::MarkupRules;
pub use buffer::{Buffer, Change, ChangeKind, Level, Node, NodeKey, Path, Target};
pub use editor::{EditError, Editor, EditorBuilder};
pub use pipeline::{Aspect, Caret, EditContext, Next, Pipeline};
pub use primitives::{Primitive, TreeEdit};
