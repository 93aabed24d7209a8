pub mod convert;
pub mod editing;
pub mod ids;
pub mod invariants;
pub mod io;
pub mod model;
pub mod normalize;
pub mod snapshot;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::{flatten, unflatten, unflatten_with};
pub use editing::{EditError, Editor, EditorBuilder, MarkupRules, Primitive, TreeEdit};
pub use ids::{IdAllocator, RandomIds, SequentialIds};
pub use io::IoError;
pub use model::{
    Block, BlockId, BlockType, DocTree, Mark, Marks, Paragraph, Part, Scene, Text, TitleBlock,
    WordCount,
};
pub use normalize::normalize;
pub use snapshot::{OutlineEntry, SearchHit, Snapshot};
