pub mod block;
pub mod counts;
pub mod text;
pub mod tree;

pub use block::{Block, BlockId, BlockType, UnknownBlockType};
pub use counts::{SectionCount, WordCount};
pub use text::{Mark, Marks, Run, Text};
pub use tree::{DocTree, Paragraph, Part, Scene, TitleBlock};
