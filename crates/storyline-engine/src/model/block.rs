use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::counts::WordCount;
use super::text::Text;

/// Kind of a block in the flat editable sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Title,
    PartBreak,
    SceneBreak,
    Plain,
    Blank,
    Synopsis,
    Comment,
    Missing,
    Filler,
    Tags,
}

impl BlockType {
    pub const ALL: [BlockType; 10] = [
        BlockType::Title,
        BlockType::PartBreak,
        BlockType::SceneBreak,
        BlockType::Plain,
        BlockType::Blank,
        BlockType::Synopsis,
        BlockType::Comment,
        BlockType::Missing,
        BlockType::Filler,
        BlockType::Tags,
    ];

    /// Part-Break or Scene-Break.
    pub fn is_break(self) -> bool {
        matches!(self, BlockType::PartBreak | BlockType::SceneBreak)
    }

    /// Anything that may live inside a scene.
    pub fn is_paragraph(self) -> bool {
        !matches!(
            self,
            BlockType::Title | BlockType::PartBreak | BlockType::SceneBreak
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Title => "title",
            BlockType::PartBreak => "part_break",
            BlockType::SceneBreak => "scene_break",
            BlockType::Plain => "plain",
            BlockType::Blank => "blank",
            BlockType::Synopsis => "synopsis",
            BlockType::Comment => "comment",
            BlockType::Missing => "missing",
            BlockType::Filler => "filler",
            BlockType::Tags => "tags",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block type: {0}")]
pub struct UnknownBlockType(pub String);

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        BlockType::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}

/// Opaque, document-unique block identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One element of the flat editable sequence.
///
/// `counts` caches the own word/char count of `text`. It is kept current by the
/// editor; blocks deserialized without it start at zero until the editor has
/// seen them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub id: BlockId,
    #[serde(default)]
    pub text: Text,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub folded: bool,
    #[serde(default)]
    pub counts: WordCount,
}

impl Block {
    pub fn new(kind: BlockType, id: impl Into<BlockId>, text: impl Into<Text>) -> Self {
        let text = text.into();
        Self {
            kind,
            id: id.into(),
            counts: WordCount::of_text(&text),
            text,
            folded: false,
        }
    }

    pub fn plain(id: impl Into<BlockId>, text: impl Into<Text>) -> Self {
        Self::new(BlockType::Plain, id, text)
    }

    pub fn part_break(id: impl Into<BlockId>, name: impl Into<Text>) -> Self {
        Self::new(BlockType::PartBreak, id, name)
    }

    pub fn scene_break(id: impl Into<BlockId>, name: impl Into<Text>) -> Self {
        Self::new(BlockType::SceneBreak, id, name)
    }

    pub fn with_folded(mut self, folded: bool) -> Self {
        self.folded = folded;
        self
    }
}
