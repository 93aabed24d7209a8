use serde::{Deserialize, Serialize};

use super::block::{BlockId, BlockType};
use super::text::Text;

/// Persisted nested shape of a manuscript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleBlock>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleBlock {
    pub id: BlockId,
    #[serde(default)]
    pub text: Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: BlockId,
    #[serde(default)]
    pub name: Text,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub folded: bool,
    #[serde(default)]
    pub children: Vec<Scene>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: BlockId,
    #[serde(default)]
    pub name: Text,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub folded: bool,
    #[serde(default)]
    pub children: Vec<Paragraph>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockType,
    #[serde(default)]
    pub text: Text,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub folded: bool,
}

impl DocTree {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { title: None, parts }
    }

    pub fn with_title(mut self, id: impl Into<BlockId>, text: impl Into<Text>) -> Self {
        self.title = Some(TitleBlock {
            id: id.into(),
            text: text.into(),
        });
        self
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.parts.iter().flat_map(|p| p.children.iter())
    }

    pub fn paragraph_count(&self) -> usize {
        self.scenes().map(|s| s.children.len()).sum()
    }
}

impl Part {
    pub fn new(id: impl Into<BlockId>, name: impl Into<Text>, children: Vec<Scene>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folded: false,
            children,
        }
    }
}

impl Scene {
    pub fn new(id: impl Into<BlockId>, name: impl Into<Text>, children: Vec<Paragraph>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folded: false,
            children,
        }
    }
}

impl Paragraph {
    pub fn new(id: impl Into<BlockId>, kind: BlockType, text: impl Into<Text>) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
            folded: false,
        }
    }

    pub fn plain(id: impl Into<BlockId>, text: impl Into<Text>) -> Self {
        Self::new(id, BlockType::Plain, text)
    }

    pub fn blank(id: impl Into<BlockId>) -> Self {
        Self::new(id, BlockType::Blank, Text::new())
    }
}
