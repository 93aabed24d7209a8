//! The nested working document the editor mutates.
//!
//! Nodes are owned child vectors addressed by index paths; there are no parent
//! links. Every mutation appends a [`Change`] to a journal that the pipeline
//! drains after each step, so aspects can react to what happened without
//! diffing the document.

use std::ops::Range;

use crate::ids::IdAllocator;
use crate::model::{Block, BlockId, BlockType, DocTree, Marks, Text, WordCount};

/// Index path from the root: `[part, scene, paragraph]` for a settled leaf.
pub type Path = Vec<usize>;

/// `path` extended by one child index.
pub fn child_path(path: &[usize], index: usize) -> Path {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(index);
    child
}

/// Stable identity of a node inside one buffer. Unlike paths, keys survive
/// structural rewrites; unlike block ids, containers have them too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Part,
    Scene,
}

impl Level {
    /// Break type that must head a container of this level.
    pub fn header(self) -> BlockType {
        match self {
            Level::Part => BlockType::PartBreak,
            Level::Scene => BlockType::SceneBreak,
        }
    }

    /// Path length of a correctly placed container.
    pub fn depth(self) -> usize {
        match self {
            Level::Part => 1,
            Level::Scene => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Container {
        key: NodeKey,
        level: Level,
        children: Vec<Node>,
    },
    Leaf {
        key: NodeKey,
        block: Block,
    },
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Container { key, .. } | Node::Leaf { key, .. } => *key,
        }
    }

    pub fn block(&self) -> Option<&Block> {
        match self {
            Node::Leaf { block, .. } => Some(block),
            Node::Container { .. } => None,
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self {
            Node::Container { level, .. } => Some(*level),
            Node::Leaf { .. } => None,
        }
    }

    /// Children of a container; empty for a leaf.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Container { children, .. } => children,
            Node::Leaf { .. } => &[],
        }
    }

    /// The container's header block, if its first child is the right break.
    pub fn header(&self) -> Option<&Block> {
        let level = self.level()?;
        self.children()
            .first()
            .and_then(Node::block)
            .filter(|b| b.kind == level.header())
    }

    fn collect_leaves(&self, prefix: &mut Path, out: &mut Vec<Path>) {
        match self {
            Node::Leaf { .. } => out.push(prefix.clone()),
            Node::Container { children, .. } => {
                for (i, child) in children.iter().enumerate() {
                    prefix.push(i);
                    child.collect_leaves(prefix, out);
                    prefix.pop();
                }
            }
        }
    }

    fn count(&self) -> usize {
        1 + self.children().iter().map(Node::count).sum::<usize>()
    }
}

/// Something the normalizer can be asked to revisit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Root,
    Node(NodeKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Text,
    Kind,
    Id,
    Fold,
    Inserted,
    Removed,
    Wrapped,
    Lifted,
    Split,
    Merged,
    Moved,
    /// The whole document should be treated as new.
    Reset,
}

/// Journal entry for one raw mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    pub target: Target,
    /// Nodes whose structural validity may depend on this change: the parent
    /// and the siblings around the edit position.
    pub touched: Vec<Target>,
}

#[derive(Debug)]
pub struct Buffer {
    roots: Vec<Node>,
    next_key: u32,
    changes: Vec<Change>,
    ids: Box<dyn IdAllocator>,
}

impl Buffer {
    pub fn new(ids: Box<dyn IdAllocator>) -> Self {
        Self {
            roots: Vec::new(),
            next_key: 0,
            changes: Vec::new(),
            ids,
        }
    }

    /// Groups a flat sequence the way `unflatten` does: a part per
    /// Part-Break, a scene per Scene-Break. Groups missing their break become
    /// headerless containers, left for normalization to repair.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>, ids: Box<dyn IdAllocator>) -> Self {
        let mut buffer = Self::new(ids);
        let mut roots: Vec<Node> = Vec::new();
        for (index, block) in blocks.into_iter().enumerate() {
            let kind = block.kind;
            let leaf = buffer.new_leaf(block);
            if index == 0 && kind == BlockType::Title {
                roots.push(leaf);
                continue;
            }
            if kind == BlockType::PartBreak {
                let part = buffer.new_container(Level::Part, vec![leaf]);
                roots.push(part);
                continue;
            }
            if !matches!(roots.last(), Some(Node::Container { .. })) {
                let part = buffer.new_container(Level::Part, Vec::new());
                roots.push(part);
            }
            let Some(Node::Container { children: part, .. }) = roots.last_mut() else {
                continue;
            };
            if kind == BlockType::SceneBreak {
                part.push(buffer.new_container(Level::Scene, vec![leaf]));
                continue;
            }
            if !matches!(part.last(), Some(Node::Container { .. })) {
                part.push(buffer.new_container(Level::Scene, Vec::new()));
            }
            if let Some(Node::Container { children: scene, .. }) = part.last_mut() {
                scene.push(leaf);
            }
        }
        buffer.roots = roots;
        buffer.touch_all();
        buffer
    }

    /// Builds the nesting straight from the tree.
    pub fn from_tree(tree: &DocTree, ids: Box<dyn IdAllocator>) -> Self {
        let mut buffer = Self::new(ids);
        let mut roots = Vec::with_capacity(tree.parts.len() + 1);
        if let Some(title) = &tree.title {
            roots.push(buffer.new_leaf(Block::new(
                BlockType::Title,
                title.id.clone(),
                title.text.clone(),
            )));
        }
        for part in &tree.parts {
            let mut part_children = Vec::with_capacity(part.children.len() + 1);
            part_children.push(buffer.new_leaf(
                Block::part_break(part.id.clone(), part.name.clone()).with_folded(part.folded),
            ));
            for scene in &part.children {
                let mut scene_children = Vec::with_capacity(scene.children.len() + 1);
                scene_children.push(buffer.new_leaf(
                    Block::scene_break(scene.id.clone(), scene.name.clone())
                        .with_folded(scene.folded),
                ));
                for paragraph in &scene.children {
                    scene_children.push(buffer.new_leaf(
                        Block::new(paragraph.kind, paragraph.id.clone(), paragraph.text.clone())
                            .with_folded(paragraph.folded),
                    ));
                }
                part_children.push(buffer.new_container(Level::Scene, scene_children));
            }
            roots.push(buffer.new_container(Level::Part, part_children));
        }
        buffer.roots = roots;
        buffer.touch_all();
        buffer
    }

    // ---- reading -------------------------------------------------------

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(Node::count).sum()
    }

    pub fn children_at(&self, parent: &[usize]) -> Option<&[Node]> {
        let mut children = self.roots.as_slice();
        for &i in parent {
            match children.get(i)? {
                Node::Container { children: inner, .. } => children = inner.as_slice(),
                Node::Leaf { .. } => return None,
            }
        }
        Some(children)
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (&last, parent) = path.split_last()?;
        self.children_at(parent)?.get(last)
    }

    pub fn block(&self, path: &[usize]) -> Option<&Block> {
        self.node(path).and_then(Node::block)
    }

    pub fn locate(&self, key: NodeKey) -> Option<Path> {
        fn search(nodes: &[Node], key: NodeKey, path: &mut Path) -> bool {
            for (i, node) in nodes.iter().enumerate() {
                path.push(i);
                if node.key() == key || search(node.children(), key, path) {
                    return true;
                }
                path.pop();
            }
            false
        }
        let mut path = Vec::new();
        search(&self.roots, key, &mut path).then_some(path)
    }

    pub fn path_of(&self, target: Target) -> Option<Path> {
        match target {
            Target::Root => Some(Vec::new()),
            Target::Node(key) => self.locate(key),
        }
    }

    /// Paths of all leaves under `path` (the whole document for `[]`), in
    /// document order.
    pub fn leaf_paths_under(&self, path: &[usize]) -> Vec<Path> {
        let mut out = Vec::new();
        let mut prefix = path.to_vec();
        if path.is_empty() {
            for (i, node) in self.roots.iter().enumerate() {
                prefix.push(i);
                node.collect_leaves(&mut prefix, &mut out);
                prefix.pop();
            }
        } else if let Some(node) = self.node(path) {
            node.collect_leaves(&mut prefix, &mut out);
        }
        out
    }

    pub fn leaf_paths(&self) -> Vec<Path> {
        self.leaf_paths_under(&[])
    }

    pub fn leaf_keys_under(&self, path: &[usize]) -> Vec<NodeKey> {
        self.leaf_paths_under(path)
            .iter()
            .filter_map(|p| self.node(p).map(Node::key))
            .collect()
    }

    /// The flat block sequence in document order.
    pub fn blocks(&self) -> Vec<Block> {
        self.leaf_paths()
            .iter()
            .filter_map(|p| self.block(p).cloned())
            .collect()
    }

    pub fn find_block(&self, id: &BlockId) -> Option<Path> {
        self.leaf_paths()
            .into_iter()
            .find(|p| self.block(p).is_some_and(|b| &b.id == id))
    }

    pub fn prev_leaf(&self, path: &[usize]) -> Option<Path> {
        let leaves = self.leaf_paths();
        let at = leaves.iter().position(|p| p == path)?;
        at.checked_sub(1).map(|i| leaves[i].clone())
    }

    pub fn next_leaf(&self, path: &[usize]) -> Option<Path> {
        let leaves = self.leaf_paths();
        let at = leaves.iter().position(|p| p == path)?;
        leaves.get(at + 1).cloned()
    }

    // ---- journal -------------------------------------------------------

    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    /// Number of journal entries not yet taken.
    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    pub fn changes_since(&self, mark: usize) -> &[Change] {
        self.changes.get(mark..).unwrap_or(&[])
    }

    /// Journals a [`ChangeKind::Reset`] so every aspect revisits everything.
    pub fn touch_all(&mut self) {
        self.record(ChangeKind::Reset, Target::Root, Vec::new());
    }

    fn record(&mut self, kind: ChangeKind, target: Target, touched: Vec<Target>) {
        self.changes.push(Change {
            kind,
            target,
            touched,
        });
    }

    fn neighbourhood(&self, parent: &[usize], index: usize) -> Vec<Target> {
        let mut touched = vec![self.target_at(parent)];
        if let Some(children) = self.children_at(parent) {
            let lo = index.saturating_sub(1);
            let hi = (index + 2).min(children.len());
            touched.extend(children[lo.min(hi)..hi].iter().map(|n| Target::Node(n.key())));
        }
        touched
    }

    fn target_at(&self, path: &[usize]) -> Target {
        match self.node(path) {
            Some(node) => Target::Node(node.key()),
            None => Target::Root,
        }
    }

    // ---- construction --------------------------------------------------

    pub fn allocate_id(&mut self) -> BlockId {
        self.ids.allocate()
    }

    pub fn ids_mut(&mut self) -> &mut dyn IdAllocator {
        self.ids.as_mut()
    }

    fn next_key(&mut self) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        key
    }

    pub fn new_leaf(&mut self, block: Block) -> Node {
        Node::Leaf {
            key: self.next_key(),
            block,
        }
    }

    pub fn new_container(&mut self, level: Level, children: Vec<Node>) -> Node {
        Node::Container {
            key: self.next_key(),
            level,
            children,
        }
    }

    // ---- structural edits ----------------------------------------------

    fn children_at_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Node>> {
        let mut children = &mut self.roots;
        for &i in parent {
            match children.get_mut(i)? {
                Node::Container { children: inner, .. } => children = inner,
                Node::Leaf { .. } => return None,
            }
        }
        Some(children)
    }

    fn node_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (&last, parent) = path.split_last()?;
        self.children_at_mut(parent)?.get_mut(last)
    }

    fn block_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        match self.node_mut(path)? {
            Node::Leaf { block, .. } => Some(block),
            Node::Container { .. } => None,
        }
    }

    /// Detaches a node without journaling.
    fn take(&mut self, path: &[usize]) -> Option<Node> {
        let (&index, parent) = path.split_last()?;
        let children = self.children_at_mut(parent)?;
        (index < children.len()).then(|| children.remove(index))
    }

    /// Attaches a node without journaling; `index` is clamped.
    fn put(&mut self, parent: &[usize], index: usize, node: Node) -> Result<usize, Node> {
        match self.children_at_mut(parent) {
            Some(children) => {
                let index = index.min(children.len());
                children.insert(index, node);
                Ok(index)
            }
            None => Err(node),
        }
    }

    /// Inserts `node` as child `index` of `parent` (clamped to the end).
    pub fn insert(&mut self, parent: &[usize], index: usize, node: Node) -> bool {
        let key = node.key();
        match self.put(parent, index, node) {
            Ok(index) => {
                let touched = self.neighbourhood(parent, index);
                self.record(ChangeKind::Inserted, Target::Node(key), touched);
                true
            }
            Err(_) => false,
        }
    }

    pub fn insert_block(&mut self, parent: &[usize], index: usize, block: Block) -> Option<NodeKey> {
        let node = self.new_leaf(block);
        let key = node.key();
        self.insert(parent, index, node).then_some(key)
    }

    pub fn remove(&mut self, path: &[usize]) -> Option<Node> {
        let (&index, parent) = path.split_last()?;
        let node = self.take(path)?;
        let touched = self.neighbourhood(parent, index);
        self.record(ChangeKind::Removed, Target::Node(node.key()), touched);
        Some(node)
    }

    /// Replaces the node at `path` with a new container of `level` holding it.
    pub fn wrap(&mut self, path: &[usize], level: Level) -> Option<NodeKey> {
        let (&index, parent) = path.split_last()?;
        let inner = self.take(path)?;
        let inner_key = inner.key();
        let wrapper = self.new_container(level, vec![inner]);
        let key = wrapper.key();
        self.put(parent, index, wrapper).ok()?;
        let mut touched = self.neighbourhood(parent, index);
        touched.push(Target::Node(inner_key));
        self.record(ChangeKind::Wrapped, Target::Node(key), touched);
        Some(key)
    }

    /// Moves the node at `path` and every following sibling into a new
    /// container of the parent's level, placed right after the parent.
    pub fn split(&mut self, path: &[usize]) -> Option<NodeKey> {
        let (&index, parent_path) = path.split_last()?;
        let (&parent_index, grand) = parent_path.split_last()?;
        if index == 0 {
            return None;
        }
        let (level, tail) = match self.node_mut(parent_path)? {
            Node::Container {
                level, children, ..
            } if index < children.len() => (*level, children.split_off(index)),
            _ => return None,
        };
        let first = tail.first().map(Node::key);
        let sibling = self.new_container(level, tail);
        let key = sibling.key();
        self.put(grand, parent_index + 1, sibling).ok()?;
        let mut touched = self.neighbourhood(grand, parent_index + 1);
        touched.extend(first.map(Target::Node));
        self.record(ChangeKind::Split, Target::Node(key), touched);
        Some(key)
    }

    /// Moves the node at `path` up one level, next to its former parent.
    /// Splits the parent when the node sits in its middle; removes the parent
    /// when the node was its only child.
    pub fn lift(&mut self, path: &[usize]) -> bool {
        let Some((&index, parent_path)) = path.split_last() else {
            return false;
        };
        let Some((&parent_index, grand)) = parent_path.split_last() else {
            return false;
        };
        let Some(parent) = self.node(parent_path) else {
            return false;
        };
        let len = parent.children().len();
        let parent_key = parent.key();
        if index >= len {
            return false;
        }

        let (node, dest) = if len == 1 {
            let Some(Node::Container { mut children, .. }) = self.take(parent_path) else {
                return false;
            };
            (children.pop(), parent_index)
        } else if index == 0 {
            (self.take(path), parent_index)
        } else if index == len - 1 {
            (self.take(path), parent_index + 1)
        } else {
            if self.split(&child_path(parent_path, index + 1)).is_none() {
                return false;
            }
            (self.take(path), parent_index + 1)
        };
        let Some(node) = node else {
            return false;
        };
        let key = node.key();
        let Ok(dest) = self.put(grand, dest, node) else {
            return false;
        };
        let mut touched = self.neighbourhood(grand, dest);
        touched.push(Target::Node(parent_key));
        self.record(ChangeKind::Lifted, Target::Node(key), touched);
        true
    }

    /// Merges the node at `path` into its previous sibling. Containers of the
    /// same level concatenate children; leaves concatenate text.
    pub fn merge(&mut self, path: &[usize]) -> bool {
        let Some((&index, parent)) = path.split_last() else {
            return false;
        };
        if index == 0 {
            return false;
        }
        let prev_path = child_path(parent, index - 1);
        let compatible = match (self.node(&prev_path), self.node(path)) {
            (Some(prev), Some(node)) => match (prev.level(), node.level()) {
                (Some(a), Some(b)) => a == b,
                (None, None) => true,
                _ => false,
            },
            _ => false,
        };
        if !compatible {
            return false;
        }
        let Some(node) = self.take(path) else {
            return false;
        };
        let mut junction = None;
        let prev_key = match (self.node_mut(&prev_path), node) {
            (Some(Node::Container { key, children, .. }), Node::Container { children: moved, .. }) => {
                junction = moved.first().map(Node::key);
                children.extend(moved);
                *key
            }
            (Some(Node::Leaf { key, block }), Node::Leaf { block: other, .. }) => {
                block.text.append(other.text);
                *key
            }
            _ => return false,
        };
        let mut touched = self.neighbourhood(parent, index - 1);
        touched.extend(junction.map(Target::Node));
        self.record(ChangeKind::Merged, Target::Node(prev_key), touched);
        true
    }

    /// Moves a node. `to_parent` and `index` address the tree as it is after
    /// the node has been detached.
    pub fn move_node(&mut self, from: &[usize], to_parent: &[usize], index: usize) -> bool {
        let Some((&from_index, from_parent)) = from.split_last() else {
            return false;
        };
        let Some(node) = self.take(from) else {
            return false;
        };
        let key = node.key();
        let mut touched = self.neighbourhood(from_parent, from_index);
        let dest = match self.put(to_parent, index, node) {
            Ok(dest) => dest,
            Err(node) => {
                // destination vanished with the detached node; undo
                let _ = self.put(from_parent, from_index, node);
                return false;
            }
        };
        touched.extend(self.neighbourhood(to_parent, dest));
        self.record(ChangeKind::Moved, Target::Node(key), touched);
        true
    }

    // ---- leaf edits ----------------------------------------------------

    fn record_leaf(&mut self, kind: ChangeKind, path: &[usize]) {
        let Some((&index, parent)) = path.split_last() else {
            return;
        };
        let Some(key) = self.node(path).map(Node::key) else {
            return;
        };
        let touched = self.neighbourhood(parent, index);
        self.record(kind, Target::Node(key), touched);
    }

    pub fn set_text(&mut self, path: &[usize], text: Text) -> bool {
        match self.block_mut(path) {
            Some(block) if block.text != text => block.text = text,
            _ => return false,
        }
        self.record_leaf(ChangeKind::Text, path);
        true
    }

    pub fn insert_text(&mut self, path: &[usize], offset: usize, text: &str, marks: Marks) -> bool {
        if text.is_empty() {
            return false;
        }
        match self.block_mut(path) {
            Some(block) => block.text.insert(offset, text, marks),
            None => return false,
        }
        self.record_leaf(ChangeKind::Text, path);
        true
    }

    pub fn remove_text(&mut self, path: &[usize], range: Range<usize>) -> bool {
        match self.block_mut(path) {
            Some(block) if range.start < range.end && range.start < block.text.len() => {
                block.text.remove(range)
            }
            _ => return false,
        }
        self.record_leaf(ChangeKind::Text, path);
        true
    }

    pub fn append_text(&mut self, path: &[usize], text: Text) -> bool {
        if text.is_empty() {
            return false;
        }
        match self.block_mut(path) {
            Some(block) => block.text.append(text),
            None => return false,
        }
        self.record_leaf(ChangeKind::Text, path);
        true
    }

    /// Splits a leaf's text at `offset`; the tail becomes a new leaf of the
    /// same type with `id`, inserted right after it.
    pub fn split_leaf(&mut self, path: &[usize], offset: usize, id: BlockId) -> Option<NodeKey> {
        let (&index, parent) = path.split_last()?;
        let block = self.block_mut(path)?;
        let tail = block.text.split_off(offset);
        let kind = block.kind;
        self.record_leaf(ChangeKind::Text, path);
        self.insert_block(parent, index + 1, Block::new(kind, id, tail))
    }

    pub fn set_kind(&mut self, path: &[usize], kind: BlockType) -> bool {
        match self.block_mut(path) {
            Some(block) if block.kind != kind => block.kind = kind,
            _ => return false,
        }
        self.record_leaf(ChangeKind::Kind, path);
        true
    }

    pub fn set_folded(&mut self, path: &[usize], folded: bool) -> bool {
        match self.block_mut(path) {
            Some(block) if block.folded != folded => block.folded = folded,
            _ => return false,
        }
        self.record_leaf(ChangeKind::Fold, path);
        true
    }

    pub fn set_id(&mut self, path: &[usize], id: BlockId) -> bool {
        match self.block_mut(path) {
            Some(block) if block.id != id => block.id = id,
            _ => return false,
        }
        self.record_leaf(ChangeKind::Id, path);
        true
    }

    /// Updates the cached count. Not journaled: counts are derived data.
    pub fn set_counts(&mut self, path: &[usize], counts: WordCount) {
        if let Some(block) = self.block_mut(path) {
            block.counts = counts;
        }
    }
}
