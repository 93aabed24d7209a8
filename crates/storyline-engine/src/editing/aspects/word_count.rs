use crate::editing::buffer::{Buffer, Change, ChangeKind};
use crate::editing::pipeline::{Aspect, EditContext};
use crate::model::WordCount;

/// Keeps each block's cached own count in step with its text.
#[derive(Debug, Default)]
pub struct WordCounter {
    writes: usize,
}

impl WordCounter {
    /// Recounts every leaf under `path`, writing back only counts that moved.
    /// Returns the number written.
    pub fn refresh(&mut self, buffer: &mut Buffer, path: &[usize]) -> usize {
        let mut written = 0;
        for leaf in buffer.leaf_paths_under(path) {
            let Some(block) = buffer.block(&leaf) else {
                continue;
            };
            let fresh = WordCount::of_text(&block.text);
            if fresh != block.counts {
                buffer.set_counts(&leaf, fresh);
                written += 1;
            }
        }
        self.writes += written;
        written
    }

    /// Total write-backs since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Aspect for WordCounter {
    fn name(&self) -> &'static str {
        "word-count"
    }

    fn after_change(&mut self, ctx: &mut EditContext, change: &Change) {
        let dirty = match change.kind {
            ChangeKind::Text | ChangeKind::Inserted | ChangeKind::Merged => {
                ctx.buffer.path_of(change.target)
            }
            ChangeKind::Reset => Some(Vec::new()),
            _ => None,
        };
        if let Some(path) = dirty {
            self.refresh(&mut ctx.buffer, &path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::model::{Block, Text};

    #[test]
    fn test_refresh_skips_unchanged_counts() {
        // Given a buffer whose cached counts are already right
        let mut buffer = Buffer::from_blocks(
            vec![Block::plain("a", "one two"), Block::plain("b", "three")],
            Box::new(SequentialIds::new("n")),
        );
        let mut counter = WordCounter::default();
        assert_eq!(counter.refresh(&mut buffer, &[]), 0);

        // When one block's text changes
        let a = buffer.find_block(&"a".into()).unwrap();
        buffer.set_text(&a, Text::from("one two four"));

        // Then only that block is written back
        assert_eq!(counter.refresh(&mut buffer, &[]), 1);
        assert_eq!(buffer.block(&a).unwrap().counts, WordCount { words: 3, chars: 12 });
        assert_eq!(counter.writes(), 1);
    }

    #[test]
    fn test_stale_loaded_counts_are_fixed() {
        let mut stale = Block::plain("a", "four little words here");
        stale.counts = WordCount::default();
        let mut buffer = Buffer::from_blocks(vec![stale], Box::new(SequentialIds::new("n")));
        let mut counter = WordCounter::default();
        counter.refresh(&mut buffer, &[]);
        assert_eq!(buffer.blocks()[0].counts.words, 4);
    }
}
