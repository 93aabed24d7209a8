use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Inline style flags carried by a run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
}

/// A single toggleable inline style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
}

impl Marks {
    pub const NONE: Marks = Marks {
        bold: false,
        italic: false,
    };

    pub fn has(self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
        }
    }

    pub fn with(mut self, mark: Mark, on: bool) -> Self {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
        }
        self
    }

    pub fn toggled(self, mark: Mark) -> Self {
        self.with(mark, !self.has(mark))
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A run of text sharing one set of marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

/// Styled inline text of a block: an ordered list of runs.
///
/// The run list is kept canonical (no empty runs, neighbouring runs with equal
/// marks coalesced), so two `Text` values compare equal exactly when their
/// characters and styling match. All offsets are in chars, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TextRepr", into = "TextRepr")]
pub struct Text {
    runs: Vec<Run>,
}

/// Serialized form: unstyled text is written as a bare string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TextRepr {
    Plain(String),
    Runs(Vec<Run>),
}

impl From<TextRepr> for Text {
    fn from(repr: TextRepr) -> Self {
        match repr {
            TextRepr::Plain(s) => Text::from(s),
            TextRepr::Runs(runs) => Text::from_runs(runs),
        }
    }
}

impl From<Text> for TextRepr {
    fn from(text: Text) -> Self {
        match text.runs.as_slice() {
            [] => TextRepr::Plain(String::new()),
            [run] if run.marks == Marks::NONE => TextRepr::Plain(run.text.clone()),
            _ => TextRepr::Runs(text.runs),
        }
    }
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn styled(text: &str, marks: Marks) -> Self {
        let mut out = Self::default();
        out.push(text, marks);
        out
    }

    pub fn from_runs(runs: impl IntoIterator<Item = Run>) -> Self {
        let mut out = Self::default();
        for run in runs {
            out.push(&run.text, run.marks);
        }
        out
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.runs.iter().map(|r| r.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The first `chars` characters as an unstyled string.
    pub fn prefix(&self, chars: usize) -> String {
        self.runs
            .iter()
            .flat_map(|r| r.text.chars())
            .take(chars)
            .collect()
    }

    /// Marks a character typed at `offset` should inherit: those of the
    /// preceding character, or of the first character at offset zero.
    pub fn marks_at(&self, offset: usize) -> Marks {
        let mut seen = 0;
        for run in &self.runs {
            let len = run.text.chars().count();
            if offset == 0 || offset <= seen + len {
                return run.marks;
            }
            seen += len;
        }
        self.runs.last().map(|r| r.marks).unwrap_or_default()
    }

    /// Appends `text` with `marks`, coalescing with the last run when possible.
    pub fn push(&mut self, text: &str, marks: Marks) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.marks == marks => last.text.push_str(text),
            _ => self.runs.push(Run {
                text: text.to_string(),
                marks,
            }),
        }
    }

    pub fn append(&mut self, other: Text) {
        for run in other.runs {
            self.push(&run.text, run.marks);
        }
    }

    /// Splits at char `offset`, returning everything after it.
    pub fn split_off(&mut self, offset: usize) -> Text {
        let mut seen = 0;
        let mut tail = Text::default();
        let mut keep = Vec::with_capacity(self.runs.len());
        for mut run in std::mem::take(&mut self.runs) {
            let len = run.text.chars().count();
            if seen >= offset {
                tail.push(&run.text, run.marks);
            } else if seen + len > offset {
                let at = byte_index(&run.text, offset - seen);
                let rest = run.text.split_off(at);
                tail.push(&rest, run.marks);
                keep.push(run);
            } else {
                keep.push(run);
            }
            seen += len;
        }
        self.runs = keep;
        tail
    }

    pub fn insert(&mut self, offset: usize, text: &str, marks: Marks) {
        let tail = self.split_off(offset);
        self.push(text, marks);
        self.append(tail);
    }

    /// Removes the chars in `range`; out-of-bounds ends are clamped.
    pub fn remove(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let tail = self.split_off(range.end);
        self.split_off(range.start);
        self.append(tail);
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for run in &self.runs {
            f.write_str(&run.text)?;
        }
        Ok(())
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::styled(s, Marks::NONE)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Text::styled(&s, Marks::NONE)
    }
}

fn byte_index(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}
