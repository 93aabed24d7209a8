//! Line-based edit scripts for `storyline replay`.
//!
//! One step per line, blank lines and `#` comments ignored:
//!
//! ```text
//! caret a1 0
//! type Once upon a time
//! break
//! retype synopsis
//! fold s1
//! ```

use anyhow::{Context, Result, anyhow, bail};
use storyline_engine::{BlockId, BlockType, Editor, Mark};

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Caret(BlockId, usize),
    /// Text after `type `, with `\n` escapes turned into line breaks.
    Type(String),
    Break,
    Split,
    Backspace,
    Delete,
    Retype(BlockType),
    Fold(BlockId),
    Bold,
    Italic,
}

pub fn parse(script: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (number, line) in script.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = parse_line(trimmed).with_context(|| format!("line {}: {line}", number + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_line(line: &str) -> Result<Step> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let step = match command {
        "caret" => {
            let mut args = rest.split_whitespace();
            let id = args.next().ok_or_else(|| anyhow!("caret needs a block id"))?;
            let offset = match args.next() {
                Some(raw) => raw.parse().context("caret offset")?,
                None => 0,
            };
            Step::Caret(id.into(), offset)
        }
        "type" => Step::Type(rest.replace("\\n", "\n")),
        "break" => Step::Break,
        "split" => Step::Split,
        "backspace" => Step::Backspace,
        "delete" => Step::Delete,
        "retype" => Step::Retype(rest.trim().parse()?),
        "fold" => Step::Fold(rest.trim().into()),
        "bold" => Step::Bold,
        "italic" => Step::Italic,
        other => bail!("unknown step {other:?}"),
    };
    Ok(step)
}

pub fn run(editor: &mut Editor, steps: &[Step]) -> Result<()> {
    for step in steps {
        log::debug!("replay {step:?}");
        match step {
            Step::Caret(id, offset) => editor.set_caret(id, *offset)?,
            Step::Type(text) => editor.insert_text(text),
            Step::Break => editor.insert_break(),
            Step::Split => editor.split_block(),
            Step::Backspace => editor.delete_backward(),
            Step::Delete => editor.delete_forward(),
            Step::Retype(kind) => editor.set_block_type(*kind),
            Step::Fold(id) => {
                editor.toggle_fold(id)?;
            }
            Step::Bold => editor.toggle_mark(Mark::Bold),
            Step::Italic => editor.toggle_mark(Mark::Italic),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_parse_script() {
        let steps = parse(
            "# open the scene\ncaret a 3\ntype Hello,\\nworld\n\nbreak\nretype synopsis\nfold s1\n",
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Caret("a".into(), 3),
                Step::Type("Hello,\nworld".into()),
                Step::Break,
                Step::Retype(BlockType::Synopsis),
                Step::Fold("s1".into()),
            ]
        );
    }

    #[test]
    fn test_type_keeps_inner_spaces() {
        assert_eq!(parse("type   two  spaces").unwrap(), vec![Step::Type("  two  spaces".into())]);
    }

    #[rstest]
    #[case("jump a 1", "unknown step")]
    #[case("caret", "caret needs a block id")]
    #[case("retype chapter", "chapter")]
    fn test_parse_errors_name_the_line(#[case] script: &str, #[case] detail: &str) {
        let error = parse(script).unwrap_err();
        let message = format!("{error:#}");
        assert!(message.starts_with("line 1:"), "{message}");
        assert!(message.contains(detail), "{message}");
    }

    #[test]
    fn test_run_applies_steps() {
        let mut editor = Editor::new();
        let (first, _) = editor.caret().unwrap();
        let steps = vec![Step::Caret(first.clone(), 0), Step::Type("It was late.".into())];
        run(&mut editor, &steps).unwrap();
        assert_eq!(
            editor.block(&first).unwrap().text.to_string(),
            "It was late."
        );
    }

    #[test]
    fn test_run_stops_at_unknown_block() {
        let mut editor = Editor::new();
        let steps = vec![Step::Caret("missing".into(), 0)];
        assert!(run(&mut editor, &steps).is_err());
    }
}
