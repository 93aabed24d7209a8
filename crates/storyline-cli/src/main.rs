mod script;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use storyline_config::Config;
use storyline_engine::{
    Block, BlockId, BlockType, DocTree, Editor, OutlineEntry, SearchHit, Snapshot, flatten,
    invariants, io, normalize, unflatten,
};

#[derive(Parser)]
#[command(name = "storyline", version, about = "Structured manuscript tools")]
struct Cli {
    /// Config file to use instead of ~/.config/storyline/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a manuscript tree as its flat block sequence
    Flatten(ConvertArgs),

    /// Rebuild a manuscript tree from a flat block sequence
    Unflatten(ConvertArgs),

    /// Repair a flat block sequence into its settled form
    Normalize(ConvertArgs),

    /// Word and character counts per part and scene
    Stats {
        manuscript: PathBuf,
    },

    /// Validate a manuscript's structure
    Check {
        manuscript: PathBuf,
    },

    /// Apply an edit script to a manuscript and print the result
    Replay {
        manuscript: PathBuf,
        script: PathBuf,

        /// Write the edited tree back to the manuscript
        #[arg(long)]
        save: bool,
    },

    /// Find text in a manuscript
    Search {
        manuscript: PathBuf,
        needle: String,

        /// Print only the next match after this block
        #[arg(long)]
        from: Option<BlockId>,

        /// Char offset within the --from block
        #[arg(long, default_value_t = 0, requires = "from")]
        offset: usize,

        /// Search backwards from --from
        #[arg(long, requires = "from")]
        prev: bool,
    },

    /// Title, part and scene headers in document order
    Outline {
        manuscript: PathBuf,
    },

    /// List manuscripts in the configured directory
    List,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input JSON file
    input: PathBuf,

    /// Write here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let resolve = |path: &Path| config.resolve(path);

    match cli.command {
        Command::Flatten(args) => {
            let tree = io::load_tree(&resolve(&args.input))?;
            emit(&flatten(&tree), args.output.as_deref())
        }
        Command::Unflatten(args) => {
            let blocks = io::load_blocks(&resolve(&args.input))?;
            emit(&unflatten(&blocks), args.output.as_deref())
        }
        Command::Normalize(args) => {
            let blocks = io::load_blocks(&resolve(&args.input))?;
            let before = blocks.len();
            let settled = normalize(blocks, storyline_engine::RandomIds);
            log::info!("{before} blocks in, {} out", settled.len());
            emit(&settled, args.output.as_deref())
        }
        Command::Stats { manuscript } => {
            let editor = open(&resolve(&manuscript), &config)?;
            let snapshot = editor.snapshot();
            let mut out = std::io::stdout().lock();
            for section in snapshot.sections() {
                let indent = if section.kind == BlockType::SceneBreak {
                    "  "
                } else {
                    ""
                };
                let name = if section.name.is_empty() {
                    "(untitled)"
                } else {
                    section.name.as_str()
                };
                writeln!(
                    out,
                    "{indent}{name}: {} words, {} chars",
                    section.counts.words, section.counts.chars
                )?;
            }
            let total = snapshot.total();
            writeln!(out, "total: {} words, {} chars", total.words, total.chars)?;
            Ok(())
        }
        Command::Check { manuscript } => {
            let path = resolve(&manuscript);
            let tree = io::load_tree(&path)?;
            let blocks = flatten(&tree);
            if let Err(violation) = invariants::check_structure(&blocks) {
                bail!("{}: {violation}", path.display());
            }
            let settled = Editor::builder()
                .markup(config.markup.clone())
                .load_tree(&tree);
            let drift = unflatten(&settled.blocks()) != tree;
            if drift {
                log::warn!(
                    "{}: structure is valid but loading it changes the tree (empty scenes are filled)",
                    path.display()
                );
            }
            println!("{}: ok, {} blocks", path.display(), blocks.len());
            Ok(())
        }
        Command::Replay {
            manuscript,
            script,
            save,
        } => {
            let path = resolve(&manuscript);
            let mut editor = open(&path, &config)?;
            let source = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps = script::parse(&source)?;
            script::run(&mut editor, &steps)?;
            log::info!("applied {} steps", steps.len());

            let mut out = std::io::stdout().lock();
            for line in render(&editor.blocks()) {
                writeln!(out, "{line}")?;
            }
            if save {
                io::save_tree(&path, &editor.to_tree())?;
                log::info!("saved {}", path.display());
            }
            Ok(())
        }
        Command::Search {
            manuscript,
            needle,
            from,
            offset,
            prev,
        } => {
            let editor = open(&resolve(&manuscript), &config)?;
            let snapshot = editor.snapshot();
            let start = match &from {
                Some(id) => {
                    let Some(index) = snapshot.blocks().iter().position(|b| &b.id == id) else {
                        bail!("no block {id} in {}", manuscript.display());
                    };
                    Some((index, offset))
                }
                None => None,
            };
            for hit in hits(&snapshot, &needle, start, prev) {
                let block = &snapshot.blocks()[hit.index];
                println!("{} {}:{} {}", block.kind, hit.id, hit.offset, block.text);
            }
            Ok(())
        }
        Command::Outline { manuscript } => {
            let editor = open(&resolve(&manuscript), &config)?;
            let mut out = std::io::stdout().lock();
            for line in render_outline(&editor.snapshot().outline()) {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        Command::List => {
            let Some(root) = &config.manuscripts_path else {
                bail!(
                    "no manuscripts_path set in {}",
                    Config::config_path().display()
                );
            };
            for file in io::scan_manuscripts(root)? {
                let shown = file.strip_prefix(root).unwrap_or(&file);
                println!("{}", shown.display());
            }
            Ok(())
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let loaded = match explicit {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    match loaded {
        Some(config) => Ok(config),
        None => {
            log::debug!("no config file, using defaults");
            Ok(Config::default())
        }
    }
}

fn open(path: &Path, config: &Config) -> Result<Editor> {
    let tree: DocTree = io::load_tree(path)?;
    log::info!(
        "loaded {} ({} parts, {} paragraphs)",
        path.display(),
        tree.parts.len(),
        tree.paragraph_count()
    );
    Ok(Editor::builder()
        .markup(config.markup.clone())
        .load_tree(&tree))
}

fn emit<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

/// One line per block: `type id "text"`, folded blocks marked with `+`.
fn render(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .map(|b| {
            let fold = if b.folded { "+" } else { "" };
            format!("{fold}{} {} {:?}", b.kind, b.id, b.text.to_string())
        })
        .collect()
}

/// All matches, or the single wrapping neighbour of `start` when one is given.
fn hits(
    snapshot: &Snapshot,
    needle: &str,
    start: Option<(usize, usize)>,
    backwards: bool,
) -> Vec<SearchHit> {
    match start {
        None => snapshot.search(needle),
        Some((index, offset)) if backwards => {
            snapshot.find_prev(needle, index, offset).into_iter().collect()
        }
        Some((index, offset)) => snapshot.find_next(needle, index, offset).into_iter().collect(),
    }
}

fn render_outline(entries: &[OutlineEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let indent = match entry.kind {
                BlockType::SceneBreak => "    ",
                BlockType::PartBreak => "  ",
                _ => "",
            };
            let fold = if entry.folded { " +" } else { "" };
            let name = if entry.name.is_empty() {
                "(untitled)"
            } else {
                entry.name.as_str()
            };
            format!("{indent}{name} [{}]{fold}", entry.id)
        })
        .collect()
}
