// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use storyline_engine::model::{BlockType, DocTree, Paragraph, Part, Scene};

#[allow(dead_code)]
pub fn generate_manuscript(parts: usize, scenes: usize, paragraphs: usize) -> DocTree {
    let mut next = 0;
    let mut id = || {
        next += 1;
        format!("b{next}")
    };

    let tree = (0..parts)
        .map(|p| {
            let children = (0..scenes)
                .map(|s| {
                    let children = (0..paragraphs)
                        .map(|i| match i % 5 {
                            4 => Paragraph::blank(id()),
                            3 => Paragraph::new(id(), BlockType::Comment, "Check the dates here."),
                            _ => Paragraph::plain(
                                id(),
                                "Some paragraph content with multiple sentences. This helps create realistic manuscript structure for benchmarking.",
                            ),
                        })
                        .collect();
                    Scene::new(id(), format!("Scene {s}"), children)
                })
                .collect();
            Part::new(id(), format!("Part {p}"), children)
        })
        .collect();

    DocTree::new(tree).with_title(id(), "Benchmark")
}
