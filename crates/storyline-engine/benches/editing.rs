use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use storyline_engine::editing::Editor;
mod common;

fn bench_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("loading");
    group.sample_size(10);

    for parts in [1, 10, 40] {
        let tree = common::generate_manuscript(parts, 8, 20);
        group.bench_with_input(BenchmarkId::new("load_tree", parts), &tree, |b, tree| {
            b.iter(|| std::hint::black_box(Editor::from_tree(tree)));
        });
    }

    group.finish();
}

fn bench_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing");
    group.sample_size(10);

    let tree = common::generate_manuscript(10, 8, 20);
    let target = tree.parts[5].children[4].children[0].id.clone();

    group.bench_function("insert_char", |b| {
        let mut editor = Editor::from_tree(&tree);
        editor.set_caret(&target, 0).unwrap();
        b.iter(|| editor.insert_text(std::hint::black_box("a")));
    });

    group.bench_function("break_and_join", |b| {
        let mut editor = Editor::from_tree(&tree);
        editor.set_caret(&target, 10).unwrap();
        b.iter(|| {
            editor.insert_break();
            editor.delete_backward();
        });
    });

    group.bench_function("scene_shortcut", |b| {
        b.iter_batched(
            || {
                let mut editor = Editor::from_tree(&tree);
                editor.set_caret(&target, 0).unwrap();
                editor.insert_break();
                editor
            },
            |mut editor| {
                editor.insert_text("## ");
                editor
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_loading, bench_typing);
criterion_main!(benches);
