use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ui_probe::resolve::resolve;
use ui_probe::selector::TargetDescriptor;
use ui_probe::surface::{Element, MockSurface};

fn wide_board() -> MockSurface {
    let mut surface = MockSurface::new();
    for column in 0..10 {
        let section = surface.mutate(|tree| {
            tree.append(
                tree.root(),
                Element::new("section").class("column").id(format!("col-{column}")),
            )
        });
        for card in 0..50 {
            surface.mutate(|tree| {
                let node = tree.append(
                    section,
                    Element::new("div")
                        .class("card")
                        .id(format!("card-{column}-{card}"))
                        .text(format!("Task {column}-{card}")),
                );
                tree.set_attr(node, "data-column", format!("{column}"));
            });
        }
    }
    surface
}

fn benchmark_resolve(c: &mut Criterion) {
    let surface = wide_board();

    let first_wins = TargetDescriptor::parse(&["class*=column"]);
    c.bench_function("resolve_first_candidate", |b| {
        b.iter(|| {
            let resolution = resolve(black_box(&surface), black_box(&first_wins), None);
            assert!(!resolution.is_empty());
        })
    });

    let deep_text = TargetDescriptor::parse(&["text=Task 9-49"]);
    c.bench_function("resolve_text_last_card", |b| {
        b.iter(|| {
            let resolution = resolve(black_box(&surface), black_box(&deep_text), None);
            assert!(!resolution.is_empty());
        })
    });

    let fallback_chain = TargetDescriptor::parse(&[
        "text=No Such Column",
        "attr*=data-missing:x",
        "section.column #card-5-25",
    ]);
    c.bench_function("resolve_fallback_chain", |b| {
        b.iter(|| {
            let resolution = resolve(black_box(&surface), black_box(&fallback_chain), None);
            assert_eq!(resolution.winning_candidate, Some(2));
        })
    });
}

criterion_group!(benches, benchmark_resolve);
criterion_main!(benches);
