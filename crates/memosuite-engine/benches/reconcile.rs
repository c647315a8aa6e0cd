use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use memosuite_engine::blocks::{EmbedKind, scan_blocks};
use memosuite_engine::embed::reconcile;

fn generate_memo(sections: usize) -> String {
    let mut content = String::new();
    for section in 0..sections {
        content.push_str(&format!("## Day {section}\n\nSome notes about the day.\n\n"));
        if section % 3 == 0 {
            content.push_str(&format!(
                "```fabric\n{{\"objects\":[{{\"top\":{section},\"height\":10}}]}}\n```\n\n"
            ));
        }
        if section % 5 == 0 {
            content.push_str("```rust\nfn example() {}\n```\n\n");
        }
    }
    content
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_blocks");
    group.sample_size(10);

    for sections in [10, 100, 1000] {
        let content = generate_memo(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &content, |b, content| {
            b.iter(|| std::hint::black_box(scan_blocks(std::hint::black_box(content))));
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    group.sample_size(10);

    let content = generate_memo(300);
    let last = scan_blocks(&content)
        .into_iter()
        .filter(|b| b.kind == EmbedKind::Fabric)
        .next_back()
        .map(|b| b.payload(&content).to_string());

    group.bench_function("exact_match_last_block", |b| {
        b.iter(|| {
            std::hint::black_box(reconcile(
                &content,
                EmbedKind::Fabric,
                "{\"objects\":[]}",
                last.as_deref(),
            ))
        });
    });

    group.bench_function("append", |b| {
        b.iter(|| {
            std::hint::black_box(reconcile(&content, EmbedKind::Spreadsheet, "[]", None))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_scan, bench_reconcile);
criterion_main!(benches);
