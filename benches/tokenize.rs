use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use jsonsel::Options;
use serde_json::Value;
use std::fmt::Write as _;
use std::hint::black_box;

/// Builds an array of `count` scene nodes, each with a name, a transform
/// and a few tags.
fn scene(count: usize) -> String {
    let mut text = String::from("[");
    for i in 0..count {
        if i > 0 {
            text.push(',');
        }
        write!(
            text,
            r#"{{"name": "node \"{i}\"", "visible": {}, "translation": [{i}.5, -{i}, 1e-3], "mesh": {i}, "tags": ["a", "b\tc"]}}"#,
            i % 2 == 0
        )
        .unwrap();
    }
    text.push(']');
    text
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tokenize");
    for count in [100, 10_000] {
        let text = scene(count);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("borrowed", count), &text, |b, text| {
            b.iter(|| jsonsel::parse_borrowed(black_box(text), Options::empty()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("everything", count), &text, |b, text| {
            let options = Options::PARSE_LITERALS | Options::PARSE_DOUBLES | Options::PARSE_STRINGS;
            b.iter(|| jsonsel::parse_borrowed(black_box(text), options).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("serde_json", count), &text, |b, text| {
            b.iter(|| serde_json::from_str::<Value>(black_box(text)).unwrap());
        });
    }
    group.finish();
}

fn bench_selective(c: &mut Criterion) {
    let text = scene(10_000);
    let mut group = c.benchmark_group("Selective");

    // only the mesh references of each node get parsed
    group.bench_function("mesh indices", |b| {
        b.iter(|| {
            let document = jsonsel::parse_borrowed(black_box(&text), Options::PARSE_STRING_KEYS).unwrap();
            document
                .root()
                .as_array()
                .map(|node| node.value().expect_key("mesh").parse_u32().unwrap())
                .sum::<u32>()
        });
    });

    group.bench_function("repeated parse", |b| {
        let mut document = jsonsel::parse(&text, Options::PARSE_DOUBLES).unwrap();
        b.iter(|| document.parse_doubles(black_box(0)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_selective);
criterion_main!(benches);
