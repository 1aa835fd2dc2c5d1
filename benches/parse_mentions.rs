use atlas_chat::core::mention::{extract_plain_text, parse_tool_mentions};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

fn make_message(n_mentions: usize, filler: &str) -> String {
    let mut message = String::new();
    for i in 0..n_mentions {
        message.push_str(filler);
        message.push_str(&format!(" @[Tool {i}](available_composio_tool{i}) "));
    }
    message.push_str(filler);
    message
}

fn bench_parse_mentions(c: &mut Criterion) {
    let filler = "please check the latest thread and summarize what changed since yesterday";

    for &mentions in &[4usize, 64usize] {
        let message = make_message(mentions, filler);

        let mut group = c.benchmark_group(format!("mentions{}", mentions));
        group.throughput(Throughput::Bytes(message.len() as u64));
        group.bench_function("parse", |b| {
            b.iter(|| parse_tool_mentions(std::hint::black_box(&message)))
        });
        group.bench_function("plain_text", |b| {
            b.iter(|| extract_plain_text(std::hint::black_box(&message)))
        });
        group.finish();
    }
}

criterion_group!(benches, bench_parse_mentions);
criterion_main!(benches);
