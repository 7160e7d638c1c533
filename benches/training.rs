use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use odia_bpe::{Trainer, TrainerConfig};

const WORDS: [&str; 8] = [
    "ଆମେ", "ଭାରତ", "ବାସୀ", "ଓଡ଼ିଶା", "ଭାଷା", "ସରକାର", "ପାଣି", "ଗାଁ",
];

fn build_corpus() -> Vec<String> {
    (0..512)
        .map(|line| {
            (0..16)
                .map(|word| WORDS[(line * 7 + word * 3) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_training(c: &mut Criterion) {
    let corpus = build_corpus();
    let total_chars: usize = corpus.iter().map(|text| text.chars().count()).sum();
    let cfg = TrainerConfig::builder()
        .target_vocab_size(400)
        .min_frequency(2)
        .show_progress(false)
        .build()
        .expect("configuration");

    let mut group = c.benchmark_group("train_odia_corpus");
    group.throughput(Throughput::Elements(total_chars as u64));
    group.sampling_mode(SamplingMode::Flat);
    group.bench_function(BenchmarkId::from_parameter("lines_512"), |b| {
        b.iter(|| {
            let trainer = Trainer::new(cfg.clone());
            let artifacts = trainer.train(&corpus).expect("training");
            let _ = black_box(artifacts);
        });
    });
    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let corpus = build_corpus();
    let cfg = TrainerConfig::builder()
        .target_vocab_size(400)
        .min_frequency(2)
        .show_progress(false)
        .build()
        .expect("configuration");
    let model = Trainer::new(cfg).train(&corpus).expect("training").model;

    let mut group = c.benchmark_group("encode_odia_corpus");
    group.bench_function("encode_batch", |b| {
        b.iter(|| black_box(model.encode_batch(&corpus)));
    });
    group.finish();
}

criterion_group!(benches, bench_training, bench_encoding);
criterion_main!(benches);
