use criterion::{black_box, criterion_group, criterion_main, Criterion};
use bitpack::{AnyCodec, Codec, OverflowConfig, Variant};

fn bench_codecs(c: &mut Criterion) {
    // Mostly 4-bit values with a 1% tail of 20-bit outliers.
    let values: Vec<u32> = (0..64_000u32)
        .map(|i| if i % 100 == 0 { 999_999 - i } else { i % 16 })
        .collect();

    for variant in Variant::ALL {
        let mut group = c.benchmark_group(variant.as_str());
        let codec = AnyCodec::new(variant, OverflowConfig::default());
        let packed = codec.encode(&values).unwrap();

        group.bench_function("encode", |b| {
            b.iter(|| black_box(codec.encode(black_box(&values)).unwrap()))
        });

        group.bench_function("decode", |b| b.iter(|| black_box(packed.decode())));

        group.bench_function("get", |b| {
            b.iter(|| {
                for i in (0..values.len()).step_by(7) {
                    black_box(packed.get(i).unwrap());
                }
            })
        });

        group.finish();
    }
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
