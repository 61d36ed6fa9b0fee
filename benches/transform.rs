//! Benchmarks for the stylesheet transform.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use umbra::{Options, Preset};

/// Build a stylesheet that exercises every transform family.
fn sample_stylesheet(rules: usize) -> String {
    let mut css = String::new();
    for i in 0..rules {
        css.push_str(&format!(
            ".component-{i} {{\n  \
               background: alpha(#336699, 0.{});\n  \
               border: rem(1px) solid lighten(var(--umbra-color-gray-4), 0.1);\n  \
               padding: rem({}px) em({}px);\n  \
               @mixin hover {{\n    color: darken(#e9ecef, 0.2);\n  }}\n\
             }}\n",
            (i % 9) + 1,
            (i % 32) + 1,
            (i % 16) + 1,
        ));
    }
    css
}

fn bench_process(c: &mut Criterion) {
    let preset = Preset::new(Options::default()).unwrap();
    let css = sample_stylesheet(200);
    c.bench_function("process_200_rules", |b| {
        b.iter(|| preset.process(&css).unwrap());
    });
}

fn bench_process_untouched(c: &mut Criterion) {
    let preset = Preset::new(Options::default()).unwrap();
    // Already-transformed output: measures pure pass-through cost
    let css = preset.process(&sample_stylesheet(200)).unwrap();
    c.bench_function("process_untouched_200_rules", |b| {
        b.iter(|| preset.process(&css).unwrap());
    });
}

fn bench_rewrite_value(c: &mut Criterion) {
    let preset = Preset::new(Options::default()).unwrap();
    c.bench_function("rewrite_value", |b| {
        b.iter(|| {
            preset
                .rewrite_value("rem(1px) solid alpha(var(--umbra-color-gray-4), 0.1)")
                .unwrap()
        });
    });
}

fn bench_auto_rem(c: &mut Criterion) {
    let preset = Preset::new(Options::default().with_auto_rem(true)).unwrap();
    c.bench_function("auto_rem_value", |b| {
        b.iter(|| preset.rewrite_value("1px solid #000 16px 24px 32px").unwrap());
    });
}

criterion_group!(
    benches,
    bench_process,
    bench_process_untouched,
    bench_rewrite_value,
    bench_auto_rem
);
criterion_main!(benches);
