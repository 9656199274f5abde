//! Word Buffer (C2) append/backspace/project throughput across word
//! lengths, grounded in the teacher's `backspace_bench.rs` sizing (3-50
//! letters).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vi_ime_core::domain::logical_char::Base;
use vi_ime_core::domain::{LogicalChar, WordBuffer};

fn push_plain(buf: &mut WordBuffer, c: char) {
    let base = if "aeiouy".contains(c) {
        Base::Vowel(c)
    } else {
        Base::Consonant(c)
    };
    buf.append(LogicalChar::new(base, c, false));
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_append");
    for len in [3usize, 5, 10, 20, 50] {
        group.bench_with_input(BenchmarkId::new("append", len), &len, |b, &len| {
            let letters: Vec<char> = "aeioubcdhklmn".chars().cycle().take(len).collect();
            b.iter(|| {
                let mut buf = WordBuffer::new();
                for &c in &letters {
                    push_plain(&mut buf, black_box(c));
                }
                black_box(buf.current_word())
            });
        });
    }
    group.finish();
}

fn bench_backspace(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_backspace");
    for len in [3usize, 5, 10, 20, 50] {
        group.bench_with_input(BenchmarkId::new("backspace", len), &len, |b, &len| {
            let letters: Vec<char> = "aeioubcdhklmn".chars().cycle().take(len).collect();
            b.iter_batched(
                || {
                    let mut buf = WordBuffer::new();
                    for &c in &letters {
                        push_plain(&mut buf, c);
                    }
                    buf
                },
                |mut buf| {
                    while !buf.is_empty() {
                        black_box(buf.backspace());
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_project(c: &mut Criterion) {
    let mut buf = WordBuffer::new();
    for ch in "thuong".chars() {
        push_plain(&mut buf, ch);
    }
    c.bench_function("buffer_project_unicode", |b| {
        b.iter(|| black_box(buf.project_unicode()));
    });
}

criterion_group!(benches, bench_append, bench_backspace, bench_project);
criterion_main!(benches);
