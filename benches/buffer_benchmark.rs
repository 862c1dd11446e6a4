use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scratchpad_calc::Session;

fn budget_buffer(lines: usize) -> Vec<String> {
    let mut buffer = vec!["# monthly budget".to_string(), "rate = 0.07".to_string(), "base = 1200".to_string()];
    for i in 0..lines {
        let line = match i % 5 {
            0 => format!("item_{i} = base * (1 + rate) ^ {}", i % 12),
            1 => format!("item_{} / 4 # quarterly", i - 1),
            2 => format!("sqrt(item_{}) + max({i}, 3, 9) * hours", i - 2),
            3 => String::new(),
            _ => format!("hex({i} * kb) "),
        };
        buffer.push(line);
    }
    buffer
}

fn evaluate_buffer_benchmark(c: &mut Criterion) {
    let buffer = budget_buffer(500);
    let mut session = Session::new();

    c.bench_function("evaluate 500 line buffer", |b| {
        b.iter(|| session.evaluate_buffer(black_box(&buffer)))
    });
}

criterion_group!(benches, evaluate_buffer_benchmark);
criterion_main!(benches);
