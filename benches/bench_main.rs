#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minischeme::{builtins, evaluator, lexer, parser};

const SIMPLE: &str = "(+ 1 2)";
const NESTED: &str = "(if (> (* 5 2) 8) (+ (* 1 (/ 10 5)) (- 5 2)) 0)";
const FIB: &str = "(define fib (lambda (n)
  (cond ((= n 0) 0)
        ((= n 1) 1)
        (else (+ (fib (- n 1)) (fib (- n 2)))))))
(fib 13)";

fn bench_lexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Lexing");

    group.bench_function("Simple", |b| b.iter(|| lexer::lex(black_box(SIMPLE))));
    group.bench_function("Nested", |b| b.iter(|| lexer::lex(black_box(NESTED))));
    group.bench_function("Fib", |b| b.iter(|| lexer::lex(black_box(FIB))));

    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parsing");

    let simple = lexer::lex(SIMPLE).unwrap();
    let nested = lexer::lex(NESTED).unwrap();
    let fib = lexer::lex(FIB).unwrap();

    group.bench_function("Simple", |b| b.iter(|| parser::parse(black_box(&simple))));
    group.bench_function("Nested", |b| b.iter(|| parser::parse(black_box(&nested))));
    group.bench_function("Fib", |b| b.iter(|| parser::parse(black_box(&fib))));

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Evaluation");

    let env = builtins::default_env();
    let simple = parser::parse(&lexer::lex(SIMPLE).unwrap()).unwrap();
    let nested = parser::parse(&lexer::lex(NESTED).unwrap()).unwrap();
    let fib = parser::parse(&lexer::lex(FIB).unwrap()).unwrap();

    group.bench_function("Simple", |b| {
        b.iter(|| evaluator::eval(black_box(&simple[0]), &mut env.clone()))
    });

    group.bench_function("Nested", |b| {
        b.iter(|| evaluator::eval(black_box(&nested[0]), &mut env.clone()))
    });

    group.bench_function("Fib 13", |b| {
        b.iter(|| {
            let mut env = env.clone();
            for expr in &fib {
                evaluator::eval(black_box(expr), &mut env).unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_lexing, bench_parsing, bench_evaluation);
criterion_main!(benches);
