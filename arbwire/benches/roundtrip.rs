use criterion::{Criterion, black_box, criterion_group, criterion_main};

use arbexpr::{Expr, Parameter, Type};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn build_simple_expr() -> Expr {
    // x => x > 0 ? x * 2 : -x
    let x = Parameter::named(Type::i32(), "x");
    Expr::lambda(
        [x.clone()],
        Expr::condition(
            Expr::greater_than(Expr::parameter(&x), Expr::int(0)),
            Expr::multiply(Expr::parameter(&x), Expr::int(2)),
            Expr::negate(Expr::parameter(&x)),
        ),
    )
}

fn build_complex_expr() -> Expr {
    // Seeded so every run measures the same tree.
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);

    fn next_create(budget: usize, rng: &mut impl Rng, scope: &mut Vec<Parameter>) -> Expr {
        if budget == 0 || rng.random_bool(0.2) {
            if !scope.is_empty() && rng.random_bool(0.5) {
                let k = rng.random_range(0..scope.len());
                return Expr::parameter(&scope[k]);
            }
            return Expr::int(rng.random_range(-100..=100));
        }

        match rng.random_range(0..=5) {
            0 => {
                let left = next_create(budget - 1, rng, scope);
                let right = next_create(budget - 1, rng, scope);
                Expr::add(left, right)
            }
            1 => {
                let left = next_create(budget - 1, rng, scope);
                let right = next_create(budget - 1, rng, scope);
                Expr::multiply(left, right)
            }
            2 => {
                let left = next_create(budget - 1, rng, scope);
                let right = next_create(budget - 1, rng, scope);
                let if_true = next_create(budget - 1, rng, scope);
                let if_false = next_create(budget - 1, rng, scope);
                Expr::condition(Expr::less_than(left, right), if_true, if_false)
            }
            3 => Expr::negate(next_create(budget - 1, rng, scope)),
            4 => {
                // Block variable, shadowing whatever carries the same name.
                let name = ["a", "b", "x"][rng.random_range(0..3)];
                let local = Parameter::named(Type::i32(), name);
                let init = next_create(budget - 1, rng, scope);
                scope.push(local.clone());
                let body = next_create(budget - 1, rng, scope);
                scope.pop();
                Expr::block(
                    [local.clone()],
                    [Expr::assign(Expr::parameter(&local), init), body],
                )
            }
            5 => {
                let left = next_create(budget - 1, rng, scope);
                let right = next_create(budget - 1, rng, scope);
                Expr::subtract(left, right)
            }
            _ => unreachable!(),
        }
    }

    let params: Vec<_> = ["x", "y"]
        .into_iter()
        .map(|name| Parameter::named(Type::i32(), name))
        .collect();
    let mut scope = params.clone();
    let body = next_create(10, &mut rng, &mut scope);
    Expr::lambda(params, body)
}

fn bench_serialize(c: &mut Criterion) {
    let simple_expr = build_simple_expr();
    c.bench_function("serialize_simple", |b| {
        b.iter(|| {
            let _ = black_box(arbwire::serialize(&simple_expr));
        })
    });

    let complex_expr = build_complex_expr();
    c.bench_function("serialize_complex", |b| {
        b.iter(|| {
            let _ = black_box(arbwire::serialize(&complex_expr));
        })
    });
}

fn bench_deserialize(c: &mut Criterion) {
    let Ok(simple_wire) = arbwire::serialize(&build_simple_expr()) else {
        return;
    };
    c.bench_function("deserialize_simple", |b| {
        b.iter(|| {
            let _ = black_box(arbwire::deserialize(&simple_wire));
        })
    });

    let Ok(complex_wire) = arbwire::serialize(&build_complex_expr()) else {
        return;
    };
    c.bench_function("deserialize_complex", |b| {
        b.iter(|| {
            let _ = black_box(arbwire::deserialize(&complex_wire));
        })
    });
}

fn bench_text(c: &mut Criterion) {
    let complex_expr = build_complex_expr();
    let Ok(text) = arbwire::to_string(&complex_expr) else {
        return;
    };

    c.bench_function("to_string_complex", |b| {
        b.iter(|| {
            let _ = black_box(arbwire::to_string(&complex_expr));
        })
    });
    c.bench_function("from_str_complex", |b| {
        b.iter(|| {
            let _ = black_box(arbwire::from_str(&text));
        })
    });
}

criterion_group!(benches, bench_serialize, bench_deserialize, bench_text);
criterion_main!(benches);
