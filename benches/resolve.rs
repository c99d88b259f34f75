//! Benchmarks for object resolution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use graphwire::{vocab, Graph, Node, Resolver};

/// A chain of graphs, each merging the previous one.
fn chain(len: usize) -> (Graph, Node) {
    let mut g = Graph::new();
    let class = Node::Iri(vocab::term(vocab::CLASS_GRAPH));
    let mut prev: Option<Node> = None;
    for i in 0..len {
        let node = Node::iri(format!("https://example.org/g{i}")).unwrap();
        g.insert_spo(node.clone(), vocab::term(vocab::RDF_TYPE), class.clone());
        if let Some(p) = prev.take() {
            g.insert_spo(node.clone(), vocab::term(vocab::PROP_FROM_GRAPH), p);
        }
        prev = Some(node);
    }
    let last = prev.unwrap();
    (g, last)
}

fn bench_cached(c: &mut Criterion) {
    let (g, last) = chain(32);
    let mut resolver = Resolver::with_builtins();
    resolver.resolve_untyped(&g, &last).unwrap();

    c.bench_function("resolve_cached", |bench| {
        bench.iter(|| black_box(resolver.resolve_untyped(&g, &last).unwrap()))
    });
}

fn bench_fresh(c: &mut Criterion) {
    let (g, last) = chain(32);
    let mut resolver = Resolver::with_builtins();

    c.bench_function("resolve_chain_32", |bench| {
        bench.iter(|| {
            resolver.clear_cache();
            black_box(resolver.resolve_untyped(&g, &last).unwrap())
        })
    });
}

criterion_group!(benches, bench_cached, bench_fresh);
criterion_main!(benches);
