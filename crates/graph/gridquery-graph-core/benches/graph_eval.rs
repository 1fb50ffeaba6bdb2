use criterion::{criterion_group, criterion_main, Criterion};
use std::rc::Rc;

use gridquery_api_core::{GridSource, SourceRef, VectorInt};
use gridquery_graph_core::runner::rasterise_scalar;
use gridquery_graph_core::{GraphBuilder, GraphDef, KernelRegistry};

fn dims(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn build_inputs(side: i64, depth: i64) -> (SourceRef, SourceRef) {
    let plane: Vec<f64> = (0..side * side).map(|i| i as f64).collect();
    let series: Vec<f64> = (0..depth * side * side).map(|i| (i % 97) as f64).collect();
    (
        Rc::new(GridSource::new(
            "elevation",
            VectorInt::of(&[side, side]),
            &dims(&["y", "x"]),
            plane,
        )),
        Rc::new(GridSource::new(
            "series",
            VectorInt::of(&[depth, side, side]),
            &dims(&["time", "y", "x"]),
            series,
        )),
    )
}

fn bench_scan(c: &mut Criterion) {
    let side = 64;
    let (elevation, series) = build_inputs(side, 8);
    let def: GraphDef = serde_json::from_str(
        r#"{
            "nodes": [
                { "id": "mean", "kind": "temporal_mean",
                  "inputs": { "input": { "layer": "series" } } },
                { "id": "sum", "kind": "add",
                  "inputs": {
                      "input_a": { "layer": "elevation" },
                      "input_b": { "node": "mean", "output": "output" }
                  } }
            ]
        }"#,
    )
    .expect("definition should parse");

    c.bench_function("scan_64x64_mean_add", |b| {
        b.iter(|| {
            let graph = GraphBuilder::new(KernelRegistry::with_builtins())
                .with_layer("elevation", elevation.clone())
                .with_layer("series", series.clone())
                .build(&def)
                .expect("graph should build");
            let socket = graph
                .output_socket("sum", "output")
                .expect("socket should resolve");
            rasterise_scalar(socket.as_ref(), &VectorInt::of(&[side, side]))
                .expect("scan should succeed")
        })
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
