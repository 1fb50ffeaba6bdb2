//! Linear-scan execution over a source's bounding box.
//!
//! Evaluation is pull-based and synchronous: each sampled coordinate may
//! recursively invoke upstream nodes. Hosts wanting tiled parallelism build
//! one graph per tile and scan each independently.

use gridquery_api_core::{PixelSource, Sample, SourceError, VectorInt};

/// Sample every pixel of `shape`, row-major, at pixel centres offset from
/// the source's minimum corner. The returned buffer is addressable with
/// [`VectorInt::to_pixel_index`].
pub fn rasterise(source: &dyn PixelSource, shape: &VectorInt) -> Result<Vec<Sample>, SourceError> {
    if shape.rank() != source.rank() {
        return Err(SourceError::Dimensionality {
            target: source.label(),
            expected: source.rank(),
            got: shape.rank(),
        });
    }
    let origin = source.bounds().min().clone();
    let total = shape.volume().max(0) as usize;
    let mut out = Vec::with_capacity(total);
    let mut co = VectorInt::zeros(shape.rank());
    for _ in 0..total {
        let mut real = co.to_real();
        real.add_scalar(0.5);
        real.add(&origin);
        out.push(source.sample(&real)?);
        co.incr(shape);
    }
    Ok(out)
}

/// Like [`rasterise`], flattening scalar samples into a plain buffer.
pub fn rasterise_scalar(
    source: &dyn PixelSource,
    shape: &VectorInt,
) -> Result<Vec<f64>, SourceError> {
    rasterise(source, shape)?
        .into_iter()
        .map(|sample| {
            sample.as_scalar().ok_or_else(|| SourceError::Read {
                target: source.label(),
                message: "expected a scalar source".to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::registry::KernelRegistry;
    use crate::types::GraphDef;
    use gridquery_api_core::{BoxReal, GridSource, SourceRef, VectorReal};
    use std::rc::Rc;

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn scans_a_grid_in_buffer_order() {
        let grid = GridSource::new(
            "g",
            VectorInt::of(&[2, 3]),
            &dims(&["y", "x"]),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        );
        let out = rasterise_scalar(&grid, &VectorInt::of(&[2, 3])).unwrap();
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn respects_a_shifted_origin() {
        let grid = GridSource::new("g", VectorInt::of(&[2]), &dims(&["x"]), vec![7.0, 8.0])
            .with_bounds(BoxReal::from_corners(
                VectorReal::of(&[100.0]),
                VectorReal::of(&[102.0]),
            ));
        let out = rasterise_scalar(&grid, &VectorInt::of(&[2])).unwrap();
        assert_eq!(out, vec![7.0, 8.0]);
    }

    #[test]
    fn scans_a_whole_graph() {
        let series: SourceRef = Rc::new(GridSource::new(
            "series",
            VectorInt::of(&[2, 2, 2]),
            &dims(&["time", "y", "x"]),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
        ));
        let def: GraphDef = serde_json::from_str(
            r#"{
                "nodes": [
                    { "id": "mean", "kind": "temporal_mean",
                      "inputs": { "input": { "layer": "series" } } }
                ]
            }"#,
        )
        .unwrap();
        let graph = GraphBuilder::new(KernelRegistry::with_builtins())
            .with_layer("series", series)
            .build(&def)
            .unwrap();
        let socket = graph.output_socket("mean", "output").unwrap();
        let out = rasterise_scalar(socket.as_ref(), &VectorInt::of(&[2, 2])).unwrap();
        assert_eq!(out, vec![2.0, 3.0, 4.0, 5.0]);
    }
}
