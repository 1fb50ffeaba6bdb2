//! gridquery-api-core: coordinate math and sampling contracts (engine-agnostic)

pub mod axes;
pub mod bounds;
pub mod element;
pub mod prototype;
pub mod sampling;
pub mod swizzle;
pub mod vector;

pub use bounds::BoxReal;
pub use element::{NumericType, Sample, SampleKind};
pub use prototype::Prototype;
pub use sampling::{Cell, GridSource, PixelSource, SourceError, SourceRef};
pub use swizzle::Swizzle;
pub use vector::{VectorInt, VectorReal, MAX_RANK};
