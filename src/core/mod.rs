//! Geometry kernel: pure math shared by shapes, storage, the painter and the
//! hit tester.

pub mod bounds;
pub mod contain;
pub mod curve;
pub mod matrix;
pub mod path;
pub mod smooth;
pub mod text;
pub mod types;
pub mod vector;

pub use bounds::Rect;
pub use contain::{MIN_STROKE_HIT_WIDTH, stroke_hit_width};
pub use matrix::Matrix;
pub use path::{ArcSegment, DrawCommand, PathCommand, PathData};
pub use smooth::Smoothing;
pub use text::{TextAlign, TextBaseline, TextMetrics, measure_text, text_bounds};
pub use types::Viewport;
pub use vector::Vec2;
