pub mod anchor;
pub mod error;
pub mod fonts;
pub mod picture;
pub mod renderer;
pub mod settings;
pub mod text;
pub mod transform;

pub use anchor::{Anchor, anchor_to_ratio, canonical_position, nearest_anchor};
pub use error::WatermarkError;
pub use fonts::FontLibrary;
pub use renderer::{WatermarkRenderer, composite_overlay, overlay_origin};
pub use settings::{
    ActiveWatermark, Color, ImageWatermark, TextWatermark, WatermarkKind, WatermarkLayout,
    WatermarkSettings,
};
