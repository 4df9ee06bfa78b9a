//! Common types shared by the OGC web service crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod label;
pub mod layer;
pub mod map;
pub mod metadata;
pub mod style;

pub use bbox::BoundingBox;
pub use crs::{CrsCode, Projection};
pub use error::{OwsError, OwsResult};
pub use label::{Label, LabelBinding, LabelProperty, PropertyValue};
pub use layer::{Layer, LayerType};
pub use map::MapConfig;
pub use metadata::Metadata;
pub use style::{Color, LabelStyle};
