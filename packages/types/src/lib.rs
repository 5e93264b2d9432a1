//! Shared data model for xray-lens.
//!
//! These types cross every boundary of the workspace: the classification
//! backend speaks [`Prediction`], the resolver hands out [`CatalogRecord`]s and
//! the presentation layer renders them as hotspots over the source image.

pub mod image;
pub mod prediction;
pub mod record;

pub use image::{ImageInput, mime_for_file_name};
pub use prediction::{Prediction, PredictionResponse};
pub use record::{CatalogRecord, ComponentRecord, Position, SYNTHESIZED_ID_PREFIX};

pub use schemars::{JsonSchema, schema_for};
