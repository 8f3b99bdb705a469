//! Branded news card rendering.
//!
//! A card is a background template, a date stamp, an optional cover-fitted
//! photo and a headline that is wrapped and shrunk until it fits its box.
//! Geometry and typography for each card variant live in a
//! [`LayoutProfile`](profile::LayoutProfile); [`compose::Compositor`] ties
//! background fetching, layout and rasterization together.

pub mod asset;
pub mod canvas;
pub mod compose;
pub mod config;
pub mod cover;
pub mod error;
pub mod export;
pub mod fit;
pub mod geometry;
pub mod measure;
pub mod profile;
pub mod wrap;
