//! Error taxonomy for the card engine.
//!
//! Background failures never abort a render, they are logged and the
//! compositor falls back to the solid background. Only a malformed photo
//! fails a render outright.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("photo has invalid dimensions {width}x{height}")]
    #[diagnostic(
        code(newscard::invalid_source),
        help("photos must have a positive width and height")
    )]
    InvalidSource { width: u32, height: u32 },

    #[error("raster backend failed")]
    #[diagnostic(code(newscard::raster))]
    Raster(#[from] cairo::Error),

    #[error("layout profile is invalid")]
    #[diagnostic(code(newscard::profile))]
    Profile(#[from] ProfileError),
}

#[derive(Debug, Error, Diagnostic)]
pub enum AssetError {
    #[error("failed to fetch background")]
    #[diagnostic(code(newscard::asset::network))]
    Network(#[from] reqwest::Error),

    #[error("background server answered {status}")]
    #[diagnostic(code(newscard::asset::network))]
    Status { status: reqwest::StatusCode },

    #[error("failed to read background file")]
    #[diagnostic(code(newscard::asset::io))]
    Io(#[from] std::io::Error),

    #[error("background fetch timed out after {0:?}")]
    #[diagnostic(code(newscard::asset::timeout))]
    Timeout(std::time::Duration),

    #[error("background is not a valid image")]
    #[diagnostic(code(newscard::asset::decode))]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error, Diagnostic)]
pub enum DecodeError {
    #[error("failed to decode image")]
    #[diagnostic(code(newscard::decode))]
    Image(#[from] image::ImageError),

    #[error("image has invalid dimensions {width}x{height}")]
    #[diagnostic(code(newscard::decode::dimensions))]
    Dimensions { width: u32, height: u32 },
}

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("failed to encode card as png")]
    #[diagnostic(code(newscard::export::encode))]
    Encode(#[from] cairo::IoError),

    #[error("failed to write card")]
    #[diagnostic(code(newscard::export::io))]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, Diagnostic)]
pub enum UploadError {
    #[error("upload request failed")]
    #[diagnostic(code(newscard::upload::network))]
    Network(#[from] reqwest::Error),

    #[error("upload response did not contain a url")]
    #[diagnostic(code(newscard::upload::response))]
    MissingUrl,

    #[error("upload response contained an invalid url")]
    #[diagnostic(code(newscard::upload::response))]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile `{profile}`: canvas {width}x{height} is outside 1..=32767 per side")]
    #[diagnostic(code(newscard::profile::canvas))]
    CanvasSize {
        profile: String,
        width: i32,
        height: i32,
    },

    #[error("profile `{profile}`: {region} box lies outside the canvas")]
    #[diagnostic(
        code(newscard::profile::bounds),
        help("every box must have positive size and fit inside the canvas")
    )]
    OutOfBounds { profile: String, region: &'static str },

    #[error("profile `{profile}`: {reason}")]
    #[diagnostic(code(newscard::profile::typography))]
    Typography { profile: String, reason: String },

    #[error("no layout profile named `{0}`")]
    #[diagnostic(
        code(newscard::profile::unknown),
        help("run `newscard profiles` to list the available profiles")
    )]
    Unknown(String),
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file")]
    #[diagnostic(code(newscard::config::io))]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file")]
    #[diagnostic(code(newscard::config::parse))]
    Parse(#[from] serde_json::Error),

    #[error("config contains an invalid profile")]
    #[diagnostic(code(newscard::config::profile))]
    Profile(#[from] ProfileError),
}
