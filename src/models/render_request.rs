use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Output formats the map server can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Bmp,
}

impl ImageFormat {
    /// Name sent in the `format` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// Codec used to encode an image of this format locally
    pub fn codec(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "bmp" => Ok(ImageFormat::Bmp),
            "" => Err(ClientError::InvalidInput("format is missing".to_string())),
            other => Err(ClientError::InvalidInput(format!(
                "unsupported format: {other}"
            ))),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One map render job, validated at construction and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    latitude: f64,
    longitude: f64,
    scale: u32,
    width: u32,
    height: u32,
    format: ImageFormat,
}

impl RenderRequest {
    /// Validate and build a request.
    ///
    /// `scale` is the denominator of the 1:N map scale; `width` and `height`
    /// are the output size in pixels.
    pub fn new(
        latitude: f64,
        longitude: f64,
        scale: u32,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> Result<Self, ClientError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ClientError::InvalidInput(format!(
                "latitude must be within [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ClientError::InvalidInput(format!(
                "longitude must be within [-180, 180], got {longitude}"
            )));
        }
        for (name, value) in [("scale", scale), ("width", width), ("height", height)] {
            if value == 0 {
                return Err(ClientError::InvalidInput(format!(
                    "{name} must be positive"
                )));
            }
        }

        Ok(Self {
            latitude,
            longitude,
            scale,
            width,
            height,
            format,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Query parameters of the submit call, in wire order
    pub fn query_pairs(&self) -> [(&'static str, String); 6] {
        [
            ("lat", self.latitude.to_string()),
            ("lon", self.longitude.to_string()),
            ("scale", self.scale.to_string()),
            ("w", self.width.to_string()),
            ("h", self.height.to_string()),
            ("format", self.format.as_str().to_string()),
        ]
    }
}
