use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::warn;

/// Error when loading the panorama shown through the portal.
#[derive(Debug, Error)]
pub enum PanoramaError {
    /// Image decoding failed.
    #[error("failed to decode panorama {path}: {source}")]
    Image {
        /// File that failed to decode.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },
    /// The file could not be opened.
    #[error("failed to read panorama {path}: {source}")]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Decoded image has no pixels.
    #[error("panorama {0} is empty")]
    Empty(PathBuf),
}

/// Decoded equirectangular image, RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanoramaTexture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixels (width × height × 4).
    pub pixels: Vec<u8>,
}

impl PanoramaTexture {
    /// Decode the image at `path`.
    pub fn load(path: &Path) -> Result<Self, PanoramaError> {
        let reader = ImageReader::open(path).map_err(|source| PanoramaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = reader.decode().map_err(|source| PanoramaError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(PanoramaError::Empty(path.to_path_buf()));
        }

        let texture = Self {
            width,
            height,
            pixels: rgba.into_raw(),
        };
        if !texture.is_equirectangular() {
            warn!(
                path = %path.display(),
                width,
                height,
                "panorama is not 2:1, interior will look stretched"
            );
        }
        Ok(texture)
    }

    /// Whether the image has the 2:1 aspect an equirectangular map needs.
    pub fn is_equirectangular(&self) -> bool {
        self.width == self.height * 2
    }
}

/// Load the panorama, degrading to an untextured interior on failure.
///
/// Particle simulation does not depend on the texture, so a missing or
/// corrupt file is logged and otherwise ignored.
pub fn load_or_untextured(path: &Path) -> Option<PanoramaTexture> {
    match PanoramaTexture::load(path) {
        Ok(texture) => Some(texture),
        Err(err) => {
            warn!("Rendering portal interior untextured: {err}");
            None
        }
    }
}
