use thiserror::Error;

use crate::geometry::GeometryError;
use crate::texture::TextureError;

/// Anything that stops the aquarium from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
