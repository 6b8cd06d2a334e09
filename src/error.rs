use thiserror::Error;

use crate::shape::ElementId;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A shape carries style or geometry values it cannot be painted with.
    #[error("invalid configuration for element {id}: {reason}")]
    Configuration { id: ElementId, reason: String },

    /// An animation or event refers to an element that is no longer in the scene.
    #[error("element {0} is not registered in the scene")]
    MissingTarget(ElementId),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("failed to allocate a {width}x{height} surface")]
    ResourceExhausted { width: u32, height: u32 },

    #[error("the engine has been disposed")]
    Disposed,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("image encoding failed: {0}")]
    Encode(String),
}
