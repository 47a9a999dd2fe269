//! Rendering error types.

use reflector_core::ReflectorError;
use thiserror::Error;

/// Errors that can occur in the wgpu backend.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// The requested reflection target exceeds the device limits.
    #[error("reflection target {width}x{height} exceeds the device limit of {max}")]
    TargetTooLarge { width: u32, height: u32, max: u32 },

    /// Texture creation failed.
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Reading a texture back to the CPU failed.
    #[error("failed to map readback buffer")]
    BufferMapFailed,

    /// Reflector setup failed.
    #[error(transparent)]
    Reflector(#[from] ReflectorError),
}

impl RenderError {
    /// Converts a target creation failure into the reflector's allocation
    /// error.
    pub fn into_allocation_error(self, width: u32, height: u32) -> ReflectorError {
        ReflectorError::AllocationFailed {
            width,
            height,
            reason: self.to_string(),
        }
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_error_keeps_reason() {
        let err = RenderError::TargetTooLarge {
            width: 9000,
            height: 16,
            max: 8192,
        }
        .into_allocation_error(9000, 16);

        match err {
            ReflectorError::AllocationFailed {
                width,
                height,
                reason,
            } => {
                assert_eq!((width, height), (9000, 16));
                assert!(reason.contains("8192"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
