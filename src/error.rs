use thiserror::Error;

/// Structural misuse of the grid/kernel API. Field values going out of
/// range (overflow, NaN) are data, never errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("coordinate ({x}, {y}) outside {width}x{height} grid")]
    OutOfRange {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    #[error("invalid {what}: {value}")]
    InvalidDimension { what: &'static str, value: i64 },

    #[error("{width}x{height} grid overflows the address space")]
    TooLarge { width: usize, height: usize },

    #[error("invalid {what}: {value}")]
    InvalidValue { what: &'static str, value: f32 },

    #[error("{what} only apply in convolution mode")]
    ModeMismatch { what: &'static str },

    #[error("kernel weights sum to zero, cannot normalize")]
    DegenerateKernel,
}
