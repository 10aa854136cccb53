//! Masking of sensitive configuration values

pub mod mask;

pub use mask::{mask_str, mask_value, MASK_MARKER};
