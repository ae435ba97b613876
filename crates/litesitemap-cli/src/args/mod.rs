//! Reusable argument groups.

pub mod output;

pub use output::{OutputArgs, OutputFormat};
