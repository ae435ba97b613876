//! Command implementations.

pub mod check;
pub mod make;

pub use check::CheckArgs;
pub use make::MakeArgs;
