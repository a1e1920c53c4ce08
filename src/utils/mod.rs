// Utility functions module
pub mod clock;
pub mod date_format;

// Re-export for easy access
pub use clock::*;
pub use date_format::*;
