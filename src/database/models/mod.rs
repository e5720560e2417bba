pub mod registration;
pub mod stats;
pub mod team;

// Re-export all models for easy importing
pub use registration::*;
pub use stats::*;
pub use team::*;
