//! # GCS Core
//!
//! Shared building blocks for Golomb-coded sets:
//! - Filter parameters and the serialized header
//! - The item-to-range hash mapper
//! - Error types
//! - Configuration and build statistics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    gcs-core                     │
//! ├─────────────────────────────────────────────────┤
//! │  • params  - (N, P) and the 8-byte header       │
//! │  • hash    - HashMapper + MD5 reference mapper  │
//! │  • error   - Error handling                     │
//! │  • config  - Build and logging defaults         │
//! │  • stats   - FilterInfo, size formatting        │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod hash;
pub mod params;
pub mod stats;

// Re-export commonly used types
pub use error::{Error, Result};
pub use hash::{HashMapper, Md5Mapper};
pub use params::{FilterParams, HEADER_SIZE};
pub use stats::FilterInfo;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
