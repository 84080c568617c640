//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::errors::CacheError;
pub use crate::manager::CacheManager;
pub use crate::params::CacheParams;

// Re-export centralized config
pub use config::CacheConfig;
