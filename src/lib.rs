pub mod aggregate;
pub mod classifier;
pub mod compress;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod taxonomy;
pub mod trips;
pub mod zones;

pub use aggregate::OdMatrix;
pub use error::{OdError, Result};
pub use zones::ZoneRegistry;
