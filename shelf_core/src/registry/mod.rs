pub mod error;
pub mod manager;
pub mod models;
pub mod validation;

pub use error::RegistryError;
pub use manager::{DocumentRegistry, RegistryConfig};
pub use models::{DocumentEntry, ResolvedDocument};
pub use validation::{sanitize, DocumentValidator};
