pub mod error;
pub mod security_context;

pub use error::{CoreError, Result};
pub use error_location::ErrorLocation;
pub use security_context::{MAX_TENANT_ID_LENGTH, SecurityContext};

#[cfg(test)]
mod tests;
