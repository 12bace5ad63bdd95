pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod roles;
pub mod signer;
pub mod verifier;

pub use claims::Claims;
pub use config::TokenConfig;
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use guards::{ensure_role, GuardError};
pub use roles::{Role, UnknownRole};
pub use signer::{IssuedToken, TokenSigner};
pub use verifier::TokenVerifier;
