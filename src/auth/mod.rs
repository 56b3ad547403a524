//! Authentication: JWT service and request extractor

pub mod extractor;
pub mod jwt;

pub use extractor::{AUTH_TOKEN_HEADER, CurrentUser};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
