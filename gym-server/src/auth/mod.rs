//! Authentication
//!
//! - [`SharedCredential`] - the operator login, argon2-hashed
//! - [`JwtService`] - token issue / validation
//! - [`RevokedTokens`] - logout revocation list
//! - [`require_auth`] - request gate for `/api/**`
//! - [`login_rate_limit`] - per-IP login throttle

pub mod credential;
pub mod jwt;
pub mod middleware;
pub mod rate_limit;
pub mod session;

pub use credential::SharedCredential;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use rate_limit::{RateLimiter, login_rate_limit};
pub use session::{CurrentSession, RevokedTokens};
