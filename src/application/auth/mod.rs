mod auth_service;
mod errors;
mod token;

pub use auth_service::{AuthDependencies, current_user, hash_password, login, register, verify_password};
pub use errors::{AuthError, Result};
pub use token::{AccessToken, Claims, TOKEN_LIFETIME_HOURS, TokenIssuer};
