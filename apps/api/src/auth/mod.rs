// Credential service: signup/login/logout, opaque bearer tokens, and the `AuthUser` extractor.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod token;

pub use extractor::AuthUser;
