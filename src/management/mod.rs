mod auth;

pub use auth::CredentialSource;
pub use auth::TokenManager;
