//! Domain Value Objects

mod credential;

pub use credential::{Credential, SecretString};
