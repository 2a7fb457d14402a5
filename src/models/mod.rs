mod user;

pub use user::{User, FEDERATED_PASSWORD_SENTINEL};
