//! Authentication: local password strategy, federated Google OAuth
//! strategy, password hashing, and session management.

pub mod google;
pub mod local;
pub mod password;
pub mod session;

pub use google::GoogleOauth;
pub use local::LocalAuthOutcome;
