//! Service layer for business logic
//!
//! This module contains concrete service implementations that encapsulate
//! login, user management and catalogue logic.

pub mod authentication;
pub mod login_throttle;
pub mod product;
pub mod user;

pub use authentication::{
    Authenticated, AuthenticationService, CredentialVerifier, PasswordCredentialVerifier,
};
pub use login_throttle::{Admission, Decision, LoginThrottleService, evaluate};
pub use product::ProductService;
pub use user::UserService;
