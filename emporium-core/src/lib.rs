//! Core functionality for the emporium backend
//!
//! This crate holds the domain types ([`User`], [`Product`]), the error type
//! shared by every other crate, the repository traits storage backends
//! implement, and the services built on top of them.
//!
//! The two pieces with real logic in them are:
//!
//! - [`services::LoginThrottleService`], which locks an email after repeated
//!   failed logins, and
//! - [`query`] plus [`pagination`], which turn the `search`, `sort` and page
//!   parameters of the user listing into something a repository can run and
//!   then slice the result.
//!
//! Everything else is plumbing between the HTTP layer and a store.
pub mod clock;
pub mod crypto;
pub mod error;
pub mod id;
pub mod pagination;
pub mod product;
pub mod query;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod token;
pub mod user;
pub mod validation;

pub use error::Error;
pub use pagination::{PageParam, PageResult};
pub use product::{Product, ProductId};
pub use user::{User, UserId, UserSummary};
