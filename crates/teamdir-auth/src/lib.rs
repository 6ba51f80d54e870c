//! # teamdir Auth
//!
//! Identity-claim intake.
//!
//! External authentication (the OAuth/OIDC exchange itself) is out of
//! scope; this crate picks up at the verified userinfo document. A
//! [`ClaimMapping`] binds configurable claim names to the fields the
//! store cares about, and [`PrincipalIntake`] upserts a [`Principal`]
//! from each login, refreshing email and group linkage every time.
//!
//! [`Principal`]: teamdir_store::Principal

pub mod claims;
pub mod config;
pub mod error;
pub mod intake;

pub use claims::{ClaimMapping, ClaimSet};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use intake::PrincipalIntake;
