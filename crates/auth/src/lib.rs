//! `sca-auth`
//!
//! Pure authentication state and role-based authorization.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows the
//! closed set of roles, the permission policy, and what an authenticated
//! session looks like. Loading and persisting sessions happens elsewhere.

pub mod authorize;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{AuthorizationExplanation, AuthzError, DenialKind, authorize, explain_authorization};
pub use permissions::Permission;
pub use roles::Role;
pub use session::{Session, TokenPair};
pub use user::{RoleInfo, UserProfile};
