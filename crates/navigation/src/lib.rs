//! `sca-navigation`
//!
//! Route table, navigation guard and router.
//!
//! Every navigable path carries static access metadata. Before each
//! navigation the guard evaluates it against the current session and either
//! allows the transition or redirects (login, role landing page).
//!
//! Nothing here performs IO: the session is passed in by the caller.

pub mod guard;
pub mod route;
pub mod router;
pub mod routes;

pub use guard::{GuardDecision, GuardState, NavigationGuard, NavigationTarget, RedirectReason};
pub use route::{ResolvedRoute, Route, RouteAccess, RouteDef, RouteTable, RouteTableError};
pub use router::{Location, NavigationError, NavigationOutcome, Redirect, Router};
pub use routes::{hospital_routes, landing_route_name};
