//! Router: resolves paths, runs the guard and follows its redirects.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use sca_auth::Session;

use crate::guard::{GuardDecision, GuardState, NavigationGuard, NavigationTarget, RedirectReason};
use crate::route::{RouteTable, RouteTableError};
use crate::routes::landing_route_name;

const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(String),

    #[error("unknown route name '{0}'")]
    UnknownRoute(String),

    #[error("route '{0}' is missing parameters")]
    MissingParams(&'static str),

    #[error("redirect loop while navigating to '{path}' ({hops} hops)")]
    RedirectLoop { path: String, hops: usize },
}

/// Where the router currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub route: &'static str,
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

impl Location {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    pub reason: RedirectReason,
}

/// Result of one navigation, after every redirect has been followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationOutcome {
    pub requested: String,
    pub location: Location,
    pub title: String,
    pub redirects: Vec<Redirect>,
    /// Denial notices, announced in the order they were raised.
    pub notices: Vec<String>,
}

impl NavigationOutcome {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }

    pub fn is_at(&self, route: &str) -> bool {
        self.location.route == route
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
    state: GuardState,
    current: Option<Location>,
    title: String,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        let guard = NavigationGuard::new();
        let title = crate::guard::APP_NAME.to_string();
        Self {
            table,
            guard,
            state: GuardState::Allowed,
            current: None,
            title,
        }
    }

    pub fn hospital() -> Result<Self, RouteTableError> {
        Ok(Self::new(RouteTable::hospital()?))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Navigate to a concrete path, following guard redirects.
    ///
    /// The router's location only changes when the navigation settles on an
    /// allowed route.
    pub fn navigate(&mut self, path: &str, session: &Session) -> Result<NavigationOutcome, NavigationError> {
        let requested = path.to_string();
        let mut next = requested.clone();
        let mut redirects = Vec::new();
        let mut notices = Vec::new();

        loop {
            self.state = GuardState::Evaluating;
            let Some(resolved) = self.table.resolve(&next) else {
                self.state = GuardState::Allowed;
                return Err(NavigationError::NotFound(next));
            };

            let title = self.guard.page_title(resolved.route);
            let decision = self.guard.evaluate(&resolved, session);
            self.state = decision.state();

            match decision {
                GuardDecision::Allow => {
                    let location = Location {
                        route: resolved.route.name,
                        path: resolved.full_path,
                        params: resolved.params,
                        query: resolved.query,
                    };
                    debug!(route = location.route, path = %location.path, "navigation allowed");
                    self.current = Some(location.clone());
                    self.title = title.clone();
                    return Ok(NavigationOutcome {
                        requested,
                        location,
                        title,
                        redirects,
                        notices,
                    });
                }
                GuardDecision::Redirect { to, reason, notice } => {
                    let target = self.target_path(&to)?;
                    info!(from = %next, to = %target, ?reason, "navigation redirected");
                    if let Some(notice) = notice {
                        notices.push(notice);
                    }
                    redirects.push(Redirect {
                        from: std::mem::replace(&mut next, target.clone()),
                        to: target,
                        reason,
                    });
                    if redirects.len() > MAX_REDIRECTS {
                        return Err(NavigationError::RedirectLoop {
                            path: requested,
                            hops: redirects.len(),
                        });
                    }
                }
            }
        }
    }

    /// Navigate to a route by name.
    pub fn navigate_to(
        &mut self,
        route: &str,
        params: &BTreeMap<String, String>,
        session: &Session,
    ) -> Result<NavigationOutcome, NavigationError> {
        let path = self.href(route, params)?;
        self.navigate(&path, session)
    }

    pub fn href(&self, route: &str, params: &BTreeMap<String, String>) -> Result<String, NavigationError> {
        let found = self
            .table
            .get(route)
            .ok_or_else(|| NavigationError::UnknownRoute(route.to_string()))?;
        found.href(params).ok_or(NavigationError::MissingParams(found.name))
    }

    /// Where to go after a successful login.
    ///
    /// A `redirect` return path wins when it is a local absolute path;
    /// otherwise the user lands on their role's landing route.
    pub fn post_login_target(&self, session: &Session, redirect: Option<&str>) -> String {
        if let Some(path) = redirect.filter(|p| p.starts_with('/') && !p.starts_with("//")) {
            if self.table.resolve(path).is_some() {
                return path.to_string();
            }
        }
        let landing = landing_route_name(session.role());
        self.table
            .get(landing)
            .map(|r| r.path.to_string())
            .unwrap_or_else(|| "/".to_string())
    }

    fn target_path(&self, target: &NavigationTarget) -> Result<String, NavigationError> {
        let path = self.href(target.route, &BTreeMap::new())?;
        Ok(target.href(&path))
    }
}
