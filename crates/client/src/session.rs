//! Session lifecycle: login, profile loading, logout and persistence.
//!
//! [`SessionHandle`] owns the in-memory [`Session`] and mirrors every change
//! into [`LocalStorage`]; the HTTP adapter and [`SessionStore`] share it.
//! [`SessionStore`] drives the login flow on top of [`AuthService`].

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{info, warn};

use sca_auth::{Permission, Role, Session, TokenPair, UserProfile};

use crate::error::{ApiError, ApiErrorKind};
use crate::services::auth::AuthService;
use crate::storage::{LocalStorage, StorageError};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Shared, persisted session state.
///
/// The `RwLock` is never held across an await. Writers queue on `writes`,
/// update memory, then write the snapshot to storage, so storage always ends
/// at the last in-memory state. Storage failures are logged and do not undo
/// the in-memory change.
#[derive(Debug)]
pub struct SessionHandle {
    state: RwLock<Session>,
    writes: tokio::sync::Mutex<()>,
    storage: LocalStorage,
}

impl SessionHandle {
    /// Rebuild the session from storage.
    ///
    /// A `user` value that no longer parses is dropped (and removed) with a warning.
    pub async fn rehydrate(storage: LocalStorage) -> Result<Self, StorageError> {
        let access_token = storage.get(ACCESS_TOKEN_KEY).await?;
        let refresh_token = storage.get(REFRESH_TOKEN_KEY).await?;
        let user = match storage.get(USER_KEY).await? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, "discarding unreadable persisted user profile");
                    storage.remove(USER_KEY).await?;
                    None
                }
            },
            None => None,
        };

        let session = Session {
            access_token,
            refresh_token,
            user,
        };
        info!(
            authenticated = session.is_authenticated(),
            user = session.username(),
            "session rehydrated"
        );

        Ok(Self {
            state: RwLock::new(session),
            writes: tokio::sync::Mutex::new(()),
            storage,
        })
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub async fn set_tokens(&self, tokens: TokenPair) {
        self.update(|s| s.set_tokens(tokens)).await;
    }

    pub async fn set_access_token(&self, access: String) {
        self.update(|s| s.access_token = Some(access)).await;
    }

    pub async fn set_user(&self, user: UserProfile) {
        self.update(|s| s.user = Some(user)).await;
    }

    /// Swap the whole session in one step.
    pub async fn replace(&self, session: Session) {
        self.update(|s| *s = session).await;
    }

    /// Drop tokens and profile, in memory and in storage.
    pub async fn clear(&self) {
        self.update(Session::clear).await;
    }

    /// Drop only the access token. Returns whether one was present.
    pub async fn clear_access_token(&self) -> bool {
        let _queued = self.writes.lock().await;
        let snapshot = {
            let mut state = self.write();
            state.access_token.take().map(|_| state.clone())
        };
        match snapshot {
            Some(snapshot) => {
                self.persist(&snapshot).await;
                true
            }
            None => false,
        }
    }

    async fn update(&self, mutate: impl FnOnce(&mut Session)) {
        let _queued = self.writes.lock().await;
        let snapshot = {
            let mut state = self.write();
            mutate(&mut *state);
            state.clone()
        };
        self.persist(&snapshot).await;
    }

    async fn persist(&self, session: &Session) {
        let user = match session.user.as_ref().map(serde_json::to_string).transpose() {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "could not serialize user profile; not persisting it");
                None
            }
        };

        let writes = [
            (ACCESS_TOKEN_KEY, session.access_token.as_deref()),
            (REFRESH_TOKEN_KEY, session.refresh_token.as_deref()),
            (USER_KEY, user.as_deref()),
        ];
        for (key, value) in writes {
            if let Err(err) = self.storage.put(key, value).await {
                warn!(key, error = %err, "failed to persist session value");
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Why a profile could not be loaded.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("The user has no role assigned. Contact the administrator.")]
    MissingRole,

    #[error("The role '{0}' is not recognized. Contact the administrator.")]
    UnknownRole(String),

    /// The server explained the failure (`detail`).
    #[error("{detail}")]
    Rejected { detail: String, source: ApiError },

    #[error("Could not load the user profile. Please try again.")]
    Unavailable(#[source] ApiError),
}

/// Why a login attempt failed; the display text is meant for the user.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Server error. Please try again later")]
    ServerFault,

    #[error("{0}")]
    Rejected(String),

    #[error("Could not connect to the server. Check your network connection")]
    Unreachable,

    #[error("The server did not return the access and refresh tokens")]
    IncompleteTokens,

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("{0}")]
    Unexpected(String),
}

impl LoginError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    fn from_token_error(err: ApiError) -> Self {
        match &err {
            ApiError::Status { status: 401, .. } => LoginError::InvalidCredentials,
            ApiError::Status { status: 400, .. } => LoginError::InvalidRequest(
                err.detail().unwrap_or("Invalid login data").to_string(),
            ),
            ApiError::Status { status: 500..=599, .. } => LoginError::ServerFault,
            ApiError::Status { status, reason, .. } => LoginError::Rejected(
                err.detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Error {status}: {reason}")),
            ),
            ApiError::Network(_) => LoginError::Unreachable,
            ApiError::ClientConfig(_) | ApiError::Decode(_) => {
                let text = err.to_string();
                if text.trim().is_empty() {
                    LoginError::Unexpected("Unexpected error while signing in".to_string())
                } else {
                    LoginError::Unexpected(text)
                }
            }
        }
    }
}

/// Authentication state plus the operations that change it.
#[derive(Debug, Clone)]
pub struct SessionStore {
    handle: Arc<SessionHandle>,
    auth: AuthService,
}

impl SessionStore {
    pub fn new(handle: Arc<SessionHandle>, auth: AuthService) -> Self {
        Self { handle, auth }
    }

    pub fn handle(&self) -> &Arc<SessionHandle> {
        &self.handle
    }

    /// Current session state; predicates are derived from it on every call.
    pub fn session(&self) -> Session {
        self.handle.snapshot()
    }

    /// Exchange credentials for tokens, then load the profile.
    ///
    /// Either the session ends up fully authenticated, or it is empty again.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, LoginError> {
        info!(username, "signing in");
        match self.try_login(username, password).await {
            Ok(user) => {
                info!(username = %user.username, role = ?user.role(), "signed in");
                Ok(user)
            }
            Err(err) => {
                self.handle.clear().await;
                warn!(username, error = %err, "sign-in failed");
                Err(err)
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<UserProfile, LoginError> {
        let response = self
            .auth
            .obtain_token(username, password)
            .await
            .map_err(LoginError::from_token_error)?;

        let tokens = response.into_pair().ok_or(LoginError::IncompleteTokens)?;
        // A previous profile must not pair with the new tokens while /me is pending.
        self.handle
            .replace(Session {
                access_token: Some(tokens.access),
                refresh_token: Some(tokens.refresh),
                user: None,
            })
            .await;

        Ok(self.fetch_user_info().await?)
    }

    /// Load the profile of the token holder.
    ///
    /// Any failure, including a profile without a recognized role, clears the
    /// whole session.
    pub async fn fetch_user_info(&self) -> Result<UserProfile, ProfileError> {
        let result = self.auth.current_user().await;

        let outcome = match result {
            Ok(user) => match user.role_name() {
                None => Err(ProfileError::MissingRole),
                Some(name) if Role::from_wire(name).is_none() => {
                    Err(ProfileError::UnknownRole(name.to_string()))
                }
                Some(_) => Ok(user),
            },
            Err(err) => match err.detail().map(str::to_string) {
                Some(detail) => Err(ProfileError::Rejected { detail, source: err }),
                None => Err(ProfileError::Unavailable(err)),
            },
        };

        match outcome {
            Ok(user) => {
                self.handle.set_user(user.clone()).await;
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "profile unavailable; clearing session");
                self.handle.clear().await;
                Err(err)
            }
        }
    }

    /// Forget tokens and profile. No network call; idempotent.
    pub async fn logout(&self) {
        let was = self.handle.snapshot().username().map(str::to_string);
        self.handle.clear().await;
        info!(user = was.as_deref(), "signed out");
    }

    /// Trade the stored refresh token for a new access token.
    ///
    /// Returns `Ok(false)` when there is no refresh token to use.
    pub async fn refresh_access_token(&self) -> Result<bool, ApiError> {
        let Some(refresh) = self.handle.refresh_token() else {
            return Ok(false);
        };

        let response = self.auth.refresh_token(&refresh).await?;
        match response.access {
            Some(access) => {
                match response.refresh {
                    Some(rotated) => {
                        self.handle
                            .set_tokens(TokenPair {
                                access,
                                refresh: rotated,
                            })
                            .await
                    }
                    None => self.handle.set_access_token(access).await,
                }
                info!("access token refreshed");
                Ok(true)
            }
            None => Err(ApiError::Decode(
                "refresh response is missing the access token".to_string(),
            )),
        }
    }

    /// Ask the server whether the stored access token is still valid.
    pub async fn verify_access_token(&self) -> Result<bool, ApiError> {
        let Some(access) = self.handle.access_token() else {
            return Ok(false);
        };
        match self.auth.verify_token(&access).await {
            Ok(()) => Ok(true),
            Err(err)
                if matches!(
                    err.kind(),
                    ApiErrorKind::Unauthorized | ApiErrorKind::ValidationRejected
                ) =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn role(&self) -> Option<Role> {
        self.session().role()
    }

    pub fn is_admin(&self) -> bool {
        self.session().is_admin()
    }

    pub fn is_technician(&self) -> bool {
        self.session().is_technician()
    }

    pub fn is_department_head(&self) -> bool {
        self.session().is_department_head()
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.session().can(permission)
    }

    pub fn can_print_labels(&self) -> bool {
        self.can(Permission::PrintLabels)
    }

    pub fn can_manage_assets(&self) -> bool {
        self.can(Permission::ManageAssets)
    }

    pub fn can_delete_assets(&self) -> bool {
        self.can(Permission::DeleteAssets)
    }

    pub fn can_move_assets(&self) -> bool {
        self.can(Permission::MoveAssets)
    }

    pub fn can_manage_users(&self) -> bool {
        self.can(Permission::ManageUsers)
    }

    pub fn can_view_audit(&self) -> bool {
        self.can(Permission::ViewAudit)
    }
}
