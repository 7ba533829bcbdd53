//! Auth session container.
//!
//! Holds who is logged in, mirrors that user into [`Storage`] under
//! [`SESSION_USER_KEY`], and publishes every change on a watch channel.
//!
//! ```text
//! anonymous --login ok------> authenticated
//! anonymous --register ok---> authenticated
//! authenticated --logout----> anonymous
//! ```

use crate::{
    core::{require_email, require_text, user},
    errors::{Error, Result},
    models::User,
    storage::{SESSION_USER_KEY, Storage, load_json, save_json},
    store::Store,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Who the session belongs to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    /// The logged-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}

/// Profile form contents. An empty `new_password` keeps the current password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// The current session.
#[derive(Debug)]
pub struct Session {
    store: Store,
    storage: Arc<dyn Storage>,
    state: watch::Sender<AuthState>,
}

impl Session {
    /// Restores the session persisted in `storage`.
    ///
    /// A stored value that does not decode is removed and the session starts
    /// anonymous.
    #[instrument(skip_all)]
    pub async fn restore(store: Store, storage: Arc<dyn Storage>) -> Result<Self> {
        let restored: Option<User> = load_json(storage.as_ref(), SESSION_USER_KEY).await?;
        let state = match restored {
            Some(user) => {
                info!("Restored session for {}", user.email);
                AuthState::Authenticated(user)
            }
            None => AuthState::Anonymous,
        };
        let (state, _) = watch::channel(state);
        Ok(Self {
            store,
            storage,
            state,
        })
    }

    /// Snapshot of the auth state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Authenticated(_))
    }

    /// Watches auth state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Logs in with an exact email/password match.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredentials` when no account matches.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let Some(user) = user::authenticate(&self.store, email, password).await else {
            warn!("Login failed for {}", email);
            return Err(Error::InvalidCredentials);
        };
        self.authenticate_as(user.clone()).await?;
        info!("{} logged in as {}", user.email, user.role);
        Ok(user)
    }

    /// Creates an account and logs into it.
    ///
    /// # Errors
    /// Returns `Error::EmailAlreadyRegistered` if the email is taken and
    /// `Error::Validation` for an empty name or password or a malformed email.
    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let user = user::register_user(&self.store, name, email, password).await?;
        self.authenticate_as(user.clone()).await?;
        Ok(user)
    }

    /// Ends the session.
    pub async fn logout(&self) -> Result<()> {
        self.storage.remove_item(SESSION_USER_KEY).await?;
        if let Some(user) = self.current_user() {
            info!("{} logged out", user.email);
        }
        self.state.send_replace(AuthState::Anonymous);
        Ok(())
    }

    /// Overwrites the session user's record with `updated`, in the dataset and in
    /// storage.
    ///
    /// # Errors
    /// Returns `Error::NotAuthenticated` when nobody is logged in and
    /// `Error::EmailAlreadyRegistered` when another account uses the new email.
    #[instrument(skip(self, updated), fields(user_id = %updated.id))]
    pub async fn update_user(&self, updated: User) -> Result<User> {
        if !self.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        let saved = user::save_user(&self.store, updated).await?;
        save_json(self.storage.as_ref(), SESSION_USER_KEY, &saved).await?;
        self.state
            .send_replace(AuthState::Authenticated(saved.clone()));
        Ok(saved)
    }

    /// Validates a profile form and applies it to the session user.
    ///
    /// # Errors
    /// Returns `Error::NotAuthenticated` when nobody is logged in,
    /// `Error::Validation` for an empty name, a malformed email or mismatched
    /// passwords, and `Error::EmailAlreadyRegistered` when the email belongs to
    /// another account.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        let mut user = self.current_user().ok_or(Error::NotAuthenticated)?;

        require_text("Name", &update.name)?;
        require_email(&update.email)?;
        if !update.new_password.is_empty() && update.new_password != update.confirm_password {
            return Err(Error::validation("Passwords do not match"));
        }

        user.name = update.name.trim().to_string();
        user.email = update.email.trim().to_string();
        if !update.new_password.is_empty() {
            user.password = update.new_password;
        }
        self.update_user(user).await
    }

    async fn authenticate_as(&self, user: User) -> Result<()> {
        save_json(self.storage.as_ref(), SESSION_USER_KEY, &user).await?;
        self.state.send_replace(AuthState::Authenticated(user));
        Ok(())
    }
}
