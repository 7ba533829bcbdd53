//! Account records.
//!
//! Credentials are compared as exact, case-sensitive strings. Email uniqueness is
//! only enforced at registration.

use crate::{
    core::{generate_id, require_email, require_text},
    errors::{Error, Result},
    models::{Role, User},
    store::{Store, StoreEvent},
};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Every registered account in dataset order.
pub async fn list_users(store: &Store) -> Vec<User> {
    store.read(|data| data.users.clone()).await
}

/// Finds an account by id.
pub async fn get_user(store: &Store, user_id: &str) -> Option<User> {
    store
        .read(|data| data.users.iter().find(|u| u.id == user_id).cloned())
        .await
}

/// Finds an account by exact email.
pub async fn find_user_by_email(store: &Store, email: &str) -> Option<User> {
    store
        .read(|data| data.users.iter().find(|u| u.email == email).cloned())
        .await
}

/// The account matching both `email` and `password` exactly.
#[instrument(skip(store, password))]
pub async fn authenticate(store: &Store, email: &str, password: &str) -> Option<User> {
    let user = store
        .read(|data| {
            data.users
                .iter()
                .find(|u| u.email == email && u.password == password)
                .cloned()
        })
        .await;
    debug!("Credential check for '{}': matched = {}", email, user.is_some());
    user
}

/// Creates a regular account.
///
/// The duplicate check and the insert happen under one write guard, so two
/// concurrent registrations with the same email cannot both succeed.
///
/// # Errors
/// Returns an error if:
/// - The name or password is empty, or the email has no `@`
/// - Any account already uses `email` (exact match)
#[instrument(skip(store, password))]
pub async fn register_user(store: &Store, name: &str, email: &str, password: &str) -> Result<User> {
    require_text("Name", name)?;
    require_email(email)?;
    require_text("Password", password)?;

    let user = User {
        id: generate_id("user"),
        name: name.trim().to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: Role::User,
        created_at: Utc::now(),
    };

    store
        .write(|data| {
            if data.users.iter().any(|u| u.email == email) {
                return Err(Error::EmailAlreadyRegistered {
                    email: email.to_string(),
                });
            }
            data.users.push(user.clone());
            Ok(())
        })
        .await?;

    info!("New user registered: {} ({})", user.id, user.email);
    store.publish(StoreEvent::UserRegistered {
        user_id: user.id.clone(),
    });
    Ok(user)
}

/// Overwrites the account with `user.id`, appending it if the dataset no longer
/// has it (for example a runtime registration restored after a restart).
///
/// # Errors
/// Returns `Error::EmailAlreadyRegistered` if another account already uses
/// `user.email`. The dataset is left unchanged.
#[instrument(skip(store, user), fields(user_id = %user.id))]
pub async fn save_user(store: &Store, user: User) -> Result<User> {
    let inserted = store
        .write(|data| {
            if data
                .users
                .iter()
                .any(|u| u.id != user.id && u.email == user.email)
            {
                return Err(Error::EmailAlreadyRegistered {
                    email: user.email.clone(),
                });
            }
            if let Some(existing) = data.users.iter_mut().find(|u| u.id == user.id) {
                *existing = user.clone();
                Ok(false)
            } else {
                data.users.push(user.clone());
                Ok(true)
            }
        })
        .await?;

    if inserted {
        info!("Re-added user {} missing from the dataset", user.id);
    } else {
        info!("Updated user {}", user.id);
    }
    store.publish(StoreEvent::UserUpdated {
        user_id: user.id.clone(),
    });
    Ok(user)
}

/// Changes an account's role.
///
/// # Errors
/// Returns `Error::UserNotFound` if no account has `user_id`.
#[instrument(skip(store))]
pub async fn set_user_role(store: &Store, user_id: &str, role: Role) -> Result<User> {
    let user = store
        .write(|data| {
            let user = data
                .users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| Error::UserNotFound {
                    id: user_id.to_string(),
                })?;
            user.role = role;
            Ok::<_, Error>(user.clone())
        })
        .await?;

    info!("User {} role set to {}", user_id, role);
    store.publish(StoreEvent::UserRoleChanged {
        user_id: user_id.to_string(),
        role,
    });
    Ok(user)
}
