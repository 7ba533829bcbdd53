//! Contact form messages.

use crate::{
    core::{generate_id, require_email, require_text},
    errors::{Error, Result},
    models::ContactMessage,
    store::{Store, StoreEvent},
};
use chrono::Utc;
use tracing::{info, instrument};

/// What a visitor fills in on the contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Stores a contact message as unread.
///
/// # Errors
/// Returns `Error::Validation` if any field is empty or the email has no `@`.
#[instrument(skip(store, form), fields(email = %form.email))]
pub async fn submit_contact_message(store: &Store, form: ContactForm) -> Result<ContactMessage> {
    require_text("Name", &form.name)?;
    require_email(&form.email)?;
    require_text("Subject", &form.subject)?;
    require_text("Message", &form.message)?;

    let message = ContactMessage {
        id: generate_id("msg"),
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        subject: form.subject.trim().to_string(),
        message: form.message,
        created_at: Utc::now(),
        is_read: false,
    };
    store
        .write(|data| data.contact_messages.push(message.clone()))
        .await;

    info!("Contact message {} received", message.id);
    store.publish(StoreEvent::ContactMessageReceived {
        message_id: message.id.clone(),
    });
    Ok(message)
}

/// Every message, newest first.
pub async fn list_contact_messages(store: &Store) -> Vec<ContactMessage> {
    let mut messages = store.read(|data| data.contact_messages.clone()).await;
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    messages
}

/// Marks a message as read.
///
/// # Errors
/// Returns `Error::MessageNotFound` if no message has `message_id`.
pub async fn mark_message_read(store: &Store, message_id: &str) -> Result<ContactMessage> {
    let message = store
        .write(|data| {
            let message = data
                .contact_messages
                .iter_mut()
                .find(|m| m.id == message_id)
                .ok_or_else(|| Error::MessageNotFound {
                    id: message_id.to_string(),
                })?;
            message.is_read = true;
            Ok::<_, Error>(message.clone())
        })
        .await?;

    store.publish(StoreEvent::ContactMessageRead {
        message_id: message_id.to_string(),
    });
    Ok(message)
}
