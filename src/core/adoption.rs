//! Adoption business logic - requests and their review.
//!
//! Submitting a request puts the pet on hold (`pending`). Review decisions can
//! cascade into the pet: approval marks it adopted, rejection releases it back to
//! `available` if it is still on hold. A request and its cascaded pet change are
//! written under one store guard, so either both land or neither does.

use crate::{
    core::{generate_id, pet::apply_pet_status, require_text},
    errors::{Error, Result},
    models::{AdoptionRequest, AdoptionStatus, PetStatus},
    store::{Dataset, Store, StoreEvent},
};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Every adoption request in dataset order.
pub async fn list_adoption_requests(store: &Store) -> Vec<AdoptionRequest> {
    store.read(|data| data.adoption_requests.clone()).await
}

/// A user's requests, most recent first. Requests created at the same instant keep
/// their dataset order.
pub async fn list_adoption_requests_for_user(store: &Store, user_id: &str) -> Vec<AdoptionRequest> {
    let mut requests: Vec<AdoptionRequest> = store
        .read(|data| {
            data.adoption_requests
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect()
        })
        .await;
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests
}

/// Finds a request by id.
pub async fn get_adoption_request(store: &Store, request_id: &str) -> Option<AdoptionRequest> {
    store
        .read(|data| {
            data.adoption_requests
                .iter()
                .find(|r| r.id == request_id)
                .cloned()
        })
        .await
}

/// Files a request to adopt an available pet and puts the pet on hold.
///
/// # Errors
/// Returns an error if:
/// - The reason is empty or whitespace-only
/// - The pet does not exist
/// - The pet is not available
#[instrument(skip(store, reason))]
pub async fn submit_adoption_request(
    store: &Store,
    user_id: &str,
    pet_id: &str,
    reason: &str,
) -> Result<AdoptionRequest> {
    require_text("Reason for adoption", reason)?;

    let request = store
        .write(|data| {
            let pet = data
                .pets
                .iter_mut()
                .find(|p| p.id == pet_id)
                .ok_or_else(|| Error::PetNotFound {
                    id: pet_id.to_string(),
                })?;
            if pet.status != PetStatus::Available {
                return Err(Error::PetUnavailable {
                    id: pet_id.to_string(),
                    status: pet.status,
                });
            }
            pet.status = PetStatus::Pending;

            let now = Utc::now();
            let request = AdoptionRequest {
                id: generate_id("ADO"),
                user_id: user_id.to_string(),
                pet_id: pet_id.to_string(),
                status: AdoptionStatus::Pending,
                request_reason: reason.trim().to_string(),
                created_at: now,
                updated_at: now,
            };
            data.adoption_requests.push(request.clone());
            Ok::<_, Error>(request)
        })
        .await?;

    info!(
        "User {} requested to adopt pet {} ({})",
        user_id, pet_id, request.id
    );
    store.publish(StoreEvent::AdoptionRequested {
        request_id: request.id.clone(),
        pet_id: pet_id.to_string(),
    });
    store.publish(StoreEvent::PetStatusChanged {
        pet_id: pet_id.to_string(),
        status: PetStatus::Pending,
    });
    Ok(request)
}

/// Sets a request's status and refreshes `updated_at`.
///
/// When `cascade_pet` names a pet, that pet follows the decision:
/// approved → adopted, rejected → available if currently pending (otherwise
/// untouched), pending → untouched. Approval does not check whether the pet was
/// adopted some other way in the meantime.
///
/// # Errors
/// Returns an error if:
/// - The request does not exist
/// - `cascade_pet` names a pet that does not exist; nothing is changed
#[instrument(skip(store))]
pub async fn set_adoption_status(
    store: &Store,
    request_id: &str,
    status: AdoptionStatus,
    cascade_pet: Option<&str>,
) -> Result<AdoptionRequest> {
    let (request, pet_change) = store
        .write(|data| apply_adoption_status(data, request_id, status, cascade_pet))
        .await?;

    info!("Adoption request {} set to {}", request_id, status);
    store.publish(StoreEvent::AdoptionStatusChanged {
        request_id: request_id.to_string(),
        status,
    });
    if let Some((pet_id, pet_status)) = pet_change {
        info!("Pet {} status updated to: {}", pet_id, pet_status);
        store.publish(StoreEvent::PetStatusChanged {
            pet_id,
            status: pet_status,
        });
    }
    Ok(request)
}

/// Approves a request and marks its pet adopted.
///
/// # Errors
/// Returns an error if the request or its pet does not exist.
pub async fn approve_adoption(store: &Store, request_id: &str) -> Result<AdoptionRequest> {
    review(store, request_id, AdoptionStatus::Approved).await
}

/// Rejects a request, releasing its pet if it was on hold.
///
/// # Errors
/// Returns an error if the request or its pet does not exist.
pub async fn reject_adoption(store: &Store, request_id: &str) -> Result<AdoptionRequest> {
    review(store, request_id, AdoptionStatus::Rejected).await
}

async fn review(store: &Store, request_id: &str, status: AdoptionStatus) -> Result<AdoptionRequest> {
    let pet_id = get_adoption_request(store, request_id)
        .await
        .ok_or_else(|| Error::AdoptionRequestNotFound {
            id: request_id.to_string(),
        })?
        .pet_id;
    set_adoption_status(store, request_id, status, Some(&pet_id)).await
}

type PetChange = Option<(String, PetStatus)>;

fn apply_adoption_status(
    data: &mut Dataset,
    request_id: &str,
    status: AdoptionStatus,
    cascade_pet: Option<&str>,
) -> Result<(AdoptionRequest, PetChange)> {
    let index = data
        .adoption_requests
        .iter()
        .position(|r| r.id == request_id)
        .ok_or_else(|| Error::AdoptionRequestNotFound {
            id: request_id.to_string(),
        })?;

    // Resolve the pet change before touching anything.
    let pet_change = match cascade_pet {
        Some(pet_id) => {
            let current = data
                .pets
                .iter()
                .find(|p| p.id == pet_id)
                .ok_or_else(|| Error::PetNotFound {
                    id: pet_id.to_string(),
                })?
                .status;
            cascaded_pet_status(status, current).map(|next| (pet_id.to_string(), next))
        }
        None => None,
    };

    if let Some((pet_id, next)) = &pet_change {
        apply_pet_status(data, pet_id, *next)?;
    }

    let request = &mut data.adoption_requests[index];
    request.status = status;
    request.updated_at = Utc::now();
    debug!("Adoption request {} now {:?}", request.id, request.status);
    Ok((request.clone(), pet_change))
}

const fn cascaded_pet_status(decision: AdoptionStatus, current: PetStatus) -> Option<PetStatus> {
    match (decision, current) {
        (AdoptionStatus::Approved, _) => Some(PetStatus::Adopted),
        (AdoptionStatus::Rejected, PetStatus::Pending) => Some(PetStatus::Available),
        _ => None,
    }
}
