//! Pet business logic - listings, lookups and status changes.
//!
//! Status changes driven by the adoption workflow live in
//! [`adoption`](crate::core::adoption); this module only exposes the primitive
//! status write used by admins and by that workflow.

use crate::{
    core::{generate_id, require_price, require_text},
    errors::{Error, Result},
    models::{Pet, PetCategory, PetStatus},
    store::{Dataset, Store, StoreEvent},
};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Details for a pet added by an admin.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPet {
    pub name: String,
    pub category: PetCategory,
    pub breed: String,
    /// Age in months
    pub age: u32,
    pub price: f64,
    pub description: String,
    pub image_url: String,
}

/// Every pet in dataset order.
pub async fn list_pets(store: &Store) -> Vec<Pet> {
    store.read(|data| data.pets.clone()).await
}

/// Finds a pet by id.
pub async fn get_pet(store: &Store, pet_id: &str) -> Option<Pet> {
    let pet = store
        .read(|data| data.pets.iter().find(|p| p.id == pet_id).cloned())
        .await;
    debug!("Pet lookup '{}': found = {}", pet_id, pet.is_some());
    pet
}

/// Pets in one category, or all pets for `None`.
pub async fn list_pets_by_category(store: &Store, category: Option<PetCategory>) -> Vec<Pet> {
    store
        .read(|data| {
            data.pets
                .iter()
                .filter(|p| category.is_none_or(|c| p.category == c))
                .cloned()
                .collect()
        })
        .await
}

/// The first `count` pets, as shown on the landing page.
pub async fn featured_pets(store: &Store, count: usize) -> Vec<Pet> {
    store
        .read(|data| data.pets.iter().take(count).cloned().collect())
        .await
}

/// Sets a pet's status, returning the updated record.
///
/// # Errors
/// Returns `Error::PetNotFound` if no pet has `pet_id`.
#[instrument(skip(store))]
pub async fn set_pet_status(store: &Store, pet_id: &str, status: PetStatus) -> Result<Pet> {
    let pet = store
        .write(|data| apply_pet_status(data, pet_id, status))
        .await?;
    info!("Pet {} status updated to: {}", pet_id, status);
    store.publish(StoreEvent::PetStatusChanged {
        pet_id: pet_id.to_string(),
        status,
    });
    Ok(pet)
}

/// Status write shared with the adoption workflow, which needs it under its own
/// write guard.
pub(crate) fn apply_pet_status(data: &mut Dataset, pet_id: &str, status: PetStatus) -> Result<Pet> {
    let pet = data
        .pets
        .iter_mut()
        .find(|p| p.id == pet_id)
        .ok_or_else(|| Error::PetNotFound {
            id: pet_id.to_string(),
        })?;
    pet.status = status;
    Ok(pet.clone())
}

/// Adds a new, available pet.
///
/// # Errors
/// Returns an error if:
/// - The name or breed is empty or whitespace-only
/// - The price is negative or not finite
#[instrument(skip(store))]
pub async fn add_pet(store: &Store, new_pet: NewPet) -> Result<Pet> {
    require_text("Pet name", &new_pet.name)?;
    require_text("Breed", &new_pet.breed)?;
    require_price(new_pet.price)?;

    let pet = Pet {
        id: generate_id("pet"),
        name: new_pet.name.trim().to_string(),
        category: new_pet.category,
        breed: new_pet.breed.trim().to_string(),
        age: new_pet.age,
        price: new_pet.price,
        description: new_pet.description,
        image_url: new_pet.image_url,
        status: PetStatus::Available,
        added_at: Utc::now(),
    };
    store.write(|data| data.pets.push(pet.clone())).await;

    info!("Added pet '{}' (ID: {})", pet.name, pet.id);
    store.publish(StoreEvent::PetAdded {
        pet_id: pet.id.clone(),
    });
    Ok(pet)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_list_and_get_pet() -> Result<()> {
        let store = setup_test_store()?;

        let pets = list_pets(&store).await;
        assert!(!pets.is_empty());

        let first = get_pet(&store, &pets[0].id).await;
        assert_eq!(first.as_ref(), Some(&pets[0]));

        assert!(get_pet(&store, "no-such-pet").await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_pet_status_updates_shared_copy() -> Result<()> {
        let store = setup_test_store()?;

        let updated = set_pet_status(&store, "pet1", PetStatus::Pending).await?;
        assert_eq!(updated.status, PetStatus::Pending);

        let reread = get_pet(&store, "pet1").await.unwrap();
        assert_eq!(reread.status, PetStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_pet_status_not_found() -> Result<()> {
        let store = setup_test_store()?;

        let result = set_pet_status(&store, "missing", PetStatus::Adopted).await;
        assert!(matches!(result, Err(Error::PetNotFound { id }) if id == "missing"));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_pet_status_publishes_event() -> Result<()> {
        let store = setup_test_store()?;
        let mut events = store.subscribe();

        set_pet_status(&store, "pet1", PetStatus::Adopted).await?;

        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::PetStatusChanged {
                pet_id: "pet1".to_string(),
                status: PetStatus::Adopted,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_last_write_wins() -> Result<()> {
        let store = setup_test_store()?;

        let (a, b) = tokio::join!(
            set_pet_status(&store, "pet1", PetStatus::Pending),
            set_pet_status(&store, "pet1", PetStatus::Adopted),
        );
        a?;
        b?;

        // join! polls in order, so the second write commits last
        assert_eq!(
            get_pet(&store, "pet1").await.unwrap().status,
            PetStatus::Adopted
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_list_pets_by_category() -> Result<()> {
        let store = setup_test_store()?;

        let dogs = list_pets_by_category(&store, Some(PetCategory::Dog)).await;
        assert!(!dogs.is_empty());
        assert!(dogs.iter().all(|p| p.category == PetCategory::Dog));

        let all = list_pets_by_category(&store, None).await;
        assert_eq!(all.len(), list_pets(&store).await.len());
        Ok(())
    }

    #[tokio::test]
    async fn test_featured_pets() -> Result<()> {
        let store = setup_test_store()?;
        let featured = featured_pets(&store, 3).await;
        assert_eq!(featured.len(), 3);
        assert_eq!(featured[0].id, list_pets(&store).await[0].id);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_pet() -> Result<()> {
        let store = setup_test_store()?;
        let before = list_pets(&store).await.len();

        let pet = add_pet(&store, test_new_pet("Biscuit")).await?;
        assert_eq!(pet.status, PetStatus::Available);
        assert!(pet.id.starts_with("pet-"));
        assert_eq!(list_pets(&store).await.len(), before + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_pet_validation() -> Result<()> {
        let store = setup_test_store()?;

        let result = add_pet(&store, test_new_pet("  ")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut negative = test_new_pet("Biscuit");
        negative.price = -5.0;
        let result = add_pet(&store, negative).await;
        assert!(matches!(
            result,
            Err(Error::InvalidAmount { amount }) if amount == -5.0
        ));
        Ok(())
    }
}
