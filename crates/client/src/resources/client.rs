//! Typed CRUD requests for one resource.

use std::marker::PhantomData;

use serde::Deserialize;
use tracing::{info, instrument};

use super::{Resource, collection_path, item_path};
use crate::error::ClientError;
use crate::gateway::Gateway;

/// Backend reply to a create: `{"message": "...", "id": 7}`.
#[derive(Deserialize)]
struct Created<I> {
    id: I,
}

/// CRUD requests for one resource type.
pub struct ResourceClient<R> {
    gateway: Gateway,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("resource", &std::any::type_name::<R>())
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceClient<R> {
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            _resource: PhantomData,
        }
    }

    /// All records visible to the signed-in user.
    ///
    /// # Errors
    ///
    /// Propagates gateway errors.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn list(&self) -> Result<Vec<R>, ClientError> {
        self.gateway.get(&collection_path::<R>()).await
    }

    /// One record.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the record does not exist or is not
    /// visible to the signed-in user.
    #[instrument(skip(self, id), fields(resource = R::PATH, id = %id))]
    pub async fn get(&self, id: R::Id) -> Result<R, ClientError> {
        self.gateway.get(&item_path::<R>(id)).await
    }

    /// Create a record and return its new ID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the backend rejects the draft.
    #[instrument(skip(self, draft), fields(resource = R::PATH))]
    pub async fn create(&self, draft: &R::Draft) -> Result<R::Id, ClientError> {
        let created: Created<R::Id> = self.gateway.post(&collection_path::<R>(), draft).await?;
        info!(id = %created.id, "Created {}", R::NAME);
        Ok(created.id)
    }

    /// Apply `patch` to a record.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` or `ClientError::Validation` on rejection.
    #[instrument(skip(self, id, patch), fields(resource = R::PATH, id = %id))]
    pub async fn update(&self, id: R::Id, patch: &R::Patch) -> Result<(), ClientError> {
        self.gateway.put(&item_path::<R>(id), patch).await?;
        info!("Updated {}", R::NAME);
        Ok(())
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the record is already gone.
    #[instrument(skip(self, id), fields(resource = R::PATH, id = %id))]
    pub async fn delete(&self, id: R::Id) -> Result<(), ClientError> {
        self.gateway.delete(&item_path::<R>(id)).await?;
        info!("Deleted {}", R::NAME);
        Ok(())
    }
}
