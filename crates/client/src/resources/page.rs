//! List pages that reload after every change.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::{Resource, ResourceClient};
use crate::error::ClientError;
use crate::gateway::Gateway;

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a delete request on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The user declined; nothing was sent.
    Cancelled,
}

/// Result of a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The list now holds this many records.
    Applied(usize),
    /// The page was unmounted while the request was in flight; the response
    /// was dropped.
    Discarded,
}

/// Tracks whether the page that started a request is still on screen.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Mark the page as gone. Responses arriving afterwards are discarded.
    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A list screen over one resource.
///
/// Mutations reload the list afterwards so the page always reflects what
/// the backend holds, including fields the backend fills in.
#[derive(Debug)]
pub struct ResourcePage<R: Resource> {
    client: ResourceClient<R>,
    items: Vec<R>,
    mount: MountHandle,
}

impl<R: Resource> ResourcePage<R> {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            client: ResourceClient::new(gateway),
            items: Vec::new(),
            mount: MountHandle::new(),
        }
    }

    /// Records from the last applied load.
    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Request client for this page's resource.
    #[must_use]
    pub const fn client(&self) -> &ResourceClient<R> {
        &self.client
    }

    /// Handle to unmount the page from another task.
    #[must_use]
    pub fn mount_handle(&self) -> MountHandle {
        self.mount.clone()
    }

    /// Reload the list from the backend.
    ///
    /// # Errors
    ///
    /// Propagates gateway errors while the page is mounted. After unmount,
    /// both records and errors are dropped.
    pub async fn load(&mut self) -> Result<Refresh, ClientError> {
        let fetched = self.client.list().await;

        if !self.mount.is_mounted() {
            debug!(resource = R::PATH, "Page unmounted, discarding response");
            return Ok(Refresh::Discarded);
        }

        self.items = fetched?;
        Ok(Refresh::Applied(self.items.len()))
    }

    /// Create a record and reload.
    ///
    /// # Errors
    ///
    /// Returns the create error; the list is left as it was.
    pub async fn create(&mut self, draft: &R::Draft) -> Result<R::Id, ClientError> {
        let id = self.client.create(draft).await?;
        self.load().await?;
        Ok(id)
    }

    /// Update a record and reload.
    ///
    /// # Errors
    ///
    /// Returns the update error; the list is left as it was.
    pub async fn update(&mut self, id: R::Id, patch: &R::Patch) -> Result<(), ClientError> {
        self.client.update(id, patch).await?;
        self.load().await?;
        Ok(())
    }

    /// Delete a record after confirmation and reload.
    ///
    /// # Errors
    ///
    /// Returns the delete error; the list is left as it was.
    pub async fn delete(
        &mut self,
        id: R::Id,
        confirm: &impl Confirm,
    ) -> Result<Deletion, ClientError> {
        let prompt = format!("Delete {} {id}?", R::NAME);
        if !confirm.confirm(&prompt) {
            return Ok(Deletion::Cancelled);
        }

        self.client.delete(id).await?;
        self.load().await?;
        Ok(Deletion::Deleted)
    }
}

impl<R: Resource> Drop for ResourcePage<R> {
    fn drop(&mut self) {
        self.mount.unmount();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::config::ClientConfig;
    use crate::navigator::{Navigator, Screen};
    use crate::session::SessionManager;
    use parish_core::{Event, EventId};

    fn unreachable_gateway() -> Gateway {
        let config = ClientConfig::new("http://127.0.0.1:9", "/dev/null").unwrap();
        Gateway::new(&config, SessionManager::in_memory(), Navigator::new(Screen::Events)).unwrap()
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let mut page = ResourcePage::<Event>::new(unreachable_gateway());
        let asked = Cell::new(None);

        let outcome = page
            .delete(EventId::new(4), &|prompt: &str| {
                asked.set(Some(prompt.to_owned()));
                false
            })
            .await
            .unwrap();

        assert_eq!(outcome, Deletion::Cancelled);
        assert_eq!(asked.take().unwrap(), "Delete event 4?");
    }

    #[tokio::test]
    async fn test_unmounted_page_discards_failure() {
        let mut page = ResourcePage::<Event>::new(unreachable_gateway());
        page.mount_handle().unmount();

        assert_eq!(page.load().await.unwrap(), Refresh::Discarded);
        assert!(page.items().is_empty());
    }

    #[tokio::test]
    async fn test_mounted_page_reports_network_failure() {
        let mut page = ResourcePage::<Event>::new(unreachable_gateway());
        let err = page.load().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn test_drop_unmounts() {
        let page = ResourcePage::<Event>::new(unreachable_gateway());
        let handle = page.mount_handle();
        drop(page);
        assert!(!handle.is_mounted());
    }
}
