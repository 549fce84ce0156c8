//! Portal rendering outside the host page's layout.
//!
//! The overlay is painted into a dedicated fixed, full-viewport container
//! appended straight to `document.body`, so ancestor `overflow`, `transform`
//! and z-index rules of the page can't clip or misplace it. The container is
//! created on mount and removed on unmount (or drop), so repeated open/close
//! cycles never leak nodes into the page.
//!
//! `PortalHost` is the seam to the DOM: the browser binding implements it
//! with `web-sys`, tests use an in-memory host.

use crate::error::PageSnapResult;

/// Document operations the portal needs.
pub trait PortalHost {
    /// Handle to a container node.
    type Node: Clone;

    /// Existing container with this id, if any.
    fn find_root(&self, id: &str) -> Option<Self::Node>;

    /// Create the container and append it to the document body.
    fn create_root(&mut self, id: &str) -> PageSnapResult<Self::Node>;

    /// Detach the container from the document.
    fn remove_root(&mut self, node: &Self::Node) -> PageSnapResult<()>;
}

/// Owns at most one mounted container.
pub struct Portal<H: PortalHost> {
    host: H,
    id: String,
    root: Option<H::Node>,
}

impl<H: PortalHost> Portal<H> {
    pub fn new(host: H, id: impl Into<String>) -> Self {
        Self {
            host,
            id: id.into(),
            root: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    /// The mounted container, for the painter.
    pub fn root(&self) -> Option<&H::Node> {
        self.root.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mount the container. Idempotent while mounted. A container with the
    /// same id left behind by an earlier session is replaced.
    ///
    /// Failures are logged and reported as `false`; the caller keeps running
    /// without an overlay instead of breaking the page.
    pub fn mount(&mut self) -> bool {
        if self.root.is_some() {
            return true;
        }

        if let Some(stale) = self.host.find_root(&self.id) {
            log::warn!("[PORTAL] Replacing stale container #{}", self.id);
            if let Err(e) = self.host.remove_root(&stale) {
                log::warn!("[PORTAL] Failed to remove stale container #{}: {}", self.id, e);
            }
        }

        match self.host.create_root(&self.id) {
            Ok(node) => {
                log::debug!("[PORTAL] Mounted #{}", self.id);
                self.root = Some(node);
                true
            }
            Err(e) => {
                log::error!("[PORTAL] Failed to mount #{}: {}", self.id, e);
                false
            }
        }
    }

    /// Remove the container. No-op when not mounted.
    pub fn unmount(&mut self) {
        if let Some(node) = self.root.take() {
            match self.host.remove_root(&node) {
                Ok(()) => log::debug!("[PORTAL] Unmounted #{}", self.id),
                Err(e) => log::warn!("[PORTAL] Failed to unmount #{}: {}", self.id, e),
            }
        }
    }
}

impl<H: PortalHost> Drop for Portal<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
