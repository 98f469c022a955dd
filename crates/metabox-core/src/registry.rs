use crate::{
    controller::BoxController,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use std::{cell::RefCell, collections::HashMap};
use thiserror::Error as ThisError;

thread_local! {
    static REGISTRY: RefCell<BoxRegistry> = RefCell::new(BoxRegistry::new());
}

///
/// BoxRegistryError
///

#[derive(Debug, ThisError)]
pub enum BoxRegistryError {
    #[error("box '{0}' not found")]
    BoxNotFound(String),
}

impl BoxRegistryError {
    pub(crate) const fn class() -> ErrorClass {
        ErrorClass::NotFound
    }
}

impl From<BoxRegistryError> for InternalError {
    fn from(err: BoxRegistryError) -> Self {
        Self::new(
            BoxRegistryError::class(),
            ErrorOrigin::Registry,
            err.to_string(),
        )
    }
}

///
/// BoxRegistry
///
/// Process-wide box id → controller table. Last registration for an id
/// wins; the displaced controller is handed back so the host can surface
/// the collision instead of losing it silently.
///

#[derive(Default)]
pub struct BoxRegistry {
    boxes: HashMap<String, BoxController>,
}

impl BoxRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, controller: BoxController) -> Option<BoxController> {
        self.boxes.insert(controller.id().to_owned(), controller)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BoxController> {
        self.boxes.get(id)
    }

    pub fn try_get(&self, id: &str) -> Result<&BoxController, BoxRegistryError> {
        self.get(id)
            .ok_or_else(|| BoxRegistryError::BoxNotFound(id.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.boxes.keys().map(String::as_str)
    }
}

// ==========================================================================
// Thread-local global registry
// ==========================================================================

/// Register a controller globally; returns the displaced controller when
/// the id was already taken.
pub fn register(controller: BoxController) -> Option<BoxController> {
    REGISTRY.with_borrow_mut(|registry| registry.add(controller))
}

/// Run a closure against a registered controller.
pub fn with_box<R>(
    id: &str,
    f: impl FnOnce(&BoxController) -> R,
) -> Result<R, InternalError> {
    REGISTRY.with_borrow(|registry| {
        let controller = registry.try_get(id)?;

        Ok(f(controller))
    })
}

/// Registered box ids, for host-side enumeration.
#[must_use]
pub fn registered_ids() -> Vec<String> {
    REGISTRY.with_borrow(|registry| registry.ids().map(ToOwned::to_owned).collect())
}

///
/// TESTS
///
