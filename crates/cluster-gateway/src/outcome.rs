//! Outcome types for idempotent gateway operations.
//!
//! The upsert and teardown paths each have exactly one expected "already in
//! that state" shape; these enums make that branch explicit for the caller
//! instead of hiding it behind suppressed errors.

/// Result of a create-or-patch upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    /// The object did not exist and was created.
    Created(T),
    /// The object already existed (409 on create) and was patched.
    Patched(T),
}

impl<T> Applied<T> {
    /// Returns the live object regardless of which path applied it.
    pub fn into_inner(self) -> T {
        match self {
            Self::Created(obj) | Self::Patched(obj) => obj,
        }
    }

    /// Whether the create path was taken.
    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Result of an idempotent delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// The object existed and was deleted.
    Deleted,
    /// The object was already gone (404 on delete).
    AlreadyAbsent,
}
