use super::record::ObjectHandle;

/// Errors reported by [`super::ObjectRegistry`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The handle was never issued by this registry, or attach targeted a removed object.
    #[error("unknown object handle {0}")]
    UnknownHandle(ObjectHandle),

    /// Attach was attempted before the object's content finished loading.
    #[error("{0} has not finished loading")]
    NotReady(ObjectHandle),

    /// The loader delivered a second completion for the same object.
    #[error("load completion delivered twice for {0}")]
    DuplicateCompletion(ObjectHandle),
}
