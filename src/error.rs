//! Error kinds surfaced by the inventory pipeline

use crate::render::RenderError;
use crate::resource::ResourceKind;

/// Errors of the collect → build → render pipeline.
///
/// `Collector` and `Enrichment` are recovered where they occur; only
/// `Authentication` and `Render` abort a run.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("collecting {kind} failed: {message}")]
    Collector { kind: ResourceKind, message: String },

    #[error("enriching {kind} `{id}` failed: {message}")]
    Enrichment {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl InventoryError {
    /// Whether the run must stop instead of producing a partial inventory
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::Render(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(InventoryError::Authentication("no creds".into()).is_fatal());
        assert!(!InventoryError::Collector {
            kind: ResourceKind::Bucket,
            message: "denied".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_collector_message_names_kind() {
        let err = InventoryError::Collector {
            kind: ResourceKind::Function,
            message: "Permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "collecting Cloud Functions failed: Permission denied"
        );
    }
}
