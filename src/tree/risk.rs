//! Risk policy
//!
//! Derives a resource's risk flag from its own attributes. Only the
//! resource itself is inspected, never its children.

use crate::resource::{attr, ResourceKind, ResourceRecord};

/// Cloud Functions runtimes that are currently supported
pub const DEFAULT_SUPPORTED_RUNTIMES: &[&str] = &[
    "nodejs20",
    "nodejs22",
    "python310",
    "python311",
    "python312",
    "python313",
    "go121",
    "go122",
    "go123",
    "java17",
    "java21",
    "dotnet8",
    "ruby32",
    "ruby33",
    "php82",
    "php83",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskPolicy {
    supported_runtimes: Vec<String>,
}

impl RiskPolicy {
    pub fn new(supported_runtimes: Vec<String>) -> Self {
        Self { supported_runtimes }
    }

    pub fn supported_runtimes(&self) -> &[String] {
        &self.supported_runtimes
    }

    /// Whether `record` should be highlighted as at risk
    pub fn assess(&self, record: &ResourceRecord) -> bool {
        match record.kind() {
            // Missing attributes mean the lookup failed; that is not evidence of risk
            ResourceKind::Bucket => {
                record.bool_attribute(attr::ENCRYPTED) == Some(false)
                    || record.bool_attribute(attr::PUBLIC_ACCESS) == Some(true)
            }
            ResourceKind::Function => record
                .text_attribute(attr::RUNTIME)
                .is_some_and(|runtime| !self.supported_runtimes.iter().any(|r| r == runtime)),
            _ => false,
        }
    }
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_SUPPORTED_RUNTIMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}
