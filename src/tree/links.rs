//! Console deep links
//!
//! Expands the registry's per-kind `console_link` templates. Placeholders:
//! `{id}`, `{project}` and `{location}`; values are URL-encoded.

use crate::resource::{self, ResourceKind, ResourceRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLinks {
    project: String,
}

impl ConsoleLinks {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    /// Link for a resource, or `None` when the template needs a location
    /// the caller does not have
    pub fn url_for(&self, kind: ResourceKind, id: &str, location: Option<&str>) -> Option<String> {
        let template = &resource::definition(kind)?.console_link;

        let mut url = template
            .replace("{id}", &urlencoding::encode(id))
            .replace("{project}", &urlencoding::encode(&self.project));

        if url.contains("{location}") {
            url = url.replace("{location}", &urlencoding::encode(location?));
        }

        Some(url)
    }

    pub fn url_for_record(&self, record: &ResourceRecord) -> Option<String> {
        self.url_for(record.kind(), record.id(), record.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_link() {
        let links = ConsoleLinks::new("my-project");
        assert_eq!(
            links.url_for(ResourceKind::Bucket, "logs", None).as_deref(),
            Some("https://console.cloud.google.com/storage/browser/logs?project=my-project")
        );
    }

    #[test]
    fn test_link_values_are_encoded() {
        let links = ConsoleLinks::new("my-project");
        let url = links.url_for(ResourceKind::Topic, "a&b", None).unwrap();
        assert!(url.contains("/detail/a%26b?"));
    }

    #[test]
    fn test_location_template_without_location() {
        let links = ConsoleLinks::new("my-project");
        assert_eq!(links.url_for(ResourceKind::Instance, "vm-1", None), None);

        let record =
            ResourceRecord::new(ResourceKind::Instance, "vm-1").with_location("us-central1-a");
        assert_eq!(
            links.url_for_record(&record).as_deref(),
            Some("https://console.cloud.google.com/compute/instancesDetail/zones/us-central1-a/instances/vm-1?project=my-project")
        );
    }
}
