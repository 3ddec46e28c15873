//! Existence lookup of a collection (version)
//!
//! The server changed its addressing scheme at [`STRUCTURED_URL_MIN_VERSION`].
//! The request shape is chosen once per run from the reported server version;
//! the reconciler only talks to [`LookupAdapter`].

use crate::client::{HubClient, Method, OnMissing};
use crate::error::Result;
use crate::version::ServerVersion;
use serde::{Deserialize, Serialize};

/// First server version serving repository-scoped collection URLs
pub const STRUCTURED_URL_MIN_VERSION: &str = "4.7.0";

/// Request used to probe for existence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub endpoint: String,
}

impl RequestSpec {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            endpoint: endpoint.into(),
        }
    }
}

/// Builds the existence-check request for one addressing scheme
pub trait LookupShape: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn build_existence_request(
        &self,
        namespace: &str,
        name: &str,
        version: Option<&str>,
    ) -> RequestSpec;
}

/// `v3/plugin/ansible/content/{repository}/collections/index/{namespace}/{name}/[versions/{version}/]`
#[derive(Debug, Clone)]
pub struct StructuredLookup {
    repository: String,
}

impl StructuredLookup {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
        }
    }
}

impl LookupShape for StructuredLookup {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn build_existence_request(
        &self,
        namespace: &str,
        name: &str,
        version: Option<&str>,
    ) -> RequestSpec {
        let mut endpoint = format!(
            "v3/plugin/ansible/content/{}/collections/index/{}/{}/",
            self.repository, namespace, name
        );
        if let Some(version) = version {
            endpoint.push_str(&format!("versions/{}/", version));
        }
        RequestSpec::get(endpoint)
    }
}

/// `collections/{namespace}/{name}[/versions/{version}]`
#[derive(Debug, Clone, Default)]
pub struct LegacyLookup;

impl LookupShape for LegacyLookup {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn build_existence_request(
        &self,
        namespace: &str,
        name: &str,
        version: Option<&str>,
    ) -> RequestSpec {
        match version {
            Some(version) => RequestSpec::get(format!(
                "collections/{}/{}/versions/{}",
                namespace, name, version
            )),
            None => RequestSpec::get(format!("collections/{}/{}", namespace, name)),
        }
    }
}

/// A resource the server reported as existing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedResource {
    /// Canonical address, used for deletion
    pub href: String,
    pub json: serde_json::Value,
}

impl ObservedResource {
    /// Take `href` from the payload, falling back to the probed endpoint
    pub fn from_payload(endpoint: &str, json: serde_json::Value) -> Self {
        let href = json
            .get("href")
            .and_then(|v| v.as_str())
            .unwrap_or(endpoint)
            .to_string();
        Self { href, json }
    }
}

/// Result of one existence probe
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub endpoint: String,
    pub existing: Option<ObservedResource>,
}

/// Version-aware existence lookup
pub struct LookupAdapter {
    shape: Box<dyn LookupShape>,
}

impl LookupAdapter {
    pub fn new(shape: Box<dyn LookupShape>) -> Self {
        Self { shape }
    }

    /// Pick the shape for the given server version
    pub fn for_server(server_version: &ServerVersion, repository: &str) -> Self {
        if server_version.at_least(STRUCTURED_URL_MIN_VERSION) {
            Self::new(Box::new(StructuredLookup::new(repository)))
        } else {
            Self::new(Box::new(LegacyLookup))
        }
    }

    pub fn shape_name(&self) -> &'static str {
        self.shape.name()
    }

    pub fn request_for(&self, namespace: &str, name: &str, version: Option<&str>) -> RequestSpec {
        self.shape.build_existence_request(namespace, name, version)
    }

    /// Probe the server; a 404 is `existing: None`, any other failure is fatal
    pub async fn lookup(
        &self,
        client: &dyn HubClient,
        namespace: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<Lookup> {
        let request = self.request_for(namespace, name, version);
        tracing::debug!(
            "Looking up {}.{} via {} endpoint {}",
            namespace,
            name,
            self.shape.name(),
            request.endpoint
        );

        let response = client
            .request(request.method, &request.endpoint, None, OnMissing::Absent)
            .await?;

        let existing =
            response.map(|resp| ObservedResource::from_payload(&request.endpoint, resp.json));

        Ok(Lookup {
            endpoint: request.endpoint,
            existing,
        })
    }
}

impl std::fmt::Debug for LookupAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupAdapter")
            .field("shape", &self.shape.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_selection_by_server_version() {
        let adapter = LookupAdapter::for_server(&ServerVersion::parse("4.6.0"), "published");
        assert_eq!(adapter.shape_name(), "legacy");

        let adapter = LookupAdapter::for_server(&ServerVersion::parse("4.7.0"), "published");
        assert_eq!(adapter.shape_name(), "structured");

        let adapter = LookupAdapter::for_server(&ServerVersion::parse("4.10.2"), "published");
        assert_eq!(adapter.shape_name(), "structured");
    }

    #[test]
    fn test_same_input_two_shapes() {
        let legacy = LookupAdapter::for_server(&ServerVersion::parse("4.2.5"), "published");
        let structured = LookupAdapter::for_server(&ServerVersion::parse("4.9.0"), "published");

        assert_eq!(
            legacy.request_for("awx", "awx", Some("15.0.0")),
            RequestSpec::get("collections/awx/awx/versions/15.0.0")
        );
        assert_eq!(
            structured.request_for("awx", "awx", Some("15.0.0")),
            RequestSpec::get(
                "v3/plugin/ansible/content/published/collections/index/awx/awx/versions/15.0.0/"
            )
        );

        assert_eq!(
            legacy.request_for("awx", "awx", None).endpoint,
            "collections/awx/awx"
        );
        assert_eq!(
            structured.request_for("awx", "awx", None).endpoint,
            "v3/plugin/ansible/content/published/collections/index/awx/awx/"
        );
    }

    #[test]
    fn test_structured_uses_repository() {
        let shape = StructuredLookup::new("staging");
        let request = shape.build_existence_request("ns", "coll", None);
        assert_eq!(
            request.endpoint,
            "v3/plugin/ansible/content/staging/collections/index/ns/coll/"
        );
        assert_eq!(request.method, Method::Get);
    }

    #[test]
    fn test_observed_resource_href() {
        let observed = ObservedResource::from_payload(
            "collections/awx/awx",
            json!({"href": "/api/galaxy/v3/collections/awx/awx/", "name": "awx"}),
        );
        assert_eq!(observed.href, "/api/galaxy/v3/collections/awx/awx/");

        let observed = ObservedResource::from_payload("collections/awx/awx", json!({"name": "awx"}));
        assert_eq!(observed.href, "collections/awx/awx");
    }
}
