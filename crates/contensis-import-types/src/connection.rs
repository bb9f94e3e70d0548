//! CMS connection types
//!
//! Source connections read from a single project, target connections write to
//! one or more projects.

use serde::{Deserialize, Serialize};

/// Credentials and endpoints for one CMS instance
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsConnection {
    /// CMS root url, e.g. `https://cms-example.cloud.contensis.com/`
    pub url: String,
    /// API key client id (client credentials grant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// API key shared secret (client credentials grant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
    /// Username (password grant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password (password grant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Public hostname serving assets for this CMS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_hostname: Option<String>,
}

impl CmsConnection {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Attach client credentials
    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.shared_secret = Some(shared_secret.into());
        self
    }
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

impl std::fmt::Debug for CmsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsConnection")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("shared_secret", &redact(&self.shared_secret))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("asset_hostname", &self.asset_hostname)
            .finish()
    }
}

/// Connection used to read content from a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCms {
    #[serde(flatten)]
    pub connection: CmsConnection,
    /// Project api id to read from
    #[serde(default)]
    pub project: String,
}

impl SourceCms {
    pub fn new(connection: CmsConnection, project: impl Into<String>) -> Self {
        Self {
            connection,
            project: project.into(),
        }
    }

    /// Copy of this source pointing at a different project
    pub fn with_project(&self, project: impl Into<String>) -> Self {
        Self {
            connection: self.connection.clone(),
            project: project.into(),
        }
    }
}

/// Connection used to write content to one or more projects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCms {
    #[serde(flatten)]
    pub connection: CmsConnection,
    /// Project api ids to write to
    #[serde(default)]
    pub target_projects: Vec<String>,
}

impl TargetCms {
    pub fn new(connection: CmsConnection, target_projects: Vec<String>) -> Self {
        Self {
            connection,
            target_projects,
        }
    }

    /// Copy of this target writing to a different set of projects
    pub fn with_projects(&self, target_projects: Vec<String>) -> Self {
        Self {
            connection: self.connection.clone(),
            target_projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_debug_redacts_secrets() {
        let conn = CmsConnection::new("https://cms-example.cloud.contensis.com/")
            .with_client_credentials("client", "top-secret");
        let debug = format!("{:?}", conn);
        assert!(debug.contains("client"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("top-secret"));
    }

    #[test]
    fn test_target_deserializes_flattened_connection() {
        let target: TargetCms = serde_json::from_value(json!({
            "url": "https://cms-example.cloud.contensis.com/",
            "clientId": "id",
            "sharedSecret": "secret",
            "targetProjects": ["website", "intranet"]
        }))
        .unwrap();

        assert_eq!(target.connection.client_id.as_deref(), Some("id"));
        assert_eq!(target.target_projects, vec!["website", "intranet"]);
    }

    #[test]
    fn test_source_with_project() {
        let source = SourceCms::new(CmsConnection::new("https://cms/"), "website");
        let other = source.with_project("archive");
        assert_eq!(other.project, "archive");
        assert_eq!(other.connection, source.connection);
    }
}
