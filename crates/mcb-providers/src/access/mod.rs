//! Case-access oracle adapter (§6.3). Auth/RBAC modeling is explicitly out of
//! scope (§1 Non-goals); this is a thin client over whatever external
//! authorization service a deployment points it at.

use async_trait::async_trait;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{AccessOracle, Permission};
use mcb_domain::value_objects::CaseName;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct CanAccessResponse {
    allowed: bool,
}

/// Talks to an external case-access authorization service.
pub struct HttpAccessOracle {
    client: Client,
    base_url: String,
}

impl HttpAccessOracle {
    #[must_use]
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }
}

#[async_trait]
impl AccessOracle for HttpAccessOracle {
    async fn can_access(&self, case: &CaseName, user_id: &str, permission: Permission) -> Result<bool> {
        let permission = match permission {
            Permission::Read => "read",
            Permission::Write => "write",
        };

        let response = self
            .client
            .post(format!("{}/can-access", self.base_url))
            .json(&serde_json::json!({
                "caseName": case.as_str(),
                "userId": user_id,
                "permission": permission,
            }))
            .send()
            .await
            .map_err(|e| Error::transient_with_source("access-oracle request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::transient(format!("access oracle returned status {}", response.status())));
        }

        let parsed: CanAccessResponse = response
            .json()
            .await
            .map_err(|e| Error::component_failure("access_oracle", format!("malformed can-access response: {e}")))?;

        Ok(parsed.allowed)
    }
}

/// Grants every request, for single-tenant or local deployments that run
/// without an external authorization service.
pub struct AllowAllAccessOracle;

#[async_trait]
impl AccessOracle for AllowAllAccessOracle {
    async fn can_access(&self, _case: &CaseName, _user_id: &str, _permission: Permission) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allow_all_oracle_always_grants() {
        let oracle = AllowAllAccessOracle;
        let case = CaseName::parse("smithv-acme").expect("valid case name");
        let allowed = oracle.can_access(&case, "user-1", Permission::Write).await.expect("no error");
        assert!(allowed);
    }

    #[test]
    fn http_oracle_is_constructed_with_a_bounded_timeout() {
        let oracle = HttpAccessOracle::new("http://localhost:9100".to_owned(), Duration::from_secs(5));
        assert_eq!(oracle.base_url, "http://localhost:9100");
    }
}
