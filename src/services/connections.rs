//! Platform connections reported by two services.
//!
//! The auth service owns OAuth connections, the security service owns
//! platform credentials. Both are fetched concurrently and merged by
//! platform key; on conflict the auth entry wins.

use std::collections::BTreeMap;

use crate::error::ApiResult;
use crate::http::client::ApiClient;
use crate::services::types::Connection;

pub const AUTH_CONNECTIONS_ENDPOINT: &str = "/api/auth/connections";
pub const SECURITY_CONNECTIONS_ENDPOINT: &str = "/api/security/connections";

/// Merge connection lists by platform. Entries from `auth` overwrite `security`.
///
/// Platform keys are compared case-insensitively; output is ordered by key.
pub fn merge_connections(security: Vec<Connection>, auth: Vec<Connection>) -> Vec<Connection> {
    let mut merged: BTreeMap<String, Connection> = BTreeMap::new();
    for connection in security.into_iter().chain(auth) {
        merged.insert(connection.platform.to_lowercase(), connection);
    }
    merged.into_values().collect()
}

/// Fetch from both services and merge.
///
/// One side failing is tolerated and logged; both failing returns the auth error.
pub async fn list_connections(auth: &ApiClient, security: &ApiClient) -> ApiResult<Vec<Connection>> {
    let (from_auth, from_security) = tokio::join!(
        auth.get(AUTH_CONNECTIONS_ENDPOINT).send_enveloped::<Vec<Connection>>(),
        security
            .get(SECURITY_CONNECTIONS_ENDPOINT)
            .send_enveloped::<Vec<Connection>>(),
    );

    match (from_auth, from_security) {
        (Ok(a), Ok(s)) => Ok(merge_connections(s, a)),
        (Ok(a), Err(err)) => {
            tracing::warn!(error = %err, "Security connections unavailable, using auth connections only");
            Ok(merge_connections(Vec::new(), a))
        }
        (Err(err), Ok(s)) => {
            tracing::warn!(error = %err, "Auth connections unavailable, using security connections only");
            Ok(merge_connections(s, Vec::new()))
        }
        (Err(auth_err), Err(security_err)) => {
            tracing::error!(auth = %auth_err, security = %security_err, "No connection source available");
            Err(auth_err)
        }
    }
}
