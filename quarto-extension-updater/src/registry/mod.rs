//! Extensions registry client.
//!
//! The registry is a JSON document keyed by `owner/repo`, listing the latest
//! release of every known extension repository.

mod entry;
mod error;

pub use entry::RegistryEntry;
pub use error::RegistryError;

use entry::RawEntry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("quarto-extension-updater/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRegistry {
    Keyed(BTreeMap<String, RawEntry>),
    List(Vec<RawEntry>),
}

/// Fetches and parses the registry document at `url`.
///
/// # Errors
///
/// Returns [`RegistryError`] on transport failure, timeout, a non-success
/// status or a malformed body.
pub async fn fetch_registry(
    url: &str,
    timeout: Duration,
) -> Result<Vec<RegistryEntry>, RegistryError> {
    info!(url, "Fetching extensions registry");

    let request_error = |source: reqwest::Error| {
        if source.is_timeout() {
            RegistryError::Timeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }
        } else {
            RegistryError::Request {
                url: url.to_string(),
                source,
            }
        }
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(request_error)?;

    let response = client.get(url).send().await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(RegistryError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(request_error)?;
    let entries = parse_registry(&body)?;

    info!(count = entries.len(), "Loaded registry entries");
    Ok(entries)
}

/// Parses a registry document.
///
/// Accepts an object keyed by `owner/repo` or a plain list of entries.
/// Repositories without a published release are left out.
///
/// # Errors
///
/// Returns [`RegistryError::Malformed`] if the body is not a registry document.
pub fn parse_registry(body: &str) -> Result<Vec<RegistryEntry>, RegistryError> {
    let raw: RawRegistry =
        serde_json::from_str(body).map_err(|source| RegistryError::Malformed { source })?;

    let entries: Vec<RegistryEntry> = match raw {
        RawRegistry::Keyed(map) => map
            .into_iter()
            .filter_map(|(key, raw)| {
                let entry = raw.into_entry(Some(&key));
                if entry.is_none() {
                    debug!(repository = %key, "Registry entry has no release, skipping");
                }
                entry
            })
            .collect(),
        RawRegistry::List(list) => list
            .into_iter()
            .filter_map(|raw| raw.into_entry(None))
            .collect(),
    };

    Ok(entries)
}

/// Finds the entry for `owner/repo`, ignoring ASCII case.
#[must_use]
pub fn find_entry<'a>(registry: &'a [RegistryEntry], owner_repo: &str) -> Option<&'a RegistryEntry> {
    registry
        .iter()
        .find(|entry| entry.owner_repo.eq_ignore_ascii_case(owner_repo))
}
