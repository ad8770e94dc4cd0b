//! Reachability and credential checks used when configuring a tracker.
//!
//! Neither check is part of a synchronization run.

use crate::client::{DEFAULT_TIMEOUT, http_client};
use crate::{SoapTracker, TrackerError};
use issuesync_core::tracker::TrackerConnection;
use issuesync_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Text the tracker's front page contains.
pub const ROOT_MARKER: &str = "Atlassian JIRA";

/// Text the service descriptor contains.
pub const WSDL_MARKER: &str = "wsdl:definitions";

const WSDL_PATH: &str = "rpc/soap/jirasoapservice-v2?wsdl";

/// Check that `url` points at a tracker whose SOAP service is exposed.
///
/// Any network failure, or a missing marker on either page, means the
/// tracker is unreachable.
pub async fn check_url(url: &str) -> std::result::Result<(), TrackerError> {
    check_url_within(url, DEFAULT_TIMEOUT).await
}

async fn check_url_within(url: &str, timeout: Duration) -> std::result::Result<(), TrackerError> {
    let connection = TrackerConnection::new(url, None, None)
        .map_err(|_| TrackerError::Unreachable("Invalid Jira URL".to_string()))?;
    let client = http_client(timeout)?;

    let root = connection.url().clone();
    if !find_text(&client, &root, ROOT_MARKER).await? {
        return Err(TrackerError::Unreachable(
            "Soap Service is unreachable".to_string(),
        ));
    }

    let wsdl = connection
        .join(WSDL_PATH)
        .map_err(|e| TrackerError::Unreachable(e.to_string()))?;
    if !find_text(&client, &wsdl, WSDL_MARKER).await? {
        return Err(TrackerError::Unreachable("Invalid WSDL".to_string()));
    }

    info!(url = %root, "Tracker is reachable");
    Ok(())
}

async fn find_text(
    client: &reqwest::Client,
    url: &Url,
    marker: &str,
) -> std::result::Result<bool, TrackerError> {
    let body = async {
        client
            .get(url.clone())
            .send()
            .await?
            .text()
            .await
    }
    .await
    .map_err(|e| {
        warn!(url = %url, error = %e, "Unable to connect");
        TrackerError::Unreachable(format!("Unable to connect to {}: {}", url, e))
    })?;

    Ok(body.contains(marker))
}

/// Check that the credentials are accepted by logging in once.
pub async fn check_credentials(
    url: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    let url = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Error::Configuration("No URL given".to_string()))?;

    let connection = TrackerConnection::new(url, username, password)?;
    let tracker = SoapTracker::new(&connection)?;

    match connection.connect(Arc::new(tracker)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(url = %connection.url(), error = %e, "Failed to login to tracker");
            Err(e)
        }
    }
}
