//! REST client for one XTDB node behind a multinode gateway.
//!
//! Every node lives under `{base_url}/_xtdb/{node}`. Queries are sent as
//! EDN and answered as JSON.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use octoscope_core::store::{StoreConnector, StoreError, StoreFacade};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::XtdbError;

/// Path segment the gateway mounts store nodes under.
const GATEWAY_SEGMENT: &str = "_xtdb";

const JSON: &str = "application/json";
const EDN: &str = "application/edn";

/// Opens [`XtdbClient`]s for named nodes. Clones share one HTTP client
/// and its connection pool.
#[derive(Debug, Clone)]
pub struct XtdbConnector {
    client: reqwest::Client,
    base_url: Url,
}

impl XtdbConnector {
    /// Create a connector for the gateway at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`XtdbError`] if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, XtdbError> {
        let parsed = Url::parse(base_url).map_err(|source| XtdbError::InvalidUrl {
            url: base_url.to_owned(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(XtdbError::NotABase(base_url.to_owned()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// The gateway base URL.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl StoreConnector for XtdbConnector {
    type Store = XtdbClient;

    fn connect(&self, node: &str) -> Result<XtdbClient, StoreError> {
        let node_url = join(&self.base_url, &[GATEWAY_SEGMENT, node]).ok_or_else(|| {
            StoreError::Connect {
                node: node.to_owned(),
                message: format!("{} cannot be used as a base", self.base_url),
            }
        })?;
        debug!(node, url = %node_url, "store client created");
        Ok(XtdbClient {
            client: self.client.clone(),
            node_url,
        })
    }
}

/// Client for a single store node.
#[derive(Debug, Clone)]
pub struct XtdbClient {
    client: reqwest::Client,
    node_url: Url,
}

impl XtdbClient {
    /// Root URL of this node.
    pub const fn node_url(&self) -> &Url {
        &self.node_url
    }

    fn endpoint(&self, name: &str) -> Result<Url, StoreError> {
        join(&self.node_url, &[name])
            .ok_or_else(|| StoreError::Transport(format!("cannot extend {}", self.node_url)))
    }
}

impl StoreFacade for XtdbClient {
    async fn status(&self) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(self.endpoint("status")?)
            .header(ACCEPT, JSON)
            .send()
            .await
            .map_err(transport)?;

        let code = response.status();
        let body = response.text().await.map_err(transport)?;
        status_document(code.as_u16(), code.is_success(), &body)
    }

    async fn query(
        &self,
        query: &str,
        valid_time: DateTime<Utc>,
    ) -> Result<Vec<Vec<Value>>, StoreError> {
        let mut url = self.endpoint("query")?;
        url.query_pairs_mut().append_pair(
            "valid-time",
            &valid_time.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, EDN)
            .header(ACCEPT, JSON)
            .body(query.to_owned())
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    async fn history(
        &self,
        id: &str,
        with_docs: bool,
        with_corrections: bool,
    ) -> Result<Vec<Value>, StoreError> {
        let url = self.endpoint("entity")?;
        let response = self
            .client
            .get(url)
            .query(&history_params(id, with_docs, with_corrections))
            .header(ACCEPT, JSON)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }
}

/// Append path segments to `base`, dropping a trailing empty segment.
fn join(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}

fn history_params(
    id: &str,
    with_docs: bool,
    with_corrections: bool,
) -> [(&'static str, String); 5] {
    [
        ("eid", id.to_owned()),
        ("history", "true".to_owned()),
        ("sortOrder", "asc".to_owned()),
        ("withDocs", with_docs.to_string()),
        ("withCorrections", with_corrections.to_string()),
    ]
}

/// Interpret a status response. A JSON object is returned as-is even on a
/// non-success code, so an `{"error": ..}` body becomes a structured
/// unavailability instead of a bare HTTP error.
fn status_document(code: u16, success: bool, body: &str) -> Result<Value, StoreError> {
    match serde_json::from_str::<Value>(body) {
        Ok(document @ Value::Object(_)) => Ok(document),
        Ok(document) if success => Ok(document),
        Err(e) if success => Err(StoreError::Decode(format!("status response: {e}"))),
        _ => Err(StoreError::Http {
            status: code,
            body: body.to_owned(),
        }),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StoreError> {
    let code = response.status();
    if !code.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(StoreError::Http {
            status: code.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

fn transport(error: reqwest::Error) -> StoreError {
    StoreError::Transport(error.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn connector(base: &str) -> XtdbConnector {
        XtdbConnector::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn node_url_is_under_gateway_segment() {
        let client = connector("http://localhost:3000").connect("0").unwrap();
        assert_eq!(client.node_url().as_str(), "http://localhost:3000/_xtdb/0");
        assert_eq!(
            client.endpoint("status").unwrap().as_str(),
            "http://localhost:3000/_xtdb/0/status"
        );
    }

    #[test]
    fn base_path_and_trailing_slash_are_kept_once() {
        let client = connector("http://store.local/api/").connect("7").unwrap();
        assert_eq!(client.node_url().as_str(), "http://store.local/api/_xtdb/7");
    }

    #[test]
    fn node_names_are_percent_encoded() {
        let client = connector("http://localhost:3000").connect("a/b c").unwrap();
        assert_eq!(
            client.node_url().as_str(),
            "http://localhost:3000/_xtdb/a%2Fb%20c"
        );
    }

    #[test]
    fn invalid_base_urls_are_rejected() {
        assert!(matches!(
            XtdbConnector::new("not a url", Duration::from_secs(1)),
            Err(XtdbError::InvalidUrl { .. })
        ));
        assert!(matches!(
            XtdbConnector::new("mailto:ops@example.com", Duration::from_secs(1)),
            Err(XtdbError::NotABase(_))
        ));
    }

    #[test]
    fn history_asks_for_ascending_full_history() {
        let params = history_params("Host|internet|1.1.1.1", true, false);
        assert_eq!(params[0], ("eid", "Host|internet|1.1.1.1".to_owned()));
        assert_eq!(params[2], ("sortOrder", "asc".to_owned()));
        assert_eq!(params[3], ("withDocs", "true".to_owned()));
        assert_eq!(params[4], ("withCorrections", "false".to_owned()));
    }

    #[test]
    fn status_error_body_is_kept_structured() {
        let document = status_document(404, false, r#"{"error": "node 9 not found"}"#).unwrap();
        assert_eq!(document["error"], "node 9 not found");
    }

    #[test]
    fn status_garbage_is_an_error() {
        assert!(matches!(
            status_document(502, false, "<html>bad gateway</html>"),
            Err(StoreError::Http { status: 502, .. })
        ));
        assert!(matches!(
            status_document(200, true, "<html>"),
            Err(StoreError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        let connector = XtdbConnector::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let client = connector.connect("0").unwrap();
        assert!(matches!(client.status().await, Err(StoreError::Transport(_))));
    }
}
