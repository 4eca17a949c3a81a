use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use crate::config::LookupConfig;

const FIELD_IDS: &str = "short_description,website_url";
const API_KEY_HEADER: &str = "X-Cb-User-Key";

/// The two organization fields the pipeline asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgProfile {
    pub website_url: String,
    pub short_description: String,
}

#[derive(Debug)]
pub enum LookupError {
    Http(reqwest::Error),
    Timeout,
    Status(StatusCode),
    Decode(serde_json::Error),
    MissingProperties,
}

impl LookupError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() { LookupError::Timeout } else { LookupError::Http(err) }
    }
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Http(err) => write!(f, "http error: {err}"),
            LookupError::Timeout => write!(f, "request timed out"),
            LookupError::Status(status) => write!(f, "lookup returned {status}"),
            LookupError::Decode(err) => write!(f, "decode error: {err}"),
            LookupError::MissingProperties => write!(f, "response has no properties object"),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::Http(err) => Some(err),
            LookupError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEntity {
    properties: Option<ApiProperties>,
}

#[derive(Debug, Deserialize)]
struct ApiProperties {
    short_description: Option<String>,
    website_url: Option<String>,
}

/// Client for `GET <base>/entities/organizations/<key>`.
pub struct LookupClient<'a> {
    http: &'a HttpClient,
    cfg: &'a LookupConfig,
}

impl<'a> LookupClient<'a> {
    pub fn new(http: &'a HttpClient, cfg: &'a LookupConfig) -> Self {
        LookupClient { http, cfg }
    }

    fn endpoint(&self, key: &str) -> String {
        format!(
            "{}/entities/organizations/{}?field_ids={}",
            self.cfg.base_url.trim_end_matches('/'),
            key,
            FIELD_IDS
        )
    }

    /// One attempt, no retry; bounded by `cfg.timeout`.
    pub async fn lookup(&self, key: &str) -> Result<OrgProfile, LookupError> {
        let response = self
            .http
            .get(self.endpoint(key))
            .header(API_KEY_HEADER, &self.cfg.api_key)
            .timeout(self.cfg.timeout)
            .send()
            .await
            .map_err(LookupError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }
        let bytes = response.bytes().await.map_err(LookupError::from_reqwest)?;
        parse_entity(&bytes)
    }
}

/// A missing field inside `properties` reads as an empty string.
fn parse_entity(bytes: &[u8]) -> Result<OrgProfile, LookupError> {
    let entity: ApiEntity = serde_json::from_slice(bytes).map_err(LookupError::Decode)?;
    let props = entity.properties.ok_or(LookupError::MissingProperties)?;
    Ok(OrgProfile {
        website_url: props.website_url.unwrap_or_default(),
        short_description: props.short_description.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parse_full_entity() {
        let body = br#"{"properties": {"short_description": "Widgets", "website_url": "https://acme.example"}}"#;
        let got = parse_entity(body).unwrap();
        assert_eq!(got, OrgProfile { website_url: "https://acme.example".into(), short_description: "Widgets".into() });
    }

    #[test]
    fn parse_missing_fields_default_to_empty() {
        let got = parse_entity(br#"{"properties": {}}"#).unwrap();
        assert_eq!(got.website_url, "");
        assert_eq!(got.short_description, "");
    }

    #[test]
    fn parse_without_properties_fails() {
        assert!(matches!(parse_entity(br#"{"cards": {}}"#), Err(LookupError::MissingProperties)));
        assert!(matches!(parse_entity(b"<html>"), Err(LookupError::Decode(_))));
    }

    #[test]
    fn status_error_display() {
        assert_eq!(LookupError::Status(StatusCode::NOT_FOUND).to_string(), "lookup returned 404 Not Found");
    }

    #[tokio::test]
    async fn sends_key_header_and_field_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entities/organizations/acme-corp"))
            .and(query_param("field_ids", FIELD_IDS))
            .and(header(API_KEY_HEADER, "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {"short_description": "Widgets", "website_url": "https://acme.example"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = HttpClient::new();
        let cfg = LookupConfig::for_base(&server.uri(), "secret");
        let got = LookupClient::new(&http, &cfg).lookup("acme-corp").await.unwrap();
        assert_eq!(got.short_description, "Widgets");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let http = HttpClient::new();
        let cfg = LookupConfig::for_base(&server.uri(), "secret");
        let err = LookupClient::new(&http, &cfg).lookup("acme-corp").await.unwrap_err();
        assert!(matches!(err, LookupError::Status(s) if s == StatusCode::TOO_MANY_REQUESTS));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(500)))
            .mount(&server)
            .await;

        let http = HttpClient::new();
        let mut cfg = LookupConfig::for_base(&server.uri(), "secret");
        cfg.timeout = std::time::Duration::from_millis(50);
        let err = LookupClient::new(&http, &cfg).lookup("acme-corp").await.unwrap_err();
        assert!(matches!(err, LookupError::Timeout), "got {err:?}");
        assert_eq!(err.to_string(), "request timed out");
    }
}
