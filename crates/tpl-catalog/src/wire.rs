//! Request and response shapes of the catalog HTTP API

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tpl_core::SearchResultSet;

use crate::client::CatalogPage;
use crate::error::{CatalogError, Result};

const DEFAULT_PAGE_ERROR: &str = "Error while fetching templates";

#[derive(Debug, Serialize)]
pub(crate) struct KeywordQuery<'a> {
    pub keyword: &'a str,
    pub business_name: &'a str,
    pub page_builder: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageQuery<'a> {
    pub business_name: &'a str,
    pub page_builder: &'a str,
    pub per_page: u32,
    pub page: u32,
}

/// `{ success, data: { data: <payload> } }`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<EnvelopeData>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnvelopeData {
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PagePayload {
    #[serde(default)]
    result: Option<SearchResultSet>,
    #[serde(default, rename = "lastPage")]
    last_page: Option<u32>,
}

impl Envelope {
    fn into_payload(self) -> Option<Value> {
        self.data.and_then(|d| d.data)
    }

    fn service_error(self) -> CatalogError {
        let message = match self.into_payload() {
            Some(Value::String(message)) if !message.is_empty() => message,
            _ => DEFAULT_PAGE_ERROR.to_string(),
        };
        CatalogError::Service(message)
    }
}

/// Keyword search tolerates a missing `success` flag; only an explicit
/// `false` is an error. A missing list means no results.
pub(crate) fn decode_keyword_response(body: &[u8]) -> Result<SearchResultSet> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    if envelope.success == Some(false) {
        return Err(envelope.service_error());
    }

    match envelope.into_payload() {
        Some(Value::Null) | None => Ok(SearchResultSet::default()),
        Some(payload) => Ok(serde_json::from_value(payload)?),
    }
}

/// Page listing requires `success: true`
pub(crate) fn decode_page_response(body: &[u8]) -> Result<CatalogPage> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    if envelope.success != Some(true) {
        return Err(envelope.service_error());
    }

    let payload = match envelope.into_payload() {
        Some(Value::Null) | None => {
            return Ok(CatalogPage {
                buckets: SearchResultSet::default(),
                last_page: 1,
            });
        }
        Some(payload) => serde_json::from_value::<PagePayload>(payload)?,
    };

    Ok(CatalogPage {
        buckets: payload.result.unwrap_or_default(),
        last_page: payload.last_page.filter(|p| *p > 0).unwrap_or(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_response() {
        let body = br#"{"data": {"data": [
            {"match": "recommended", "designs": [{"uuid": "a"}]},
            {"match": "generic", "designs": [{"uuid": "b"}, {"uuid": "c"}]}
        ]}}"#;

        let set = decode_keyword_response(body).unwrap();
        assert_eq!(set.buckets.len(), 2);
        assert_eq!(set.design_count(), 3);
    }

    #[test]
    fn test_keyword_response_without_list() {
        assert!(decode_keyword_response(br#"{"data": {}}"#).unwrap().is_empty());
        assert!(decode_keyword_response(br#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn test_keyword_response_reported_failure() {
        let err = decode_keyword_response(br#"{"success": false, "data": {"data": "quota"}}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "quota");
    }

    #[test]
    fn test_page_response() {
        let body = br#"{"success": true, "data": {"data": {
            "result": [{"match": "generic", "designs": [{"uuid": "g1"}]}],
            "lastPage": 3
        }}}"#;

        let page = decode_page_response(body).unwrap();
        assert_eq!(page.last_page, 3);
        assert_eq!(page.buckets.design_count(), 1);
    }

    #[test]
    fn test_page_response_defaults_last_page() {
        let body = br#"{"success": true, "data": {"data": {"result": [], "lastPage": 0}}}"#;
        assert_eq!(decode_page_response(body).unwrap().last_page, 1);
    }

    #[test]
    fn test_page_response_requires_success() {
        let err = decode_page_response(br#"{"data": {"data": {"result": []}}}"#).unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_PAGE_ERROR);

        let err = decode_page_response(br#"{"success": false, "data": {"data": "Catalog offline"}}"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Service(ref m) if m == "Catalog offline"));
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let err = decode_keyword_response(b"<html>").unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }
}
