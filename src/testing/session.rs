//! Session state shared by the steps of one run

use std::collections::BTreeMap;

use crate::common::{Error, Result};

/// Base URL, credential and derived identifiers for a single run
///
/// Only steps mutate this: login stores the credential, and the runner
/// stores the product id returned by create-product.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    auth_token: Option<String>,
    headers: BTreeMap<String, String>,
    last_product_id: Option<String>,
}

impl Session {
    /// Create a session against `base_url`
    ///
    /// The URL must be absolute http(s). A trailing `/` is dropped so API
    /// paths can be appended directly.
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| Error::invalid_base_url(base_url, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::invalid_base_url(
                base_url,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            headers,
            last_product_id: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/api/login`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL built from path segments, each percent-encoded
    ///
    /// Use this when a segment comes from the server (such as a product id)
    /// so `/`, `?` or `#` inside it cannot change the route.
    pub fn segment_url(&self, segments: &[&str]) -> Result<String> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_base_url(&self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| Error::invalid_base_url(&self.base_url, "cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Store the bearer token and attach it to every later request
    pub fn set_credential(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.headers
            .insert("Authorization".to_string(), format!("Bearer {token}"));
        self.auth_token = Some(token);
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Headers to attach to the next request
    pub fn current_headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn set_product_id(&mut self, id: impl Into<String>) {
        self.last_product_id = Some(id.into());
    }

    pub fn last_product_id(&self) -> Option<&str> {
        self.last_product_id.as_deref()
    }
}
