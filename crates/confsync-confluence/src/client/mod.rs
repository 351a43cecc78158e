//! Confluence REST API client.
//!
//! Provides sync HTTP client for the Confluence Server/Data Center REST
//! API with basic (username + API token) authentication.

mod attachments;
mod pages;
mod properties;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use ureq::Agent;

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{ChildPage, RemoteAttachment, RemotePage};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create a client with basic authentication.
    ///
    /// # Arguments
    /// * `base_url` - Confluence server base URL
    /// * `username` - Account name (email for Cloud instances)
    /// * `api_token` - API token or password
    #[must_use]
    pub fn new(base_url: &str, username: &str, api_token: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = BASE64_STANDARD.encode(format!("{username}:{api_token}"));

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: format!("Basic {credentials}"),
        }
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read a response body, mapping error statuses to [`ConfluenceError`].
    pub(crate) fn check_status(
        response: ureq::http::Response<ureq::Body>,
    ) -> Result<ureq::Body, ConfluenceError> {
        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body_reader)
    }
}

impl ConfluenceApi for ConfluenceClient {
    fn page_id_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<String>, ConfluenceError> {
        self.search_page_id(space_key, title)
    }

    fn page_by_id(&self, content_id: &str) -> Result<RemotePage, ConfluenceError> {
        self.get_page(content_id)
    }

    fn add_page(
        &self,
        space_key: &str,
        ancestor_id: &str,
        title: &str,
        content: &str,
        version_message: Option<&str>,
    ) -> Result<String, ConfluenceError> {
        self.create_page(space_key, ancestor_id, title, content, version_message)
    }

    fn update_page(
        &self,
        content_id: &str,
        parent_id: Option<&str>,
        title: &str,
        content: &str,
        version: u32,
        version_message: Option<&str>,
    ) -> Result<(), ConfluenceError> {
        self.put_page(content_id, parent_id, title, content, version, version_message)
    }

    fn delete_page(&self, content_id: &str) -> Result<(), ConfluenceError> {
        self.remove_content(content_id)
    }

    fn child_pages(&self, content_id: &str) -> Result<Vec<ChildPage>, ConfluenceError> {
        self.list_child_pages(content_id)
    }

    fn attachments(&self, content_id: &str) -> Result<Vec<RemoteAttachment>, ConfluenceError> {
        self.list_attachments(content_id)
    }

    fn attachment_by_filename(
        &self,
        content_id: &str,
        filename: &str,
    ) -> Result<Option<RemoteAttachment>, ConfluenceError> {
        let attachments = self.list_attachments(content_id)?;
        Ok(attachments.into_iter().find(|a| a.title == filename))
    }

    fn add_attachment(
        &self,
        content_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<String, ConfluenceError> {
        self.upload_attachment(content_id, None, filename, data)
    }

    fn update_attachment(
        &self,
        content_id: &str,
        attachment_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<(), ConfluenceError> {
        self.upload_attachment(content_id, Some(attachment_id), filename, data)?;
        Ok(())
    }

    fn delete_attachment(&self, attachment_id: &str) -> Result<(), ConfluenceError> {
        self.remove_content(attachment_id)
    }

    fn property_by_key(
        &self,
        content_id: &str,
        key: &str,
    ) -> Result<Option<String>, ConfluenceError> {
        self.get_property(content_id, key)
    }

    fn set_property(
        &self,
        content_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfluenceError> {
        self.create_property(content_id, key, value)
    }

    fn delete_property(&self, content_id: &str, key: &str) -> Result<(), ConfluenceError> {
        self.remove_property(content_id, key)
    }
}
