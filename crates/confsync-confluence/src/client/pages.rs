//! Page operations for Confluence API.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{ChildPage, RemotePage};

/// Unreserved characters per RFC 3986: A-Z a-z 0-9 - . _ ~
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Page size for paginated listings.
pub(crate) const PAGE_LIMIT: usize = 100;

/// Percent-encode a query parameter value.
fn encode_query(input: &str) -> String {
    percent_encode(input.as_bytes(), QUERY_ENCODE_SET).to_string()
}

#[derive(Debug, Deserialize)]
struct PageDto {
    id: String,
    title: String,
    body: Option<BodyDto>,
    version: VersionDto,
}

#[derive(Debug, Deserialize)]
struct BodyDto {
    storage: Option<StorageDto>,
}

#[derive(Debug, Deserialize)]
struct StorageDto {
    value: String,
}

#[derive(Debug, Deserialize)]
struct VersionDto {
    number: u32,
}

#[derive(Debug, Deserialize)]
struct CreatedDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ContentListDto {
    results: Vec<ContentRefDto>,
}

#[derive(Debug, Deserialize)]
struct ContentRefDto {
    id: String,
    title: String,
}

impl From<PageDto> for RemotePage {
    fn from(dto: PageDto) -> Self {
        let content = dto
            .body
            .and_then(|b| b.storage)
            .map(|s| s.value)
            .unwrap_or_default();
        RemotePage {
            id: dto.id,
            title: dto.title,
            content,
            version: dto.version.number,
        }
    }
}

impl ConfluenceClient {
    /// Find a page ID by space key and title.
    pub(crate) fn search_page_id(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<String>, ConfluenceError> {
        let url = format!(
            "{}/content?spaceKey={}&title={}&limit=1",
            self.api_url(),
            encode_query(space_key),
            encode_query(title)
        );

        info!("Searching for page '{}' in space {}", title, space_key);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let list: ContentListDto = Self::check_status(response)?.read_json()?;
        Ok(list.results.into_iter().next().map(|r| r.id))
    }

    /// Get page with storage body and version.
    pub(crate) fn get_page(&self, content_id: &str) -> Result<RemotePage, ConfluenceError> {
        let url = format!(
            "{}/content/{}?expand=body.storage,version",
            self.api_url(),
            content_id
        );

        info!("Getting page {}", content_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let page: PageDto = Self::check_status(response)?.read_json()?;
        Ok(page.into())
    }

    /// Create a page under an ancestor. Returns the new content ID.
    pub(crate) fn create_page(
        &self,
        space_key: &str,
        ancestor_id: &str,
        title: &str,
        content: &str,
        message: Option<&str>,
    ) -> Result<String, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "ancestors": [{"id": ancestor_id}],
            "body": {
                "storage": {
                    "value": content,
                    "representation": "storage"
                }
            }
        });

        if let Some(msg) = message {
            payload["version"] = json!({"number": 1, "message": msg});
        }

        info!(
            "Creating page '{}' in space {} under {}",
            title, space_key, ancestor_id
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let created: CreatedDto = Self::check_status(response)?.read_json()?;
        info!("Created page '{}' (id={})", title, created.id);
        Ok(created.id)
    }

    /// Write a page to the given version number.
    pub(crate) fn put_page(
        &self,
        content_id: &str,
        parent_id: Option<&str>,
        title: &str,
        content: &str,
        version: u32,
        message: Option<&str>,
    ) -> Result<(), ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), content_id);

        let mut payload = json!({
            "type": "page",
            "title": title,
            "body": {
                "storage": {
                    "value": content,
                    "representation": "storage"
                }
            },
            "version": {"number": version}
        });

        if let Some(parent) = parent_id {
            payload["ancestors"] = json!([{"id": parent}]);
        }

        if let Some(msg) = message {
            payload["version"]["message"] = json!(msg);
        }

        info!("Updating page {} to version {}", content_id, version);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        Self::check_status(response)?;
        Ok(())
    }

    /// Delete a content record (page or attachment).
    pub(crate) fn remove_content(&self, content_id: &str) -> Result<(), ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), content_id);

        info!("Deleting content {}", content_id);

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.auth_header)
            .call()?;

        Self::check_status(response)?;
        Ok(())
    }

    /// List all direct child pages, following pagination.
    pub(crate) fn list_child_pages(
        &self,
        content_id: &str,
    ) -> Result<Vec<ChildPage>, ConfluenceError> {
        info!("Listing child pages of {}", content_id);

        let mut children = Vec::new();
        let mut start = 0;

        loop {
            let url = format!(
                "{}/content/{}/child/page?start={}&limit={}",
                self.api_url(),
                content_id,
                start,
                PAGE_LIMIT
            );

            let response = self
                .agent
                .get(&url)
                .header("Authorization", &self.auth_header)
                .header("Accept", "application/json")
                .call()?;

            let list: ContentListDto = Self::check_status(response)?.read_json()?;
            let count = list.results.len();

            children.extend(list.results.into_iter().map(|r| ChildPage {
                id: r.id,
                title: r.title,
            }));

            if count < PAGE_LIMIT {
                return Ok(children);
            }
            start += count;
        }
    }
}
