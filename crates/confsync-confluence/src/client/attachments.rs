//! Attachment operations for Confluence API.

use rand::RngExt;
use serde::Deserialize;
use tracing::info;

use super::ConfluenceClient;
use super::pages::PAGE_LIMIT;
use crate::error::ConfluenceError;
use crate::types::RemoteAttachment;

#[derive(Debug, Deserialize)]
struct AttachmentDto {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct AttachmentListDto {
    results: Vec<AttachmentDto>,
}

impl ConfluenceClient {
    /// Upload attachment data.
    ///
    /// With `existing_id` the data of that attachment is replaced,
    /// otherwise a new attachment is created. Returns the attachment ID.
    pub(crate) fn upload_attachment(
        &self,
        content_id: &str,
        existing_id: Option<&str>,
        filename: &str,
        data: &[u8],
    ) -> Result<String, ConfluenceError> {
        let url = if let Some(attachment_id) = existing_id {
            info!(
                "Updating attachment '{}' (id={}) on page {}",
                filename, attachment_id, content_id
            );
            format!(
                "{}/content/{}/child/attachment/{}/data",
                self.api_url(),
                content_id,
                attachment_id
            )
        } else {
            info!("Uploading attachment '{}' to page {}", filename, content_id);
            format!("{}/content/{}/child/attachment", self.api_url(), content_id)
        };

        // Build multipart form data manually
        let boundary = format!("----ConfsyncFormBoundary{:016x}", rand::rng().random::<u64>());
        let mut body = Vec::new();

        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        let mut body_reader = Self::check_status(response)?;

        // Response is a list for new uploads, single object for updates
        if let Some(attachment_id) = existing_id {
            Ok(attachment_id.to_owned())
        } else {
            let list: AttachmentListDto = body_reader.read_json()?;
            list.results
                .into_iter()
                .next()
                .map(|a| a.id)
                .ok_or_else(|| ConfluenceError::HttpResponse {
                    status: 200,
                    body: "Empty attachment response".to_owned(),
                })
        }
    }

    /// List all attachments on a page, following pagination.
    pub(crate) fn list_attachments(
        &self,
        content_id: &str,
    ) -> Result<Vec<RemoteAttachment>, ConfluenceError> {
        info!("Listing attachments of {}", content_id);

        let mut attachments = Vec::new();
        let mut start = 0;

        loop {
            let url = format!(
                "{}/content/{}/child/attachment?start={}&limit={}",
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

            let list: AttachmentListDto = Self::check_status(response)?.read_json()?;
            let count = list.results.len();

            attachments.extend(list.results.into_iter().map(|a| RemoteAttachment {
                id: a.id,
                title: a.title,
            }));

            if count < PAGE_LIMIT {
                return Ok(attachments);
            }
            start += count;
        }
    }
}
