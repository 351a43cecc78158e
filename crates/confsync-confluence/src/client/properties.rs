//! Content property operations for Confluence API.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;

#[derive(Debug, Deserialize)]
struct PropertyDto {
    value: String,
}

impl ConfluenceClient {
    /// Read a property value. Returns `None` when the key is absent.
    pub(crate) fn get_property(
        &self,
        content_id: &str,
        key: &str,
    ) -> Result<Option<String>, ConfluenceError> {
        let url = format!("{}/content/{}/property/{}", self.api_url(), content_id, key);

        info!("Getting property '{}' of {}", key, content_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }

        let prop: PropertyDto = Self::check_status(response)?.read_json()?;
        Ok(Some(prop.value))
    }

    /// Create a property. The key must not already exist.
    pub(crate) fn create_property(
        &self,
        content_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfluenceError> {
        let url = format!("{}/content/{}/property", self.api_url(), content_id);

        let payload = json!({"key": key, "value": value});

        info!("Setting property '{}' on {}", key, content_id);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        Self::check_status(response)?;
        Ok(())
    }

    /// Delete a property. Deleting an absent key succeeds.
    pub(crate) fn remove_property(
        &self,
        content_id: &str,
        key: &str,
    ) -> Result<(), ConfluenceError> {
        let url = format!("{}/content/{}/property/{}", self.api_url(), content_id, key);

        info!("Deleting property '{}' of {}", key, content_id);

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.auth_header)
            .call()?;

        if response.status().as_u16() == 404 {
            return Ok(());
        }

        Self::check_status(response)?;
        Ok(())
    }
}
