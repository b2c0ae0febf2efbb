use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::nested_text::NestedText;

// Client for the external OCR service that parses uploaded shipping labels.
// The caller treats every failure as "no confident match", so the public
// surface is Option rather than Result.
#[derive(Clone)]
pub struct OcrClient {
    http_client: Client,
    base_url: String,
    api_key: SecretString,
}

impl OcrClient {
    pub fn new(base_url: String, api_key: SecretString, timeout: u64) -> OcrClient {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .unwrap();

        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    // Uploads the label image and returns the first parsed result as nested
    // text, or None when the service fails or returns nothing usable
    #[tracing::instrument("Extracting text from shipping label", skip_all)]
    pub async fn parse_image(&self, file_name: String, content: Vec<u8>) -> Option<NestedText> {
        match self.try_parse_image(file_name, content).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("OCR request failed: {:?}", e);
                None
            }
        }
    }

    async fn try_parse_image(
        &self,
        file_name: String,
        content: Vec<u8>,
    ) -> Result<Option<NestedText>, anyhow::Error> {
        let url = format!("{}/parse/image", self.base_url);

        let file_part = Part::bytes(content).file_name(file_name);
        let form = Form::new()
            .text("apikey", self.api_key.expose_secret().to_string())
            .text("language", "eng")
            .text("isTable", "true")
            .text("OCREngine", "2")
            .part("file", file_part);

        let response: serde_json::Value = self
            .http_client
            .post(url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first_result = match response.get("ParsedResults").and_then(|r| r.get(0)) {
            Some(result) => result.clone(),
            None => return Ok(None),
        };

        Ok(serde_json::from_value::<NestedText>(first_result).ok())
    }
}
