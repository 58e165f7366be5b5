use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};

use super::Attachment;
use crate::error::ChopError;

/// Performs OCR on an image attachment using the OCR.space API
///
/// # Returns
/// The parsed text of the first result, or an empty string when the
/// service found no text
///
/// # Errors
/// Returns an error if the request fails or the service answers with a
/// non-success status
pub async fn ocr_space(
    client: &Client,
    url: &str,
    api_key: &str,
    attachment: &Attachment,
) -> Result<String, ChopError> {
    let part = Part::bytes(attachment.data.to_vec())
        .file_name(attachment.file_name.clone())
        .mime_str(&attachment.content_type)?;
    let form = Form::new().part("file", part).text("OCREngine", "2");

    debug!("Sending OCR request to OCR.space");

    let response = client
        .post(url)
        .header("apikey", api_key)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChopError::ProviderStatus {
            provider: "OCR.space".to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let response_body: Value = response.json().await?;
    debug!("OCR.space response: {:?}", response_body);

    Ok(response_body["ParsedResults"][0]["ParsedText"]
        .as_str()
        .unwrap_or_default()
        .to_string())
}

/// Performs OCR on raw image bytes using the Google Cloud Vision API
///
/// # Returns
/// All detected text, or an empty string when nothing was detected
///
/// # Errors
/// Returns an error if the request fails or the API answers with a
/// non-success status
pub async fn ocr_google_vision(
    client: &Client,
    base_url: &str,
    api_key: &str,
    image_data: &[u8],
) -> Result<String, ChopError> {
    let request_body = json!({
        "requests": [{
            "image": {
                "content": STANDARD.encode(image_data)
            },
            "features": [{
                "type": "TEXT_DETECTION"
            }]
        }]
    });

    debug!("Sending OCR request to Google Vision API");

    let response = client
        .post(format!("{}/v1/images:annotate", base_url))
        .query(&[("key", api_key)])
        .header("Accept-Encoding", "identity")
        .json(&request_body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChopError::ProviderStatus {
            provider: "Google Vision".to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let response_body: Value = response.json().await?;
    debug!("Google Vision API response: {:?}", response_body);

    // The API returns all detected text in the full annotation
    let text = response_body["responses"][0]["fullTextAnnotation"]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    debug!("Extracted text from image: {} characters", text.len());

    Ok(text)
}
