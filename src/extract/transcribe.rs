use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::Attachment;
use crate::error::ChopError;

/// Transcribe audio or video through an OpenAI-compatible Whisper endpoint
///
/// Asks for `response_format=text`, so the body is the transcript itself.
pub async fn transcribe(
    client: &Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    attachment: &Attachment,
) -> Result<String, ChopError> {
    let part = Part::bytes(attachment.data.to_vec())
        .file_name(attachment.file_name.clone())
        .mime_str(&attachment.content_type)?;
    let form = Form::new()
        .part("file", part)
        .text("model", model.to_string())
        .text("response_format", "text");

    debug!(
        "Sending {} bytes to {} for transcription",
        attachment.data.len(),
        model
    );

    let response = client
        .post(format!("{}/openai/v1/audio/transcriptions", base_url))
        .header("Authorization", format!("Bearer {}", api_key))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChopError::ProviderStatus {
            provider: "Groq Whisper".to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.text().await?)
}
