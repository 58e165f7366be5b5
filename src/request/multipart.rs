use bytes::Bytes;
use futures::stream;
use multer::Multipart;

use crate::error::ChopError;
use crate::extract::Attachment;

/// Fields of a generation form submission
#[derive(Debug, Default)]
pub struct FormFields {
    pub text: Option<String>,
    pub platforms: Option<String>,
    pub files: Vec<Attachment>,
}

/// Read a `multipart/form-data` body.
///
/// Only the first `text` and `platforms` values count. `files` parts
/// without a file name are ignored, as are unknown fields.
pub async fn read_form(content_type: &str, body: Bytes) -> Result<FormFields, ChopError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| ChopError::MalformedRequest(e.to_string()))?;
    let body_stream = stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = Multipart::new(body_stream, boundary);

    let mut fields = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ChopError::MalformedRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_default();
        let data = field
            .bytes()
            .await
            .map_err(|e| ChopError::MalformedRequest(e.to_string()))?;

        match (name.as_str(), file_name) {
            ("files", Some(file_name)) => {
                fields.files.push(Attachment::new(file_name, content_type, data));
            }
            ("text", None) if fields.text.is_none() => {
                fields.text = Some(String::from_utf8_lossy(&data).into_owned());
            }
            ("platforms", None) if fields.platforms.is_none() => {
                fields.platforms = Some(String::from_utf8_lossy(&data).into_owned());
            }
            _ => {}
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-CHOP-BOUNDARY";

    fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    fn body(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Bytes {
        let mut out = String::new();
        for (name, file, value) in parts {
            out.push_str(&format!("--{}\r\n", BOUNDARY));
            match file {
                Some((file_name, ct)) => {
                    out.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, ct
                    ));
                }
                None => {
                    out.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        name
                    ));
                }
            }
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{}--\r\n", BOUNDARY));
        Bytes::from(out)
    }

    #[tokio::test]
    async fn test_read_form_fields_and_files() {
        let body = body(&[
            ("text", None, "  Hello world  "),
            ("platforms", None, "twitter,reddit"),
            ("files", Some(("notes.txt", "text/plain")), "attached notes"),
            ("text", None, "ignored second text"),
            ("files", None, "not a file"),
        ]);

        let fields = read_form(&content_type(), body).await.unwrap();
        assert_eq!(fields.text.as_deref(), Some("  Hello world  "));
        assert_eq!(fields.platforms.as_deref(), Some("twitter,reddit"));
        assert_eq!(fields.files.len(), 1);
        assert_eq!(fields.files[0].file_name, "notes.txt");
        assert_eq!(fields.files[0].content_type, "text/plain");
        assert_eq!(&fields.files[0].data[..], b"attached notes");
    }

    #[tokio::test]
    async fn test_read_form_without_boundary() {
        let result = read_form("multipart/form-data", Bytes::new()).await;
        assert!(matches!(result, Err(ChopError::MalformedRequest(_))));
    }
}
