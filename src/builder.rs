use std::path::PathBuf;
use std::time::Duration;

use crate::config::ChopConfig;
use crate::error::ChopError;
use crate::extract::Attachment;
use crate::model::{parse_platforms, GenerateRequest, GenerateResponse, Platform};
use crate::pipeline::Repurposer;
use crate::request::merge_text;

/// Builder for configuring and running a repurposing job
#[derive(Debug, Default)]
pub struct RepurposeBuilder {
    text: Option<String>,
    platforms: Vec<String>,
    attachments: Vec<Attachment>,
    files: Vec<PathBuf>,
    config: Option<ChopConfig>,
    timeout: Option<Duration>,
    api_key: Option<String>,
    model: Option<String>,
    offline: bool,
}

impl RepurposeBuilder {
    /// Set the source text
    ///
    /// # Example
    /// ```
    /// use chop::Repurposer;
    ///
    /// let builder = Repurposer::builder()
    ///     .text("We shipped offline mode today. Here is how it works.");
    /// ```
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add raw platform names
    ///
    /// Names are matched case-insensitively and unknown names are
    /// ignored, the same way request bodies are treated.
    ///
    /// # Example
    /// ```
    /// use chop::Repurposer;
    ///
    /// let builder = Repurposer::builder()
    ///     .text("Release notes")
    ///     .platforms(["twitter", "LinkedIn"]);
    /// ```
    pub fn platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms.extend(platforms.into_iter().map(Into::into));
        self
    }

    /// Add a single platform
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platforms.push(platform.as_str().to_string());
        self
    }

    /// Attach an in-memory file whose text is appended to the source
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Attach a local file, read when the job runs
    ///
    /// # Example
    /// ```
    /// use chop::Repurposer;
    ///
    /// let builder = Repurposer::builder()
    ///     .file("/path/to/notes.md")
    ///     .platforms(["reddit"]);
    /// ```
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Use an explicit configuration instead of loading one
    pub fn config(mut self, config: ChopConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a timeout for outbound HTTP requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the Groq API key directly
    ///
    /// This takes precedence over `GROQ_API_KEY` and config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Try this Groq model before the built-in candidates
    ///
    /// # Example
    /// ```
    /// use chop::Repurposer;
    ///
    /// let builder = Repurposer::builder()
    ///     .text("Release notes")
    ///     .platforms(["youtube"])
    ///     .model("llama-3.1-8b-instant");
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Never call a provider; every post comes from templates
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Build and run the job
    ///
    /// # Returns
    /// A `GenerateResponse` with one post per requested platform
    ///
    /// # Errors
    /// Returns `ChopError` if:
    /// - The source text (including attachment text) is empty
    /// - None of the requested platforms is supported
    /// - An attached file cannot be read
    /// - Configuration cannot be loaded
    ///
    /// Provider failures are not errors: missing posts come from templates.
    ///
    /// # Example
    /// ```no_run
    /// # use chop::Repurposer;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let response = Repurposer::builder()
    ///     .text("Our team moved the build to a new CI provider.")
    ///     .platforms(["twitter", "linkedin"])
    ///     .build()
    ///     .await?;
    /// assert_eq!(response.posts.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<GenerateResponse, ChopError> {
        let mut config = match self.config {
            Some(config) => config,
            None => ChopConfig::load()?,
        };

        if let Some(key) = self.api_key {
            config.extraction.transcription_api_key = Some(key.clone());
            config.groq.api_key = Some(key);
        }
        if let Some(model) = self.model {
            config.groq.model = Some(model);
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout.as_secs().max(1);
        }

        let repurposer = if self.offline {
            Repurposer::offline(&config)?
        } else {
            Repurposer::from_config(&config)?
        };

        let mut attachments = self.attachments;
        for path in &self.files {
            attachments.push(Attachment::from_path(path).await?);
        }

        let base = self.text.unwrap_or_default();
        let text = if attachments.is_empty() {
            base
        } else {
            let extracted = repurposer.extractor().extract_all(&attachments).await;
            merge_text(&base, &extracted)
        };

        let request = GenerateRequest::new(&text, parse_platforms(&self.platforms))?;
        Ok(repurposer.respond(&request).await)
    }
}

impl Repurposer {
    /// Creates a new builder for a repurposing job
    ///
    /// # Example
    /// ```
    /// use chop::Repurposer;
    ///
    /// let builder = Repurposer::builder();
    /// ```
    pub fn builder() -> RepurposeBuilder {
        RepurposeBuilder::default()
    }
}
