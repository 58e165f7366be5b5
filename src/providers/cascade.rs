use log::{debug, warn};
use std::future::Future;

use crate::error::ChopError;

/// Ordered, de-duplicated model list.
///
/// The override comes first, then configured extras, then built-in
/// fallbacks. Blank names are skipped and the first occurrence of a name
/// keeps its position.
pub fn model_candidates(
    preferred: Option<&str>,
    extra: &[String],
    builtin: &[&str],
) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    let names = preferred
        .into_iter()
        .chain(extra.iter().map(String::as_str))
        .chain(builtin.iter().copied());

    for name in names {
        let name = name.trim();
        if !name.is_empty() && !candidates.iter().any(|c| c == name) {
            candidates.push(name.to_string());
        }
    }

    candidates
}

/// Try each candidate in order until one succeeds.
///
/// Attempts run sequentially. The first `Ok` short-circuits; when every
/// attempt fails the last error is returned. `label` names the cascade in
/// logs and in the error for an empty candidate list.
pub async fn first_success<T, F, Fut>(
    label: &str,
    candidates: &[String],
    mut attempt: F,
) -> Result<T, ChopError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, ChopError>>,
{
    let mut last_error = None;

    for (index, candidate) in candidates.iter().enumerate() {
        debug!(
            "{}: trying {} ({}/{})",
            label,
            candidate,
            index + 1,
            candidates.len()
        );

        match attempt(candidate.clone()).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("{}: {} failed: {}", label, candidate, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ChopError::NoModelCandidates(label.to_string())))
}
