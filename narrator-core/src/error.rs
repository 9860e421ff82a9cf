use thiserror::Error;

/// Failures talking to a weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("City '{0}' was not found by the weather provider")]
    CityNotFound(String),

    #[error("{provider} request failed with status {status}: {body}")]
    Status { provider: &'static str, status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse {provider} response: {message}")]
    Parse { provider: &'static str, message: String },

    #[error("Observation for '{0}' carries no coordinates, cannot query history")]
    MissingCoordinates(String),
}

impl ProviderError {
    pub fn parse(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Parse { provider, message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CityNotFound(_))
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
