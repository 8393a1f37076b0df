use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    /// A required key or structure is absent from the payload, usually a sign
    /// that the platform's data shape changed upstream.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("invalid video quality {given:?}, available options are: {options}")]
    InvalidQuality { given: String, options: String },
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    /// A mid-resolution fetcher collaborator failed.
    #[error("fetch error: {0}")]
    FetchError(String),
    #[error("no stream data fetcher configured for {0}")]
    MissingFetcher(&'static str),
}
