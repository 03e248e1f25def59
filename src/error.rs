use std::path::PathBuf;

use axum::response::{Html, IntoResponse, Response};

/// Failure to obtain the source table. Row-level defects never surface here.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("catalog file {} was not found", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read catalog file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog cache lock poisoned")]
    Poisoned,
}

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for AppError {}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = crate::templates::error_page(self.to_string());
        Html(body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn load_error_renders_error_page() {
        let err: AppError = LoadError::Poisoned.into();
        let resp = err.into_response();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("catalog cache lock poisoned"));
    }
}
