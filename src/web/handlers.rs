use crate::app::App;
use crate::models::{UploadResult, UploadedFile};
use crate::{views, Error, Result};
use axum::extract::{Multipart, Query, State};
use axum::response::Html;
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Multipart field carrying uploaded files.
pub const FILES_FIELD: &str = "files";

pub async fn index() -> Result<Html<String>> {
    Ok(Html(views::index()?))
}

/// Read the next `files` part that carries a file name, skipping everything else.
async fn next_file(multipart: &mut Multipart) -> Result<Option<UploadedFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Failed to parse multipart data: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        let Some(name) = field.file_name().map(str::to_string) else {
            debug!("Ignoring files part without a file name");
            continue;
        };

        let content = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(format!("Failed to read {}: {}", name, e)))?;
        return Ok(Some(UploadedFile::new(name, content)));
    }
    Ok(None)
}

/// Uploaded files in request order, read one part at a time as the stream is polled.
fn uploaded_files(multipart: Multipart) -> impl Stream<Item = Result<UploadedFile>> {
    stream::unfold(Some(multipart), |state| async move {
        let mut multipart = state?;
        match next_file(&mut multipart).await {
            Ok(Some(file)) => Some((Ok(file), Some(multipart))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })
}

/// Store every uploaded file in order and render the outcome of the last one.
pub async fn upload_files(
    State(app): State<Arc<App>>,
    multipart: Multipart,
) -> Result<Html<String>> {
    let page = match app.upload_files(uploaded_files(multipart)).await? {
        Some(UploadResult {
            success: true,
            locator,
            ..
        }) => {
            let locator = locator.unwrap_or_default();
            info!("Upload complete: {}", locator);
            views::upload_success(&locator)?
        }
        Some(result) => views::upload_error(result.error_message.as_deref())?,
        None => views::upload_error(None)?,
    };
    Ok(Html(page))
}

#[derive(Debug, Deserialize)]
pub struct MirrorQuery {
    pub url: Option<String>,
}

pub async fn upload_file_by_url(
    State(app): State<Arc<App>>,
    Query(query): Query<MirrorQuery>,
) -> Result<String> {
    let url = query.url.unwrap_or_default();
    if url.trim().is_empty() {
        return Err(Error::BadRequest("url must not be blank".to_string()));
    }
    app.mirror(&url).await
}
