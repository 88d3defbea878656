//! HTML views rendered by the upload pages.
//!
//! Templates live in `templates/`; askama escapes every interpolated value.

use crate::storage::local::UPLOAD_SUBDIR;
use crate::Result;
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

#[derive(Template)]
#[template(path = "upload_success.html")]
pub struct UploadSuccessTemplate {
    pub uploaded_uri: String,
    pub href: String,
}

#[derive(Template)]
#[template(path = "upload_error.html")]
pub struct UploadErrorTemplate {
    pub message: String,
}

impl UploadSuccessTemplate {
    pub fn new(locator: &str) -> Self {
        Self {
            uploaded_uri: locator.to_string(),
            href: link_for(locator),
        }
    }
}

impl UploadErrorTemplate {
    pub fn new(message: Option<&str>) -> Self {
        Self {
            message: message
                .unwrap_or("The file could not be uploaded.")
                .to_string(),
        }
    }
}

pub fn index() -> Result<String> {
    Ok(IndexTemplate.render()?)
}

/// Success page linking to where the last upload landed.
pub fn upload_success(locator: &str) -> Result<String> {
    Ok(UploadSuccessTemplate::new(locator).render()?)
}

pub fn upload_error(message: Option<&str>) -> Result<String> {
    Ok(UploadErrorTemplate::new(message).render()?)
}

/// Remote locators are absolute URIs; local ones are bare file names served
/// from the upload directory.
fn link_for(locator: &str) -> String {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        locator.to_string()
    } else {
        format!("/{}/{}", UPLOAD_SUBDIR, locator)
    }
}
