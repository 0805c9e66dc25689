//! Directory listing
//!
//! Entries come back in the order the filesystem yields them. The page is
//! rendered from `templates/list.html` with HTML autoescaping.

use crate::error::{Result, ServeError};
use minijinja::{context, Environment};
use serde::Serialize;
use std::path::Path;
use tokio::fs;

const LIST_TEMPLATE_NAME: &str = "list.html";
const LIST_TEMPLATE: &str = include_str!("../../templates/list.html");

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub url: String,
}

/// Join a child name onto the request path the way a URL path is joined
pub fn join_url(request_path: &str, name: &str) -> String {
    format!("{}/{name}", request_path.trim_end_matches('/'))
}

/// Read the children of `dir`, unsorted
pub async fn read_entries(dir: &Path, request_path: &str) -> Result<Vec<DirectoryEntry>> {
    let read_err = |e: std::io::Error| ServeError::filesystem("read directory", dir, e);

    let mut reader = fs::read_dir(dir).await.map_err(read_err)?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(read_err)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let url = join_url(request_path, &name);
        entries.push(DirectoryEntry { name, url });
    }
    Ok(entries)
}

/// Renders listing pages; built once and shared by all requests
pub struct ListingRenderer {
    env: Environment<'static>,
}

impl ListingRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(LIST_TEMPLATE_NAME, LIST_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, title: &str, files: &[DirectoryEntry]) -> Result<String> {
        let tmpl = self.env.get_template(LIST_TEMPLATE_NAME)?;
        Ok(tmpl.render(context! { title, files })?)
    }
}
