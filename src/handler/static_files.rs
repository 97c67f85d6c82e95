//! Static file serving module
//!
//! Serves the calendar client bundle from the public directory once no API
//! route matched.

use crate::api::ApiError;
use crate::config::HttpConfig;
use crate::http::{self, mime, StaticFile};
use crate::logger;
use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Request data needed to answer from the public directory
pub struct StaticRequest<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Serve `req.path` from `http.public_dir`, or a JSON 404
pub async fn serve_public(req: &StaticRequest<'_>, http: &HttpConfig) -> Response<Full<Bytes>> {
    let Some(file_path) = resolve_public_path(&http.public_dir, &http.index_file, req.path).await
    else {
        return not_found(req.path);
    };

    let metadata = match fs::metadata(&file_path).await {
        Ok(m) => m,
        Err(_) => return not_found(req.path),
    };
    let modified = metadata.modified().ok();
    let etag = http::file_etag(metadata.len(), modified.unwrap_or(std::time::UNIX_EPOCH));

    if http::check_etag_match(req.if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return ApiError::internal().into_response();
        }
    };

    let last_modified = modified.map(|at| http::http_date(DateTime::<Utc>::from(at)));
    http::build_file_response(
        StaticFile {
            data: Bytes::from(content),
            content_type: mime::content_type_for(&file_path),
            etag: &etag,
            last_modified: last_modified.as_deref(),
        },
        req.is_head,
    )
}

fn not_found(path: &str) -> Response<Full<Bytes>> {
    ApiError::not_found(format!("The requested resource {path} could not be found."))
        .into_response()
}

/// Map a request path onto a file inside `public_dir`
///
/// `/` and directories resolve to `index_file`. `..` segments are dropped,
/// and the canonical result must stay inside the canonical public dir.
async fn resolve_public_path(public_dir: &str, index_file: &str, path: &str) -> Option<PathBuf> {
    let relative: PathBuf = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();

    let public_canonical = match fs::canonicalize(public_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Public directory not found or inaccessible '{public_dir}': {e}"
            ));
            return None;
        }
    };

    let mut file_path = Path::new(public_dir).join(&relative);
    if relative.as_os_str().is_empty() || fs::metadata(&file_path).await.is_ok_and(|m| m.is_dir())
    {
        file_path = file_path.join(index_file);
    }

    // A missing file is a plain 404, not worth a warning
    let file_canonical = fs::canonicalize(&file_path).await.ok()?;
    if !file_canonical.starts_with(&public_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_canonical.display()
        ));
        return None;
    }
    if !fs::metadata(&file_canonical).await.ok()?.is_file() {
        return None;
    }

    Some(file_canonical)
}
