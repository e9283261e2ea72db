use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeFile;

use crate::AppState;

/// Fixed routes backed by a page in the public directory
pub const PAGES: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/forms", "form.html"),
    ("/admin", "admin.html"),
    ("/calendar", "calendar.html"),
];

pub fn router(public_dir: &Path) -> Router<Arc<AppState>> {
    PAGES
        .iter()
        .fold(Router::new(), |router, (path, file)| {
            router.route_service(path, ServeFile::new(public_dir.join(file)))
        })
}
