use axum::Json;
use shared::VersionResponse;

use crate::rest::{ok, Envelope};

/// Static build version; clients poll this to prompt a refresh after
/// a deploy.
pub async fn get_version() -> Json<Envelope<VersionResponse>> {
    ok(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
