//! Country catalog endpoint

use actix_web::{web, HttpResponse};

use crate::api::error::{ApiError, ErrorResponse};
use crate::catalog::CountriesPayload;
use crate::AppState;

/// Reports whether the catalog came from the in-memory cache
pub const CACHE_HEADER: &str = "X-Cache";

/// GET /countries - Deduplicated country list with starting prices
#[utoipa::path(
    get,
    path = "/countries",
    tag = "catalog",
    responses(
        (status = 200, description = "Country catalog", body = CountriesPayload,
            headers(("X-Cache" = String, description = "HIT or MISS"))),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Missing configuration or upstream failure", body = ErrorResponse)
    )
)]
pub async fn list_countries(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.catalog.require_config()?;

    // Every failure on this endpoint is reported as a 500
    let view = state
        .catalog
        .countries()
        .await
        .map_err(|e| ApiError::from(e).context("failed to load countries").into_internal())?;

    Ok(HttpResponse::Ok()
        .insert_header((CACHE_HEADER, if view.cached { "HIT" } else { "MISS" }))
        .json(view.payload))
}
