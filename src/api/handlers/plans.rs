//! Per-country plan lookup

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::api::error::{ApiError, ErrorResponse};
use crate::domain::{normalize_code, retain_country};
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlansQuery {
    /// ISO 3166-1 alpha-2 country code
    pub code: Option<String>,
}

/// GET /plans - Vendor plan response for one country
///
/// The vendor's body is passed through with its plan list reduced to plans
/// for the requested country.
#[utoipa::path(
    get,
    path = "/plans",
    tag = "catalog",
    params(PlansQuery),
    responses(
        (status = 200, description = "Vendor plan response", body = Object),
        (status = 400, description = "Missing or malformed country code", body = ErrorResponse),
        (status = 401, description = "Plan provider login failed", body = ErrorResponse),
        (status = 500, description = "Missing configuration", body = ErrorResponse)
    )
)]
pub async fn get_plans(
    state: web::Data<AppState>,
    query: web::Query<PlansQuery>,
) -> Result<HttpResponse, ApiError> {
    let raw = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("code query parameter is required".to_string()))?;
    let code = normalize_code(raw)
        .ok_or_else(|| ApiError::Validation(format!("invalid country code: {raw}")))?;

    let session = state.catalog.session();
    session.require_config()?;

    let mut response = session
        .query(std::slice::from_ref(&code))
        .await
        .map_err(|e| ApiError::from(e).context("plan query failed"))?;

    let kept = retain_country(&mut response, &state.settings.airhub.fields, &code);
    info!(code = %code, plans = kept, "Plans served");

    Ok(HttpResponse::Ok().json(response))
}
