//! Contact form route.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use clothesline_core::{CustomerQuery, NewCustomerQuery};

use crate::db::CustomerQueryRepository;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Store a customer query. Logged-in customers are linked to it.
///
/// POST /api/queries
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ApiJson(body): ApiJson<NewCustomerQuery>,
) -> Result<(StatusCode, Json<CustomerQuery>)> {
    let query = body.validate()?;
    let query = CustomerQueryRepository::new(state.pool())
        .create(user.map(|u| u.id), &query)
        .await?;

    tracing::info!(query_id = %query.id, "Customer query received");
    Ok((StatusCode::CREATED, Json(query)))
}
