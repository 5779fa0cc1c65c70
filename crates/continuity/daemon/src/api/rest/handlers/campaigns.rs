//! BIA campaign handlers

use crate::api::rest::caller::Caller;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use continuity_engine::{LaunchOutcome, NewCampaign};
use continuity_storage::QueryWindow;
use continuity_types::{Campaign, CampaignId};
use serde::Deserialize;

/// Paging parameters for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl From<PageQuery> for QueryWindow {
    fn from(page: PageQuery) -> Self {
        QueryWindow {
            limit: page.limit.unwrap_or(0),
            offset: page.offset.unwrap_or(0),
        }
    }
}

pub async fn create_campaign(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<NewCampaign>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Campaign>)> {
    let Json(request) = body?;
    let campaign = state
        .core
        .campaigns()
        .create(&caller.tenant, &caller.user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    caller: Caller,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Vec<Campaign>>> {
    let campaigns = state
        .core
        .campaigns()
        .list(&caller.tenant, page.into())
        .await?;
    Ok(Json(campaigns))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Campaign>> {
    let campaign = state
        .core
        .campaigns()
        .get(&caller.tenant, &CampaignId::new(id))
        .await?;
    Ok(Json(campaign))
}

pub async fn launch_campaign(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<LaunchOutcome>> {
    let outcome = state
        .core
        .campaigns()
        .launch(&caller.tenant, &CampaignId::new(id), &caller.user)
        .await?;
    Ok(Json(outcome))
}

pub async fn update_campaign_progress(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Campaign>> {
    let campaign = state
        .core
        .campaigns()
        .update_progress(&caller.tenant, &CampaignId::new(id))
        .await?;
    Ok(Json(campaign))
}
