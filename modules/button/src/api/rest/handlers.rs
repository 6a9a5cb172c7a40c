use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, response::Json, Extension};
use tracing::{debug, info};

use crate::api::rest::dto::{DataResp, PressReq, PressResp, WhoWasLastResp};
use crate::domain::error::PressError;
use crate::domain::service::PressService;

/// Register a press. A body that is not `{"userId": ...}` counts as an unknown user.
pub async fn press(
    Extension(svc): Extension<Arc<PressService>>,
    payload: Result<Json<PressReq>, JsonRejection>,
) -> Result<Json<PressResp>, PressError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!("Unreadable press body: {}", rejection.body_text());
        PressError::unknown_user("")
    })?;

    match svc.submit_press(&req.user_id).await {
        Ok(time) => Ok(Json(PressResp { time })),
        Err(e) => {
            info!(user_id = %req.user_id, "Press refused: {}", e);
            Err(e)
        }
    }
}

/// Current button status, served from the in-memory state
pub async fn data(Extension(svc): Extension<Arc<PressService>>) -> Json<DataResp> {
    Json(svc.status().into())
}

/// Users ordered by their most recent press
pub async fn who_was_last(
    Extension(svc): Extension<Arc<PressService>>,
) -> Result<Json<WhoWasLastResp>, PressError> {
    let entries = svc.recency_report().await?;
    Ok(Json(WhoWasLastResp {
        users: entries.into_iter().map(Into::into).collect(),
    }))
}
