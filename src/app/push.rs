use crate::adapters::WebPushSender;
use crate::push as push_service;
use crate::state;
use crate::types::push::{NotificationPayload, Subscription, SubscriptionRecord};

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use std::collections::HashMap;

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: &'static str,
}

#[derive(Serialize)]
pub(crate) struct StatusResponse {
    pub(crate) status: &'static str,
}

#[derive(Serialize)]
pub(crate) struct VapidPublicKeyResponse {
    #[serde(rename = "vapidPublicKey")]
    pub(crate) vapid_public_key: String,
}

pub(crate) async fn vapid_public_key(
    State(state): State<state::AppState>,
) -> Result<Json<VapidPublicKeyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let vapid = match push_service::load_vapid_config(&state.config) {
        push_service::VapidConfigStatus::Ready(vapid) => vapid,
        push_service::VapidConfigStatus::Incomplete | push_service::VapidConfigStatus::Missing => {
            return Err(push_unconfigured());
        }
    };

    Ok(Json(VapidPublicKeyResponse {
        vapid_public_key: vapid.public_key,
    }))
}

#[derive(Deserialize)]
pub(crate) struct CheckSubscriptionParams {
    #[serde(rename = "clientId", default)]
    client_id: String,
}

#[derive(Serialize)]
pub(crate) struct CheckSubscriptionResponse {
    #[serde(rename = "isSubscribed")]
    pub(crate) is_subscribed: bool,
}

pub(crate) async fn check_subscription(
    State(state): State<state::AppState>,
    Query(params): Query<CheckSubscriptionParams>,
) -> Result<Json<CheckSubscriptionResponse>, (StatusCode, Json<ErrorResponse>)> {
    if params.client_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "clientId is required.",
            }),
        ));
    }

    Ok(Json(CheckSubscriptionResponse {
        is_subscribed: state.store.contains(&params.client_id),
    }))
}

#[derive(Deserialize)]
pub(crate) struct SubscribeRequest {
    #[serde(rename = "clientId")]
    client_id: String,
    subscription: Subscription,
}

pub(crate) async fn subscribe(
    State(state): State<state::AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.client_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "clientId is required.",
            }),
        ));
    }
    if request.subscription.endpoint.trim().is_empty()
        || request.subscription.keys.p256dh.trim().is_empty()
        || request.subscription.keys.auth.trim().is_empty()
    {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "subscription endpoint, p256dh, and auth are required.",
            }),
        ));
    }

    state
        .store
        .insert(&request.client_id, request.subscription)
        .map_err(|err| {
            eprintln!("subscription store error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to persist subscription.",
                }),
            )
        })?;

    Ok(Json(StatusResponse {
        status: "subscribed",
    }))
}

#[derive(Deserialize)]
pub(crate) struct SendNotificationRequest {
    #[serde(rename = "clientId")]
    client_id: String,
    #[serde(rename = "notificationPayload")]
    notification_payload: NotificationPayload,
}

pub(crate) async fn send_notification(
    State(state): State<state::AppState>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let vapid = match push_service::load_vapid_config(&state.config) {
        push_service::VapidConfigStatus::Ready(vapid) => vapid,
        push_service::VapidConfigStatus::Incomplete | push_service::VapidConfigStatus::Missing => {
            return Err(push_unconfigured());
        }
    };

    if request.client_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "clientId is required.",
            }),
        ));
    }

    let sender = WebPushSender::new(vapid).map_err(|err| {
        eprintln!("push dispatch error: failed to init web-push ({err})");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to initialize push sender.",
            }),
        )
    })?;

    push_service::dispatch(
        &sender,
        &state.store,
        &request.client_id,
        &request.notification_payload,
    )
    .await
    .map_err(|err| match err {
        push_service::DispatchError::NotSubscribed => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No subscription for this client.",
            }),
        ),
        push_service::DispatchError::SubscriptionExpired => (
            StatusCode::GONE,
            Json(ErrorResponse {
                error: "Subscription expired and was removed.",
            }),
        ),
        push_service::DispatchError::DeliveryFailed(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Failed to deliver notification.",
            }),
        ),
    })?;

    Ok(Json(StatusResponse { status: "sent" }))
}

pub(crate) async fn subscriptions_debug(
    State(state): State<state::AppState>,
) -> Json<HashMap<String, SubscriptionRecord>> {
    Json(state.store.snapshot())
}

fn push_unconfigured() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "Push notifications are not configured.",
        }),
    )
}
