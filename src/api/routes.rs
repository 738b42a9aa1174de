use actix_web::{
    delete,
    error::{InternalError, JsonPayloadError},
    get,
    http::StatusCode,
    post, web, HttpResponse, Result as WebResult,
};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::api::middleware::SessionId;
use crate::api::models::{AskRequest, ImageUpload};
use crate::page::{PageController, PageInput, PageOutcome};
use crate::session::SessionStore;

/// Room for the question text, the `data:` prefix and the JSON framing.
const REQUEST_OVERHEAD_BYTES: usize = 64 * 1024;

/// Body limit for `POST /api/ask` given the largest raw image allowed.
/// Rejected bodies get a JSON `notice` the page can show.
pub fn json_config(max_upload_bytes: usize) -> web::JsonConfig {
    let limit = max_upload_bytes.div_ceil(3) * 4 + REQUEST_OVERHEAD_BYTES;
    let max_mb = max_upload_bytes as f64 / (1024.0 * 1024.0);

    web::JsonConfig::default()
        .limit(limit)
        .error_handler(move |err, _req| {
            let (status, notice) = match &err {
                JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("The uploaded image is too large, the limit is {:.1} MB.", max_mb),
                ),
                _ => (StatusCode::BAD_REQUEST, format!("Invalid request: {}", err)),
            };
            warn!("Rejected ask request: {}", err);
            let response = HttpResponse::build(status).json(json!({ "notice": notice }));
            InternalError::from_response(err, response).into()
        })
}

fn respond(outcome: PageOutcome) -> HttpResponse {
    match &outcome.error {
        None => HttpResponse::Ok().json(&outcome.view),
        Some(e) if e.is_validation() => HttpResponse::UnprocessableEntity().json(&outcome.view),
        Some(_) => HttpResponse::BadGateway().json(&outcome.view),
    }
}

#[get("/session")]
pub async fn get_session(
    store: web::Data<SessionStore>,
    controller: web::Data<PageController>,
    session: SessionId,
) -> WebResult<HttpResponse> {
    let now = Utc::now();
    store.purge_idle(now, controller.idle_timeout());

    let outcome = controller
        .run_cycle(store.get_ref(), session.id(), PageInput::render(), now)
        .await;
    Ok(respond(outcome))
}

#[post("/ask")]
pub async fn ask(
    store: web::Data<SessionStore>,
    controller: web::Data<PageController>,
    session: SessionId,
    req: web::Json<AskRequest>,
) -> WebResult<HttpResponse> {
    let req = req.into_inner();
    let now = Utc::now();
    store.purge_idle(now, controller.idle_timeout());

    let image = match req.image.map(ImageUpload::decode).transpose() {
        Ok(image) => image,
        Err(e) => {
            // Undecodable uploads never reach the controller's submit path
            let outcome = controller
                .run_cycle(store.get_ref(), session.id(), PageInput::render(), now)
                .await;
            return Ok(respond(PageOutcome::new(outcome.view, Some(e))));
        }
    };

    let outcome = controller
        .run_cycle(
            store.get_ref(),
            session.id(),
            PageInput::submit(image, req.question),
            now,
        )
        .await;
    Ok(respond(outcome))
}

#[delete("/session")]
pub async fn forget_session(
    store: web::Data<SessionStore>,
    session: SessionId,
) -> WebResult<HttpResponse> {
    store.remove(session.id());
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(get_session)
            .service(ask)
            .service(forget_session),
    );
}
