use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Serialize;
use serde_json::json;
use server_api::Submission;
use shared::{
    domain::{FestivalId, PerformerId},
    forms::{FestivalForm, PerformerForm},
};

use crate::{app_state::AppState, templates::PageError};

type HtmlResult = Result<Html<String>, PageError>;
type SubmitResult = Result<Response, PageError>;

pub(crate) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/performers/", get(performer_list))
        .route(
            "/performers/create/",
            get(performer_create_form).post(performer_create),
        )
        .route("/performers/:id/", get(performer_detail))
        .route(
            "/performers/:id/update/",
            get(performer_update_form).post(performer_update),
        )
        .route(
            "/performers/:id/delete/",
            get(performer_confirm_delete).post(performer_delete),
        )
        .route("/festivals/", get(festival_list))
        .route(
            "/festivals/create/",
            get(festival_create_form).post(festival_create),
        )
        .route("/festivals/:id/", get(festival_detail))
        .route(
            "/festivals/:id/update/",
            get(festival_update_form).post(festival_update),
        )
        .route(
            "/festivals/:id/delete/",
            get(festival_confirm_delete).post(festival_delete),
        )
}

async fn index(State(state): State<Arc<AppState>>) -> HtmlResult {
    let summary = server_api::index(&state.api)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render("index.html", &summary)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    server_api::health(&state.api)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok("ok")
}

async fn performer_list(State(state): State<Arc<AppState>>) -> HtmlResult {
    let performers = server_api::list_performers(&state.api)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state
        .templates
        .render("performer_list.html", &json!({ "performers": performers }))
}

async fn performer_detail(
    State(state): State<Arc<AppState>>,
    Path(performer_id): Path<i64>,
) -> HtmlResult {
    let detail = server_api::performer_detail(&state.api, PerformerId(performer_id))
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render("performer_detail.html", &detail)
}

async fn performer_create_form(State(state): State<Arc<AppState>>) -> HtmlResult {
    let page = server_api::performer_form_page(&state.api, None)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render("performer_form.html", &page)
}

async fn performer_create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PerformerForm>,
) -> SubmitResult {
    let submission = server_api::create_performer(&state.api, &form)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    finish_submission(&state, "performer_form.html", submission, |row| {
        row.url.clone()
    })
}

async fn performer_update_form(
    State(state): State<Arc<AppState>>,
    Path(performer_id): Path<i64>,
) -> HtmlResult {
    let page = server_api::performer_form_page(&state.api, Some(PerformerId(performer_id)))
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render("performer_form.html", &page)
}

async fn performer_update(
    State(state): State<Arc<AppState>>,
    Path(performer_id): Path<i64>,
    Form(form): Form<PerformerForm>,
) -> SubmitResult {
    let submission = server_api::update_performer(&state.api, PerformerId(performer_id), &form)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    finish_submission(&state, "performer_form.html", submission, |row| {
        row.url.clone()
    })
}

async fn performer_confirm_delete(
    State(state): State<Arc<AppState>>,
    Path(performer_id): Path<i64>,
) -> HtmlResult {
    let performer = server_api::performer_delete_page(&state.api, PerformerId(performer_id))
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render(
        "performer_confirm_delete.html",
        &json!({ "performer": performer }),
    )
}

async fn performer_delete(
    State(state): State<Arc<AppState>>,
    Path(performer_id): Path<i64>,
) -> Result<Redirect, PageError> {
    server_api::delete_performer(&state.api, PerformerId(performer_id))
        .await
        .map_err(|e| state.templates.api_error(e))?;
    Ok(Redirect::to("/performers/"))
}

async fn festival_list(State(state): State<Arc<AppState>>) -> HtmlResult {
    let festivals = server_api::list_festivals(&state.api)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state
        .templates
        .render("festival_list.html", &json!({ "festivals": festivals }))
}

async fn festival_detail(
    State(state): State<Arc<AppState>>,
    Path(festival_id): Path<i64>,
) -> HtmlResult {
    let detail = server_api::festival_detail(&state.api, FestivalId(festival_id))
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render("festival_detail.html", &detail)
}

async fn festival_create_form(State(state): State<Arc<AppState>>) -> HtmlResult {
    let page = server_api::festival_form_page(&state.api, None)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render("festival_form.html", &page)
}

async fn festival_create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FestivalForm>,
) -> SubmitResult {
    let submission = server_api::create_festival(&state.api, &form)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    finish_submission(&state, "festival_form.html", submission, |row| {
        row.url.clone()
    })
}

async fn festival_update_form(
    State(state): State<Arc<AppState>>,
    Path(festival_id): Path<i64>,
) -> HtmlResult {
    let page = server_api::festival_form_page(&state.api, Some(FestivalId(festival_id)))
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render("festival_form.html", &page)
}

async fn festival_update(
    State(state): State<Arc<AppState>>,
    Path(festival_id): Path<i64>,
    Form(form): Form<FestivalForm>,
) -> SubmitResult {
    let submission = server_api::update_festival(&state.api, FestivalId(festival_id), &form)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    finish_submission(&state, "festival_form.html", submission, |row| {
        row.url.clone()
    })
}

async fn festival_confirm_delete(
    State(state): State<Arc<AppState>>,
    Path(festival_id): Path<i64>,
) -> HtmlResult {
    let festival = server_api::festival_delete_page(&state.api, FestivalId(festival_id))
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render(
        "festival_confirm_delete.html",
        &json!({ "festival": festival }),
    )
}

async fn festival_delete(
    State(state): State<Arc<AppState>>,
    Path(festival_id): Path<i64>,
) -> Result<Redirect, PageError> {
    server_api::delete_festival(&state.api, FestivalId(festival_id))
        .await
        .map_err(|e| state.templates.api_error(e))?;
    Ok(Redirect::to("/festivals/"))
}

/// Saved forms redirect to `success_url`; rejected ones are shown again.
fn finish_submission<R: Serialize>(
    state: &AppState,
    template: &str,
    submission: Submission<R>,
    success_url: impl FnOnce(&R) -> String,
) -> SubmitResult {
    match submission {
        Submission::Saved(record) => Ok(Redirect::to(&success_url(&record)).into_response()),
        Submission::Rejected(page) => {
            let html = state.templates.render(template, &page)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
        }
    }
}
