//! Management interface over the catalogue entities.
//!
//! Each entity registers a [`ModelAdmin`] with the [`AdminSite`]. The site
//! serves a model index, a change list, and add/change/delete forms for every
//! registered model under `/admin/{model}/`. Validation and persistence are
//! delegated to the same operations the public pages use.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Serialize;
use serde_json::json;
use server_api::{ApiContext, FestivalRow, FormPage, PerformerRow, Submission};
use shared::{
    domain::{FestivalId, PerformerId},
    error::ApiError,
    forms::{FestivalForm, PerformerForm},
};
use tracing::info;

use crate::{app_state::AppState, templates::PageError};

/// One line of a change list.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AdminRow {
    pub(crate) id: i64,
    pub(crate) label: String,
    pub(crate) site_url: String,
}

impl From<FestivalRow> for AdminRow {
    fn from(row: FestivalRow) -> Self {
        Self {
            id: row.festival.id.0,
            label: row.label,
            site_url: row.url,
        }
    }
}

impl From<PerformerRow> for AdminRow {
    fn from(row: PerformerRow) -> Self {
        Self {
            id: row.performer.id.0,
            label: row.label,
            site_url: row.url,
        }
    }
}

pub(crate) type AdminFields = HashMap<String, String>;

#[async_trait]
pub(crate) trait ModelAdmin: Send + Sync {
    /// URL segment and display name, e.g. `festival`.
    fn name(&self) -> &'static str;
    fn verbose_name_plural(&self) -> &'static str;

    async fn count(&self, api: &ApiContext) -> Result<i64, ApiError>;
    async fn rows(&self, api: &ApiContext) -> Result<Vec<AdminRow>, ApiError>;
    async fn form(&self, api: &ApiContext, id: Option<i64>)
        -> Result<FormPage<AdminRow>, ApiError>;
    async fn save(
        &self,
        api: &ApiContext,
        id: Option<i64>,
        fields: &AdminFields,
    ) -> Result<Submission<AdminRow>, ApiError>;
    async fn get(&self, api: &ApiContext, id: i64) -> Result<AdminRow, ApiError>;
    async fn delete(&self, api: &ApiContext, id: i64) -> Result<(), ApiError>;
}

#[derive(Default)]
pub(crate) struct AdminSite {
    models: Vec<Arc<dyn ModelAdmin>>,
}

impl AdminSite {
    /// The site with every catalogue entity registered.
    pub(crate) fn catalogue() -> Self {
        let mut site = Self::default();
        site.register(PerformerAdmin);
        site.register(FestivalAdmin);
        site
    }

    pub(crate) fn register(&mut self, model: impl ModelAdmin + 'static) {
        self.models.push(Arc::new(model));
    }

    pub(crate) fn model(&self, name: &str) -> Option<Arc<dyn ModelAdmin>> {
        self.models.iter().find(|model| model.name() == name).cloned()
    }

    pub(crate) fn models(&self) -> impl Iterator<Item = &Arc<dyn ModelAdmin>> {
        self.models.iter()
    }
}

struct FestivalAdmin;

#[async_trait]
impl ModelAdmin for FestivalAdmin {
    fn name(&self) -> &'static str {
        "festival"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Festivals"
    }

    async fn count(&self, api: &ApiContext) -> Result<i64, ApiError> {
        Ok(server_api::index(api).await?.festivals)
    }

    async fn rows(&self, api: &ApiContext) -> Result<Vec<AdminRow>, ApiError> {
        let rows = server_api::list_festivals(api).await?;
        Ok(rows.into_iter().map(AdminRow::from).collect())
    }

    async fn form(
        &self,
        api: &ApiContext,
        id: Option<i64>,
    ) -> Result<FormPage<AdminRow>, ApiError> {
        let page = server_api::festival_form_page(api, id.map(FestivalId)).await?;
        Ok(admin_page(page))
    }

    async fn save(
        &self,
        api: &ApiContext,
        id: Option<i64>,
        fields: &AdminFields,
    ) -> Result<Submission<AdminRow>, ApiError> {
        let form = FestivalForm {
            name: field(fields, "name"),
            start: field(fields, "start"),
            end: field(fields, "end"),
            location: field(fields, "location"),
        };
        let submission = match id {
            Some(id) => server_api::update_festival(api, FestivalId(id), &form).await?,
            None => server_api::create_festival(api, &form).await?,
        };
        Ok(admin_submission(submission))
    }

    async fn get(&self, api: &ApiContext, id: i64) -> Result<AdminRow, ApiError> {
        Ok(server_api::festival_delete_page(api, FestivalId(id))
            .await?
            .into())
    }

    async fn delete(&self, api: &ApiContext, id: i64) -> Result<(), ApiError> {
        server_api::delete_festival(api, FestivalId(id)).await
    }
}

struct PerformerAdmin;

#[async_trait]
impl ModelAdmin for PerformerAdmin {
    fn name(&self) -> &'static str {
        "performer"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Performers"
    }

    async fn count(&self, api: &ApiContext) -> Result<i64, ApiError> {
        Ok(server_api::index(api).await?.performers)
    }

    async fn rows(&self, api: &ApiContext) -> Result<Vec<AdminRow>, ApiError> {
        let rows = server_api::list_performers(api).await?;
        Ok(rows.into_iter().map(AdminRow::from).collect())
    }

    async fn form(
        &self,
        api: &ApiContext,
        id: Option<i64>,
    ) -> Result<FormPage<AdminRow>, ApiError> {
        let page = server_api::performer_form_page(api, id.map(PerformerId)).await?;
        Ok(admin_page(page))
    }

    async fn save(
        &self,
        api: &ApiContext,
        id: Option<i64>,
        fields: &AdminFields,
    ) -> Result<Submission<AdminRow>, ApiError> {
        let form = PerformerForm {
            name: field(fields, "name"),
            is_band: field(fields, "is_band"),
            festival: field(fields, "festival"),
        };
        let submission = match id {
            Some(id) => server_api::update_performer(api, PerformerId(id), &form).await?,
            None => server_api::create_performer(api, &form).await?,
        };
        Ok(admin_submission(submission))
    }

    async fn get(&self, api: &ApiContext, id: i64) -> Result<AdminRow, ApiError> {
        Ok(server_api::performer_delete_page(api, PerformerId(id))
            .await?
            .into())
    }

    async fn delete(&self, api: &ApiContext, id: i64) -> Result<(), ApiError> {
        server_api::delete_performer(api, PerformerId(id)).await
    }
}

fn field(fields: &AdminFields, name: &str) -> String {
    fields.get(name).cloned().unwrap_or_default()
}

fn admin_page<R: Into<AdminRow>>(page: FormPage<R>) -> FormPage<AdminRow> {
    FormPage {
        record: page.record.map(Into::into),
        fields: page.fields,
        has_errors: page.has_errors,
    }
}

fn admin_submission<R: Into<AdminRow>>(submission: Submission<R>) -> Submission<AdminRow> {
    match submission {
        Submission::Saved(record) => Submission::Saved(record.into()),
        Submission::Rejected(page) => Submission::Rejected(admin_page(page)),
    }
}

pub(crate) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/", get(admin_index))
        .route("/admin/:model/", get(change_list))
        .route("/admin/:model/add/", get(add_form).post(add))
        .route("/admin/:model/:id/change/", get(change_form).post(change))
        .route(
            "/admin/:model/:id/delete/",
            get(delete_confirmation).post(delete),
        )
}

#[derive(Serialize)]
struct ModelSummary {
    name: &'static str,
    verbose_name_plural: &'static str,
    count: i64,
}

async fn admin_index(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let mut models = Vec::new();
    for model in state.admin.models() {
        let count = model
            .count(&state.api)
            .await
            .map_err(|e| state.templates.api_error(e))?;
        models.push(ModelSummary {
            name: model.name(),
            verbose_name_plural: model.verbose_name_plural(),
            count,
        });
    }
    state
        .templates
        .render("admin/index.html", &json!({ "models": models }))
}

async fn change_list(
    State(state): State<Arc<AppState>>,
    Path(model_name): Path<String>,
) -> Result<Html<String>, PageError> {
    let model = registered(&state, &model_name)?;
    let rows = model
        .rows(&state.api)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render(
        "admin/change_list.html",
        &json!({
            "model": model.name(),
            "verbose_name_plural": model.verbose_name_plural(),
            "rows": rows,
        }),
    )
}

async fn add_form(
    State(state): State<Arc<AppState>>,
    Path(model_name): Path<String>,
) -> Result<Html<String>, PageError> {
    let model = registered(&state, &model_name)?;
    render_form(&state, model.as_ref(), None).await
}

async fn add(
    State(state): State<Arc<AppState>>,
    Path(model_name): Path<String>,
    Form(fields): Form<AdminFields>,
) -> Result<Response, PageError> {
    let model = registered(&state, &model_name)?;
    save(&state, model.as_ref(), None, &fields).await
}

async fn change_form(
    State(state): State<Arc<AppState>>,
    Path((model_name, id)): Path<(String, i64)>,
) -> Result<Html<String>, PageError> {
    let model = registered(&state, &model_name)?;
    render_form(&state, model.as_ref(), Some(id)).await
}

async fn change(
    State(state): State<Arc<AppState>>,
    Path((model_name, id)): Path<(String, i64)>,
    Form(fields): Form<AdminFields>,
) -> Result<Response, PageError> {
    let model = registered(&state, &model_name)?;
    save(&state, model.as_ref(), Some(id), &fields).await
}

async fn delete_confirmation(
    State(state): State<Arc<AppState>>,
    Path((model_name, id)): Path<(String, i64)>,
) -> Result<Html<String>, PageError> {
    let model = registered(&state, &model_name)?;
    let record = model
        .get(&state.api, id)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    state.templates.render(
        "admin/delete_confirmation.html",
        &json!({ "model": model.name(), "record": record }),
    )
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Path((model_name, id)): Path<(String, i64)>,
) -> Result<Redirect, PageError> {
    let model = registered(&state, &model_name)?;
    model
        .delete(&state.api, id)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    info!(model = model.name(), id, "deleted through admin");
    Ok(Redirect::to(&format!("/admin/{}/", model.name())))
}

fn registered(state: &AppState, model_name: &str) -> Result<Arc<dyn ModelAdmin>, PageError> {
    state
        .admin
        .model(model_name)
        .ok_or_else(|| state.templates.not_found("model"))
}

async fn render_form(
    state: &AppState,
    model: &dyn ModelAdmin,
    id: Option<i64>,
) -> Result<Html<String>, PageError> {
    let page = model
        .form(&state.api, id)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    render_change_form(state, model, &page)
}

fn render_change_form(
    state: &AppState,
    model: &dyn ModelAdmin,
    page: &FormPage<AdminRow>,
) -> Result<Html<String>, PageError> {
    state.templates.render(
        "admin/change_form.html",
        &json!({
            "model": model.name(),
            "record": page.record,
            "fields": page.fields,
            "has_errors": page.has_errors,
        }),
    )
}

async fn save(
    state: &AppState,
    model: &dyn ModelAdmin,
    id: Option<i64>,
    fields: &AdminFields,
) -> Result<Response, PageError> {
    let submission = model
        .save(&state.api, id, fields)
        .await
        .map_err(|e| state.templates.api_error(e))?;
    match submission {
        Submission::Saved(record) => {
            info!(model = model.name(), id = record.id, "saved through admin");
            Ok(Redirect::to(&format!("/admin/{}/", model.name())).into_response())
        }
        Submission::Rejected(page) => {
            let html = render_change_form(state, model, &page)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
        }
    }
}

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod tests;
