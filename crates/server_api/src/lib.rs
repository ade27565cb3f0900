use serde::Serialize;
use shared::{
    domain::{CatalogueSummary, Festival, Performer},
    error::{ApiError, ErrorCode},
};
use storage::Storage;

mod festivals;
mod form_page;
mod performers;

pub use festivals::{
    create_festival, delete_festival, festival_delete_page, festival_detail, festival_form_page,
    list_festivals, update_festival, FestivalDetail,
};
pub use form_page::{Choice, FieldView, FormPage, Submission, Widget};
pub use performers::{
    create_performer, delete_performer, list_performers, performer_delete_page,
    performer_detail, performer_form_page, update_performer, PerformerDetail,
};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

#[derive(Debug, Clone, Serialize)]
pub struct FestivalRow {
    #[serde(flatten)]
    pub festival: Festival,
    pub label: String,
    pub url: String,
}

impl From<Festival> for FestivalRow {
    fn from(festival: Festival) -> Self {
        Self {
            label: festival.to_string(),
            url: festival.absolute_url(),
            festival,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformerRow {
    #[serde(flatten)]
    pub performer: Performer,
    pub role: &'static str,
    pub label: String,
    pub url: String,
}

impl From<Performer> for PerformerRow {
    fn from(performer: Performer) -> Self {
        Self {
            role: performer.role(),
            label: performer.to_string(),
            url: performer.absolute_url(),
            performer,
        }
    }
}

/// Record counts shown on the landing page.
pub async fn index(ctx: &ApiContext) -> Result<CatalogueSummary, ApiError> {
    ctx.storage.summary().await.map_err(internal)
}

pub async fn health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage.health_check().await.map_err(internal)
}

fn internal(err: anyhow::Error) -> ApiError {
    tracing::error!(error = %format!("{err:#}"), "storage operation failed");
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
