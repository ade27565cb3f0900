use serde::Serialize;
use shared::{
    domain::FestivalId,
    error::ApiError,
    forms::{FestivalForm, FormErrors},
};
use tracing::info;

use crate::{internal, ApiContext, FestivalRow, FieldView, FormPage, PerformerRow, Submission};

#[derive(Debug, Clone, Serialize)]
pub struct FestivalDetail {
    pub festival: FestivalRow,
    pub performers: Vec<PerformerRow>,
    pub all_festivals: Vec<FestivalRow>,
}

pub async fn list_festivals(ctx: &ApiContext) -> Result<Vec<FestivalRow>, ApiError> {
    let festivals = ctx.storage.list_festivals().await.map_err(internal)?;
    Ok(festivals.into_iter().map(FestivalRow::from).collect())
}

pub async fn festival_detail(
    ctx: &ApiContext,
    festival_id: FestivalId,
) -> Result<FestivalDetail, ApiError> {
    let festival = load_festival(ctx, festival_id).await?;
    let performers = ctx
        .storage
        .list_performers_for_festival(festival_id)
        .await
        .map_err(internal)?;
    let all_festivals = list_festivals(ctx).await?;
    Ok(FestivalDetail {
        festival,
        performers: performers.into_iter().map(PerformerRow::from).collect(),
        all_festivals,
    })
}

/// Empty creation form when `festival_id` is `None`, otherwise an update form
/// filled from the stored record.
pub async fn festival_form_page(
    ctx: &ApiContext,
    festival_id: Option<FestivalId>,
) -> Result<FormPage<FestivalRow>, ApiError> {
    let (record, form) = match festival_id {
        Some(id) => {
            let record = load_festival(ctx, id).await?;
            let form = FestivalForm::from_festival(&record.festival);
            (Some(record), form)
        }
        None => (None, FestivalForm::initial()),
    };
    Ok(FormPage::new(record, festival_fields(&form), &FormErrors::default()))
}

pub async fn create_festival(
    ctx: &ApiContext,
    form: &FestivalForm,
) -> Result<Submission<FestivalRow>, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return Ok(rejected(None, form, &errors)),
    };
    let festival_id = ctx.storage.create_festival(&input).await.map_err(internal)?;
    info!(festival_id = festival_id.0, name = %input.name, "festival created");
    Ok(Submission::Saved(load_festival(ctx, festival_id).await?))
}

pub async fn update_festival(
    ctx: &ApiContext,
    festival_id: FestivalId,
    form: &FestivalForm,
) -> Result<Submission<FestivalRow>, ApiError> {
    let current = load_festival(ctx, festival_id).await?;
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return Ok(rejected(Some(current), form, &errors)),
    };
    let updated = ctx
        .storage
        .update_festival(festival_id, &input)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found("festival"));
    }
    info!(festival_id = festival_id.0, "festival updated");
    Ok(Submission::Saved(load_festival(ctx, festival_id).await?))
}

/// The record a delete confirmation asks about.
pub async fn festival_delete_page(
    ctx: &ApiContext,
    festival_id: FestivalId,
) -> Result<FestivalRow, ApiError> {
    load_festival(ctx, festival_id).await
}

pub async fn delete_festival(ctx: &ApiContext, festival_id: FestivalId) -> Result<(), ApiError> {
    let deleted = ctx
        .storage
        .delete_festival(festival_id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::not_found("festival"));
    }
    info!(festival_id = festival_id.0, "festival deleted");
    Ok(())
}

async fn load_festival(ctx: &ApiContext, festival_id: FestivalId) -> Result<FestivalRow, ApiError> {
    ctx.storage
        .get_festival(festival_id)
        .await
        .map_err(internal)?
        .map(FestivalRow::from)
        .ok_or_else(|| ApiError::not_found("festival"))
}

fn rejected(
    record: Option<FestivalRow>,
    form: &FestivalForm,
    errors: &FormErrors,
) -> Submission<FestivalRow> {
    Submission::Rejected(FormPage::new(record, festival_fields(form), errors))
}

fn festival_fields(form: &FestivalForm) -> Vec<FieldView> {
    vec![
        FieldView::text("name", "Name", &form.name),
        FieldView::date("start", "Start", &form.start),
        FieldView::date("end", "End", &form.end),
        FieldView::text("location", "Location", &form.location),
    ]
}
