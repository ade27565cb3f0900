use serde::Serialize;
use shared::{
    domain::{role_label, PerformerId},
    error::ApiError,
    forms::{FormErrors, PerformerForm, INVALID_CHOICE},
};
use tracing::info;

use crate::{
    festivals::list_festivals, internal, ApiContext, FestivalRow, FieldView, FormPage,
    PerformerRow, Submission,
};

const EMPTY_CHOICE_LABEL: &str = "---------";

#[derive(Debug, Clone, Serialize)]
pub struct PerformerDetail {
    pub performer: PerformerRow,
    pub festival: Option<FestivalRow>,
    pub all_festivals: Vec<FestivalRow>,
}

pub async fn list_performers(ctx: &ApiContext) -> Result<Vec<PerformerRow>, ApiError> {
    let performers = ctx.storage.list_performers().await.map_err(internal)?;
    Ok(performers.into_iter().map(PerformerRow::from).collect())
}

pub async fn performer_detail(
    ctx: &ApiContext,
    performer_id: PerformerId,
) -> Result<PerformerDetail, ApiError> {
    let performer = load_performer(ctx, performer_id).await?;
    let all_festivals = list_festivals(ctx).await?;
    let festival = performer.performer.festival.and_then(|festival_id| {
        all_festivals
            .iter()
            .find(|row| row.festival.id == festival_id)
            .cloned()
    });
    Ok(PerformerDetail {
        performer,
        festival,
        all_festivals,
    })
}

pub async fn performer_form_page(
    ctx: &ApiContext,
    performer_id: Option<PerformerId>,
) -> Result<FormPage<PerformerRow>, ApiError> {
    let (record, form) = match performer_id {
        Some(id) => {
            let record = load_performer(ctx, id).await?;
            let form = PerformerForm::from_performer(&record.performer);
            (Some(record), form)
        }
        None => (None, PerformerForm::initial()),
    };
    let fields = performer_fields(ctx, &form).await?;
    Ok(FormPage::new(record, fields, &FormErrors::default()))
}

pub async fn create_performer(
    ctx: &ApiContext,
    form: &PerformerForm,
) -> Result<Submission<PerformerRow>, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return rejected(ctx, None, form, &errors).await,
    };
    let performer_id = match ctx.storage.create_performer(&input).await {
        Ok(performer_id) => performer_id,
        Err(err) if storage::is_missing_festival(&err) => {
            return rejected(ctx, None, form, &unknown_festival()).await;
        }
        Err(err) => return Err(internal(err)),
    };
    info!(performer_id = performer_id.0, name = %input.name, "performer created");
    Ok(Submission::Saved(load_performer(ctx, performer_id).await?))
}

pub async fn update_performer(
    ctx: &ApiContext,
    performer_id: PerformerId,
    form: &PerformerForm,
) -> Result<Submission<PerformerRow>, ApiError> {
    let current = load_performer(ctx, performer_id).await?;
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return rejected(ctx, Some(current), form, &errors).await,
    };
    let updated = match ctx.storage.update_performer(performer_id, &input).await {
        Ok(updated) => updated,
        Err(err) if storage::is_missing_festival(&err) => {
            return rejected(ctx, Some(current), form, &unknown_festival()).await;
        }
        Err(err) => return Err(internal(err)),
    };
    if !updated {
        return Err(ApiError::not_found("performer"));
    }
    info!(performer_id = performer_id.0, "performer updated");
    Ok(Submission::Saved(load_performer(ctx, performer_id).await?))
}

pub async fn performer_delete_page(
    ctx: &ApiContext,
    performer_id: PerformerId,
) -> Result<PerformerRow, ApiError> {
    load_performer(ctx, performer_id).await
}

pub async fn delete_performer(
    ctx: &ApiContext,
    performer_id: PerformerId,
) -> Result<(), ApiError> {
    let deleted = ctx
        .storage
        .delete_performer(performer_id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::not_found("performer"));
    }
    info!(performer_id = performer_id.0, "performer deleted");
    Ok(())
}

async fn load_performer(
    ctx: &ApiContext,
    performer_id: PerformerId,
) -> Result<PerformerRow, ApiError> {
    ctx.storage
        .get_performer(performer_id)
        .await
        .map_err(internal)?
        .map(PerformerRow::from)
        .ok_or_else(|| ApiError::not_found("performer"))
}

/// The chosen festival no longer exists; the store refuses the reference.
fn unknown_festival() -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add("festival", INVALID_CHOICE);
    errors
}

async fn rejected(
    ctx: &ApiContext,
    record: Option<PerformerRow>,
    form: &PerformerForm,
    errors: &FormErrors,
) -> Result<Submission<PerformerRow>, ApiError> {
    let fields = performer_fields(ctx, form).await?;
    Ok(Submission::Rejected(FormPage::new(record, fields, errors)))
}

async fn performer_fields(
    ctx: &ApiContext,
    form: &PerformerForm,
) -> Result<Vec<FieldView>, ApiError> {
    let festivals = ctx.storage.list_festivals().await.map_err(internal)?;
    let festival_options = std::iter::once((String::new(), EMPTY_CHOICE_LABEL.to_string()))
        .chain(
            festivals
                .iter()
                .map(|festival| (festival.id.0.to_string(), festival.to_string())),
        );
    let role_options =
        [false, true].map(|is_band| (is_band.to_string(), role_label(is_band).to_string()));

    Ok(vec![
        FieldView::text("name", "Name", &form.name),
        FieldView::select("is_band", "Musician/Band", true, &form.is_band, role_options),
        FieldView::select("festival", "Festival", false, &form.festival, festival_options),
    ])
}
