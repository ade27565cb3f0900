use anyhow::Context as _;
use axum::{http::StatusCode, response::Html};
use serde::Serialize;
use shared::error::{ApiError, ErrorCode};
use tera::{Context, Tera};
use tracing::{error, warn};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("festival_list.html", include_str!("../templates/festival_list.html")),
    ("festival_detail.html", include_str!("../templates/festival_detail.html")),
    ("festival_form.html", include_str!("../templates/festival_form.html")),
    (
        "festival_confirm_delete.html",
        include_str!("../templates/festival_confirm_delete.html"),
    ),
    ("performer_list.html", include_str!("../templates/performer_list.html")),
    ("performer_detail.html", include_str!("../templates/performer_detail.html")),
    ("performer_form.html", include_str!("../templates/performer_form.html")),
    (
        "performer_confirm_delete.html",
        include_str!("../templates/performer_confirm_delete.html"),
    ),
    ("admin/index.html", include_str!("../templates/admin/index.html")),
    ("admin/change_list.html", include_str!("../templates/admin/change_list.html")),
    ("admin/change_form.html", include_str!("../templates/admin/change_form.html")),
    (
        "admin/delete_confirmation.html",
        include_str!("../templates/admin/delete_confirmation.html"),
    ),
];

/// Failure response of an HTML handler.
pub(crate) type PageError = (StatusCode, Html<String>);

/// The compiled page templates, embedded in the binary.
pub(crate) struct Templates {
    tera: Tera,
}

impl Templates {
    pub(crate) fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .context("failed to compile page templates")?;
        Ok(Self { tera })
    }

    pub(crate) fn render<C: Serialize>(
        &self,
        template: &str,
        context: &C,
    ) -> Result<Html<String>, PageError> {
        let rendered = Context::from_serialize(context)
            .and_then(|context| self.tera.render(template, &context));
        match rendered {
            Ok(html) => Ok(Html(html)),
            Err(err) => {
                error!(template, error = ?err, "template rendering failed");
                Err(self.error_page(StatusCode::INTERNAL_SERVER_ERROR, "page rendering failed"))
            }
        }
    }

    pub(crate) fn api_error(&self, err: ApiError) -> PageError {
        let status = match err.code {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::NOT_FOUND {
            warn!(message = %err.message, "record not found");
        }
        self.error_page(status, &err.message)
    }

    pub(crate) fn not_found(&self, what: &str) -> PageError {
        self.api_error(ApiError::not_found(what))
    }

    fn error_page(&self, status: StatusCode, message: &str) -> PageError {
        let mut context = Context::new();
        context.insert("status", &status.to_string());
        context.insert("message", message);
        let body = self
            .tera
            .render("error.html", &context)
            .unwrap_or_else(|_| format!("<h1>{status}</h1>"));
        (status, Html(body))
    }
}
