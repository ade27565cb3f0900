use server_api::ApiContext;

use crate::{admin::AdminSite, templates::Templates};

pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) templates: Templates,
    pub(crate) admin: AdminSite,
}
