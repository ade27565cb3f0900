use super::*;
use axum::{
    body::{self, Body},
    http::{header, Request, Response, StatusCode},
};
use tower::ServiceExt;

const WOODSTOCK_FORM: &str = "name=Woodstock&start=1969-08-15&end=1969-08-18&location=Bethel%2C+NY";

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let state = AppState {
        api: ApiContext {
            storage: storage.clone(),
        },
        templates: Templates::new().expect("templates"),
        admin: AdminSite::catalogue(),
    };
    (build_router(Arc::new(state)), storage)
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    app.clone().oneshot(request).await.expect("response")
}

async fn post_form(app: &Router, uri: &str, form: &str) -> Response<Body> {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("request");
    app.clone().oneshot(request).await.expect("response")
}

async fn text(response: Response<Body>) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

async fn listed_festivals(app: &Router) -> usize {
    let response = get(app, "/festivals/").await;
    assert_eq!(response.status(), StatusCode::OK);
    text(response).await.matches("<li><a href=").count()
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let response = get(&app, "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");
}

#[tokio::test]
async fn index_shows_record_counts() {
    let (app, storage) = test_app().await;
    storage
        .create_festival(&Default::default())
        .await
        .expect("festival");

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains("<strong>Performers:</strong> 0"));
    assert!(body.contains("<strong>Festivals:</strong> 1"));
}

#[tokio::test]
async fn created_festival_appears_in_list_and_detail() {
    let (app, _storage) = test_app().await;
    let before = listed_festivals(&app).await;

    let response = post_form(&app, "/festivals/create/", WOODSTOCK_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/festivals/1/");

    assert_eq!(listed_festivals(&app).await, before + 1);

    let detail = get(&app, "/festivals/1/").await;
    assert_eq!(detail.status(), StatusCode::OK);
    let body = text(detail).await;
    assert!(body.contains("<dd class=\"name\">Woodstock</dd>"));
    assert!(body.contains("<dd class=\"start\">1969-08-15</dd>"));
    assert!(body.contains("<dd class=\"end\">1969-08-18</dd>"));
    assert!(body.contains("<dd class=\"location\">Bethel, NY</dd>"));
}

#[tokio::test]
async fn festival_detail_lists_booked_performer() {
    let (app, _storage) = test_app().await;
    post_form(&app, "/festivals/create/", WOODSTOCK_FORM).await;

    let response = post_form(
        &app,
        "/performers/create/",
        "name=Santana&is_band=true&festival=1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/performers/1/");

    let body = text(get(&app, "/festivals/1/").await).await;
    assert!(body.contains("Santana (band)"));

    let performer = text(get(&app, "/performers/1/").await).await;
    assert!(performer.contains("<dd class=\"role\">band</dd>"));
    assert!(performer.contains("Woodstock (1969-08-15\u{2013}1969-08-18), Bethel, NY"));
}

#[tokio::test]
async fn unknown_ids_are_not_found_for_both_entities() {
    let (app, _storage) = test_app().await;
    for entity in ["performers", "festivals"] {
        for suffix in ["", "update/", "delete/"] {
            let uri = format!("/{entity}/999/{suffix}");
            let response = get(&app, &uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
        }
        let response = post_form(&app, &format!("/{entity}/999/delete/"), "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = post_form(&app, "/festivals/999/update/", WOODSTOCK_FORM).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = post_form(
        &app,
        "/performers/999/update/",
        "name=Nobody&is_band=false&festival=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(text(response).await.contains("performer not found"));
}

#[tokio::test]
async fn invalid_submission_is_redisplayed() {
    let (app, storage) = test_app().await;
    let response = post_form(
        &app,
        "/festivals/create/",
        "name=&start=someday&end=&location=Bethel",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = text(response).await;
    assert!(body.contains("This field is required."));
    assert!(body.contains("Enter a valid date."));
    assert!(body.contains("value=\"someday\""));
    assert_eq!(storage.count_festivals().await.expect("count"), 0);
}

#[tokio::test]
async fn forms_render_defaults_and_current_values() {
    let (app, _storage) = test_app().await;
    let create = text(get(&app, "/festivals/create/").await).await;
    assert!(create.contains("value=\"unknown\""));
    assert!(create.contains("value=\"location unknown\""));

    post_form(&app, "/festivals/create/", WOODSTOCK_FORM).await;
    let update = text(get(&app, "/festivals/1/update/").await).await;
    assert!(update.contains("value=\"Woodstock\""));
    assert!(update.contains("value=\"1969-08-15\""));

    let performer = text(get(&app, "/performers/create/").await).await;
    assert!(performer.contains("musician"));
    assert!(performer.contains("Woodstock (1969-08-15"));
}

#[tokio::test]
async fn update_redirects_to_detail() {
    let (app, storage) = test_app().await;
    post_form(&app, "/festivals/create/", WOODSTOCK_FORM).await;

    let response = post_form(
        &app,
        "/festivals/1/update/",
        "name=Woodstock&start=1969-08-15&end=1969-08-18&location=White+Lake",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/festivals/1/");

    let festival = storage
        .get_festival(shared::domain::FestivalId(1))
        .await
        .expect("get")
        .expect("festival");
    assert_eq!(festival.location, "White Lake");
}

#[tokio::test]
async fn deleting_festival_keeps_its_performers() {
    let (app, storage) = test_app().await;
    post_form(&app, "/festivals/create/", WOODSTOCK_FORM).await;
    post_form(
        &app,
        "/performers/create/",
        "name=Santana&is_band=true&festival=1",
    )
    .await;

    let confirm = get(&app, "/festivals/1/delete/").await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(text(confirm).await.contains("Are you sure"));

    let response = post_form(&app, "/festivals/1/delete/", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/festivals/");

    let performer = get(&app, "/performers/1/").await;
    assert_eq!(performer.status(), StatusCode::OK);
    assert!(text(performer).await.contains("<dd class=\"festival\">none</dd>"));
    assert_eq!(storage.count_performers().await.expect("count"), 1);
}

#[tokio::test]
async fn deleting_performer_returns_to_list() {
    let (app, storage) = test_app().await;
    post_form(&app, "/performers/create/", "name=Joan+Baez&is_band=false").await;

    let response = post_form(&app, "/performers/1/delete/", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/performers/");
    assert_eq!(storage.count_performers().await.expect("count"), 0);
}
