mod support;

use chrono::NaiveDate;
use estate_console::error::ConsoleError;
use estate_console::models::{BookingStatus, Credentials, Registration};
use estate_console::router::{Navigation, View};
use estate_console::screens::{active_amenities, UnitBrowser};
use estate_console::AppProfile;
use serde_json::json;

use support::{context, context_with_token, spawn, Backend, TENANT_TOKEN};

fn john() -> Credentials {
    Credentials::new("john@example.com", "password123")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

#[tokio::test]
async fn guarded_path_resumes_after_login() {
    let server = spawn(Backend::seeded()).await;
    let mut ctx = context(&server, AppProfile::Tenant);

    assert!(matches!(
        ctx.enter("/units/1"),
        Err(ConsoleError::LoginRequired { .. })
    ));
    let navigation = ctx.login(&john()).await.unwrap();

    assert_eq!(navigation, Navigation::Entered(View::Units { tower_id: Some(1) }));
    assert_eq!(ctx.session.token().as_deref(), Some(TENANT_TOKEN));
}

#[tokio::test]
async fn failed_registration_keeps_storage_empty() {
    let server = spawn(Backend::seeded()).await;
    let mut ctx = context(&server, AppProfile::Tenant);

    let registration = Registration {
        name: "Jane".into(),
        email: "jane@example.com".into(),
        phone: "555-0101".into(),
        password: "password123".into(),
    };
    // the mock has no register route
    let err = ctx.register(&registration).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Auth(_)));
    assert!(!ctx.session.is_authenticated());
    assert_eq!(ctx.session.token(), None);
}

#[tokio::test]
async fn booking_an_available_unit() {
    let server = spawn(Backend::seeded()).await;
    let mut ctx = context(&server, AppProfile::Tenant);
    ctx.login(&john()).await.unwrap();

    let mut browser = UnitBrowser::new(1);
    let units = browser.load(&ctx.api).await.unwrap();
    assert_eq!(units.len(), 3);

    assert!(browser.open(13, today()));
    let next = browser.submit(&ctx.api, today()).await.unwrap();
    assert_eq!(next, View::MyBookings);

    let sent = server
        .backend
        .seen()
        .into_iter()
        .find(|s| s.method == "POST" && s.path == "/api/bookings")
        .unwrap();
    assert_eq!(
        sent.body,
        Some(json!({
            "unit_id": 13,
            "requested_move_in_date": "2025-06-02",
            "lease_duration": 12
        }))
    );
    assert_eq!(sent.authorization.as_deref(), Some("Bearer t2"));

    let mine = ctx.api.list_bookings(Some(BookingStatus::Pending)).await.unwrap();
    assert!(mine.iter().any(|b| b.unit_id == 13));
}

#[tokio::test]
async fn booking_an_occupied_unit_shows_msg() {
    let server = spawn(Backend::seeded()).await;
    let mut ctx = context(&server, AppProfile::Tenant);
    ctx.login(&john()).await.unwrap();

    let mut browser = UnitBrowser::new(1);
    browser.load(&ctx.api).await.unwrap();
    browser.open(12, today());

    assert!(browser.submit(&ctx.api, today()).await.is_err());
    let modal = browser.modal().unwrap();
    assert_eq!(modal.message.as_deref(), Some("Unit is not available"));
}

#[tokio::test]
async fn past_move_in_date_never_reaches_server() {
    let server = spawn(Backend::seeded()).await;
    let mut ctx = context(&server, AppProfile::Tenant);
    ctx.login(&john()).await.unwrap();

    let mut browser = UnitBrowser::new(1);
    browser.load(&ctx.api).await.unwrap();
    browser.open(11, today());
    browser.request_mut().unwrap().requested_move_in_date = today();

    let err = browser.submit(&ctx.api, today()).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Validation(_)));
    assert!(server
        .backend
        .seen()
        .iter()
        .all(|s| s.path != "/api/bookings"));
}

#[tokio::test]
async fn only_active_amenities_are_listed() {
    let server = spawn(Backend::seeded()).await;
    let mut ctx = context(&server, AppProfile::Tenant);
    ctx.login(&john()).await.unwrap();

    // the clubhouse row has a null flag and still counts as active
    let shown = active_amenities(ctx.api.list_amenities().await.unwrap());
    let names: Vec<_> = shown.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Swimming Pool", "Clubhouse"]);
}

#[tokio::test]
async fn rejected_token_reads_as_unauthorized() {
    let server = spawn(Backend::seeded()).await;
    let ctx = context_with_token(&server, AppProfile::Tenant, "stale");

    let err = ctx.api.me().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("Token has expired"));
}
