//! Integration tests for the scripted demo host.

use std::sync::Arc;
use std::time::Duration;

use login_wall_app::{
    ADMIN_CODE, ADMIN_USER, DESTRUCT_CODE, DemoHost, LoginBootstrap, Profile, WallState,
    bootstrap_login_page, bootstrap_session_page,
};
use login_wall_core::{HostDetails, parse_details, parse_user};
use login_wall_gate::ReadinessSignal;
use login_wall_host::{HostApi, HostSlot};
use login_wall_session::LogoutOutcome;
use login_wall_ui::{ENTER_KEY, ElementId, MemoryView, UiEvent, ViewSurface};
use url::Url;

fn demo_host() -> DemoHost {
    DemoHost::new(
        "LAB-PC-3",
        HostDetails {
            version: Some("0.1.0".to_string()),
            updated: Some("2024-01-01".to_string()),
        },
    )
}

#[tokio::test]
async fn demo_host_tests_admin_code_opens_session() {
    let host = demo_host();
    assert!(host.get_user().await.is_err());

    host.validate_login(ADMIN_CODE).await.expect("login should work");

    assert_eq!(
        host.state(),
        WallState::SessionOpen {
            user: ADMIN_USER.to_string()
        }
    );
    let user = parse_user(&host.get_user().await.expect("user should exist")).expect("user json");
    assert_eq!(user.name, ADMIN_USER);
}

#[tokio::test]
async fn demo_host_tests_unknown_code_shows_not_found() {
    let host = demo_host();

    host.validate_login("12345").await.expect("login should work");

    assert_eq!(host.state(), WallState::Locked);
    assert_eq!(host.messages(), vec!["Student ID not found!".to_string()]);
}

#[tokio::test]
async fn demo_host_tests_destruct_code_closes_wall() {
    let host = demo_host();
    host.validate_login(DESTRUCT_CODE).await.expect("login should work");
    assert_eq!(host.state(), WallState::Destructed);
}

#[tokio::test]
async fn demo_host_tests_details_round_trip_through_parser() {
    let host = demo_host();
    let details = parse_details(&host.get_details().await.expect("details")).expect("json");
    assert_eq!(details.updated.as_deref(), Some("2024-01-01"));
}

#[tokio::test]
async fn demo_host_tests_logout_is_idempotent_and_signals_teardown() {
    let host = demo_host();
    let signal = host.teardown_signal().expect("demo host exposes teardown");
    assert!(!signal.is_closed());

    host.logout().await.expect("logout should work");
    host.logout().await.expect("logout should work");

    assert!(signal.is_closed());
    assert_eq!(host.state(), WallState::LoggedOut);
}

#[tokio::test(start_paused = true)]
async fn demo_host_tests_full_wall_cycle() {
    let host = Arc::new(demo_host());
    let slot = Arc::new(HostSlot::new());
    slot.inject(host.clone()).expect("injection should work");
    let config = login_wall_app::AppConfig::for_profile(
        Profile::Dist,
        Url::parse(login_wall_app::DEFAULT_PAGE_URL).expect("url"),
    )
    .expect("profile defaults should be valid");

    let login_view = Arc::new(MemoryView::login_page());
    let LoginBootstrap::Ready(login) = bootstrap_login_page(
        &config,
        slot.clone(),
        login_view.clone(),
        Arc::new(ReadinessSignal::new()),
    )
    .await
    .expect("login bootstrap should work") else {
        panic!("hosted login page should not reload");
    };
    assert_eq!(login_view.text(ElementId::PcName).expect("label"), "LAB-PC-3");

    login_view
        .set_input_value(ElementId::IdInput, ADMIN_CODE)
        .expect("field");
    let mut wall = host.watch_state();
    login.handle(&UiEvent::key(ENTER_KEY)).await.expect("enter");
    wall.wait_for(|state| matches!(state, WallState::SessionOpen { .. }))
        .await
        .expect("demo host should open a session");
    assert_eq!(login_view.input_value(ElementId::IdInput).expect("field"), "");

    let session_view = Arc::new(MemoryView::session_page());
    let session = bootstrap_session_page(
        &config,
        slot,
        session_view.clone(),
        Arc::new(ReadinessSignal::new()),
    )
    .await
    .expect("session bootstrap should work");
    tokio::time::sleep(Duration::from_secs(1)).await;

    let outcome = session
        .handle(&UiEvent::Click {
            target: ElementId::BtnLogout,
        })
        .await
        .expect("logout should work");
    assert_eq!(outcome, Some(LogoutOutcome::Acknowledged { attempts: 1 }));
    assert_eq!(host.state(), WallState::LoggedOut);
}
