//! Integration tests for the login wall page.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeHost, config, hosted_slot};
use login_wall_app::{LoginBootstrap, LoginPage, Profile, bootstrap_login_page};
use login_wall_core::InputMode;
use login_wall_gate::ReadinessSignal;
use login_wall_host::HostSlot;
use login_wall_ui::{
    DEFAULT_FADE, ENTER_KEY, ElementId, FADE_OUT_CLASS, KeyDisposition, MemoryView, UiEvent,
    ViewSurface, ViewWrite,
};

async fn open_page(profile: Profile, slot: Arc<HostSlot>, view: Arc<MemoryView>) -> LoginPage {
    match bootstrap_login_page(&config(profile), slot, view, Arc::new(ReadinessSignal::new()))
        .await
        .expect("bootstrap should work")
    {
        LoginBootstrap::Ready(page) => page,
        LoginBootstrap::Reload(url) => panic!("unexpected reload to {url}"),
    }
}

async fn type_value(page: &LoginPage, view: &MemoryView, value: &str) -> InputMode {
    view.set_input_value(ElementId::IdInput, value)
        .expect("field should exist");
    page.handle(&UiEvent::Input {
        target: ElementId::IdInput,
    })
    .await
    .expect("input should be handled");
    view.input_mode(ElementId::IdInput)
        .expect("field should exist")
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_masks_once_a_non_digit_is_typed() {
    let view = Arc::new(MemoryView::login_page());
    let page = open_page(Profile::Dist, hosted_slot(Arc::new(FakeHost::new())), view.clone()).await;

    assert_eq!(type_value(&page, &view, "1").await, InputMode::Text);
    assert_eq!(type_value(&page, &view, "12").await, InputMode::Text);
    assert_eq!(type_value(&page, &view, "12a").await, InputMode::Password);
    assert_eq!(type_value(&page, &view, "12").await, InputMode::Text);
    assert_eq!(type_value(&page, &view, "").await, InputMode::Text);
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_enter_forwards_code_and_clears_field() {
    let host = Arc::new(FakeHost::new());
    let view = Arc::new(MemoryView::login_page());
    let page = open_page(Profile::Dist, hosted_slot(host.clone()), view.clone()).await;

    type_value(&page, &view, "abc123").await;
    let disposition = page
        .handle(&UiEvent::key(ENTER_KEY))
        .await
        .expect("enter should be handled");
    tokio::task::yield_now().await;

    assert_eq!(disposition, KeyDisposition::Handled);
    assert_eq!(host.codes(), vec!["abc123".to_string()]);
    assert_eq!(view.input_value(ElementId::IdInput).expect("field"), "");
    assert_eq!(view.input_mode(ElementId::IdInput).expect("field"), InputMode::Text);
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_enter_without_host_still_clears_field() {
    let view = Arc::new(MemoryView::login_page());
    let page = open_page(Profile::Dist, Arc::new(HostSlot::new()), view.clone()).await;
    assert!(!page.controller().is_hosted());

    type_value(&page, &view, "42").await;
    page.handle(&UiEvent::key(ENTER_KEY))
        .await
        .expect("enter should be handled");

    assert_eq!(view.input_value(ElementId::IdInput).expect("field"), "");
    assert_eq!(
        view.element(ElementId::PcName).map(|e| e.text),
        Some(String::new())
    );
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_other_keys_are_ignored() {
    let host = Arc::new(FakeHost::new());
    let view = Arc::new(MemoryView::login_page());
    let page = open_page(Profile::Dist, hosted_slot(host.clone()), view.clone()).await;

    type_value(&page, &view, "7").await;
    let disposition = page
        .handle(&UiEvent::key("Tab"))
        .await
        .expect("key should be handled");
    tokio::task::yield_now().await;

    assert_eq!(disposition, KeyDisposition::Ignored);
    assert!(host.codes().is_empty());
    assert_eq!(view.input_value(ElementId::IdInput).expect("field"), "7");
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_dist_profile_fills_version_labels() {
    let view = Arc::new(MemoryView::login_page());
    open_page(Profile::Dist, hosted_slot(Arc::new(FakeHost::new())), view.clone()).await;

    assert_eq!(view.element(ElementId::LblVersion).map(|e| e.text), Some("1.2".to_string()));
    assert_eq!(
        view.element(ElementId::LblUpdated).map(|e| e.text),
        Some("2024-01-01".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_absent_detail_key_leaves_label_unchanged() {
    let host = Arc::new(FakeHost::new().with_details(r#"{"version":"1.2"}"#));
    let view = Arc::new(MemoryView::login_page());
    open_page(Profile::Dist, hosted_slot(host), view.clone()).await;

    assert_eq!(view.element(ElementId::LblVersion).map(|e| e.text), Some("1.2".to_string()));
    assert_eq!(view.element(ElementId::LblUpdated).map(|e| e.text), Some("?".to_string()));
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_testing_profile_skips_version_labels() {
    let view = Arc::new(MemoryView::login_page());
    open_page(Profile::Testing, hosted_slot(Arc::new(FakeHost::new())), view.clone()).await;

    assert_eq!(view.element(ElementId::LblVersion).map(|e| e.text), Some("?".to_string()));
    assert!(view.writes_to(ElementId::LblUpdated).is_empty());
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_loading_overlay_fades_then_goes() {
    let view = Arc::new(MemoryView::login_page());
    let page = open_page(Profile::Dist, hosted_slot(Arc::new(FakeHost::new())), view.clone()).await;

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!page.overlay_gone());
    assert_eq!(
        view.writes_to(ElementId::LoadingScreen),
        vec![ViewWrite::Class(ElementId::LoadingScreen, FADE_OUT_CLASS.to_string())]
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(page.overlay_gone());
    assert!(view.element(ElementId::LoadingScreen).is_none());
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_enter_works_while_overlay_fades() {
    let host = Arc::new(FakeHost::new());
    let view = Arc::new(MemoryView::login_page());
    let page = open_page(Profile::Dist, hosted_slot(host.clone()), view.clone()).await;

    type_value(&page, &view, "2024").await;
    page.handle(&UiEvent::key(ENTER_KEY))
        .await
        .expect("enter should be handled");
    tokio::task::yield_now().await;

    assert!(view.element(ElementId::LoadingScreen).is_some());
    assert_eq!(host.codes(), vec!["2024".to_string()]);
    assert_eq!(view.input_value(ElementId::IdInput).expect("field"), "");
}

#[tokio::test(start_paused = true)]
async fn login_flow_tests_malformed_details_keeps_page_usable() {
    let host = Arc::new(FakeHost::new().with_details("{"));
    let view = Arc::new(MemoryView::login_page());
    let page = open_page(Profile::Dist, hosted_slot(host.clone()), view.clone()).await;

    assert_eq!(view.text(ElementId::PcName).expect("label"), "KIOSK-07");
    assert_eq!(view.text(ElementId::LblVersion).expect("label"), "?");
    assert_eq!(view.text(ElementId::LblUpdated).expect("label"), "?");

    type_value(&page, &view, "abc").await;
    page.handle(&UiEvent::key(ENTER_KEY))
        .await
        .expect("enter should be handled");
    tokio::time::sleep(DEFAULT_FADE + Duration::from_millis(50)).await;

    assert_eq!(host.codes(), vec!["abc".to_string()]);
    assert_eq!(view.input_value(ElementId::IdInput).expect("field"), "");
    assert!(view.element(ElementId::LoadingScreen).is_none());

    let refresh = page
        .handle(&UiEvent::Click {
            target: ElementId::BtnRefresh,
        })
        .await;
    assert!(refresh.is_err(), "refreshing malformed details reports the error");
}
