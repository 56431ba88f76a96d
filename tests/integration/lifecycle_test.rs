use crate::common::mocks::{MockDocument, MockRuntime};
use crate::common::{OTHER_VIDEO, TestContext, VIDEO};
use lesson_player::Config;
use lesson_player::models::LessonId;
use lesson_player::player::{Disposition, PlayerPhase, RuntimeState};
use lesson_player::services::PlaybackService;
use lesson_player::ui::pages::player::{Overlay, PlayerKey, ShieldGesture};
use lesson_player::utils::errors::{PlayerError, RuntimeErrorCode};
use std::time::Duration;
use tokio::time::Instant;

fn save_progress(ctx: &TestContext, current_time: f64, duration: f64) {
    PlaybackService::update_progress(
        ctx.store.as_ref(),
        "progress:42",
        &LessonId::new("42"),
        current_time,
        duration,
    )
    .unwrap();
}

#[test]
fn constructs_locked_down_instance_for_resolved_reference() {
    let ctx = TestContext::mounted_with(&format!("https://youtu.be/{}?t=10", VIDEO));

    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Initializing);
    assert_eq!(ctx.lifecycle.video_id().map(|id| id.as_str()), Some(VIDEO));
    assert_eq!(ctx.runtime.construct_count(), 1);
    assert!(ctx.log.contains("construct:1:yt-host-42"));

    let options = ctx.runtime.last_options().unwrap();
    assert!(!options.native_controls);
    assert!(!options.keyboard);
    assert!(!options.fullscreen_button);
    assert!(!options.related_content);
    assert_eq!(options.origin.as_deref(), Some("http://localhost:3000"));
    assert_eq!(options.embed_host, "https://www.youtube-nocookie.com");
}

#[test]
fn at_most_one_construction_under_repeated_attempts() {
    let mut ctx = TestContext::new();
    ctx.document.set_attachment_present(false);
    ctx.lifecycle.mount();
    ctx.lifecycle.runtime_available();
    ctx.lifecycle.set_source(Some(VIDEO.to_string()), "42".into());

    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::WaitingForRuntime);
    assert_eq!(ctx.runtime.construct_count(), 0);

    ctx.document.set_attachment_present(true);
    assert!(ctx.lifecycle.poll_readiness());
    assert!(!ctx.lifecycle.poll_readiness());
    ctx.lifecycle.runtime_available();
    ctx.lifecycle.mount();
    assert!(!ctx.lifecycle.poll_readiness());

    assert_eq!(ctx.runtime.construct_count(), 1);
}

#[test]
fn waits_for_runtime_availability() {
    let mut ctx = TestContext::with_parts(Config::default(), MockDocument::new, MockRuntime::unavailable);
    ctx.lifecycle.mount();
    ctx.lifecycle.set_source(Some(VIDEO.to_string()), "42".into());
    assert!(!ctx.lifecycle.poll_readiness());
    assert_eq!(ctx.runtime.construct_count(), 0);

    ctx.lifecycle.runtime_available();
    assert_eq!(ctx.runtime.construct_count(), 1);
    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Initializing);
}

#[test]
fn resumes_saved_position_on_ready() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    save_progress(&ctx, 100.0, 200.0);
    ctx.ready();

    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Ready);
    assert!(ctx.log.contains("seek:100"));
    assert_eq!(ctx.lifecycle.playback().current_time, 100.0);
    assert_eq!(ctx.lifecycle.playback().duration, 200.0);
    assert_eq!(ctx.lifecycle.playback().volume, 80);
    assert!(ctx.log.contains("rate:1"));
}

#[test]
fn does_not_resume_near_the_end() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    save_progress(&ctx, 198.0, 200.0);
    ctx.ready();

    assert!(!ctx.log.entries().iter().any(|e| e.starts_with("seek:")));
    assert_eq!(ctx.lifecycle.playback().current_time, 0.0);
}

#[test]
fn progress_tick_persists_and_reports_completion() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    assert_eq!(ctx.lifecycle.poll_progress(), None);
    ctx.ready();
    assert!(ctx.lifecycle.polling_epoch().is_some());

    ctx.runtime.set_media(|media| {
        media.current_time = Some(94.0);
        media.duration = Some(100.0);
    });
    let update = ctx.lifecycle.poll_progress().unwrap();
    assert!(!update.completed);

    ctx.runtime.set_media(|media| media.current_time = Some(95.0));
    let update = ctx.lifecycle.poll_progress().unwrap();
    assert!(update.completed);
    assert_eq!(ctx.progress.updates().len(), 2);

    let saved = PlaybackService::get_progress(ctx.store.as_ref(), "progress:42")
        .unwrap()
        .unwrap();
    assert_eq!(saved.current_time, 95.0);
    assert_eq!(saved.duration, 100.0);
    assert_eq!(saved.lesson_id, Some(LessonId::new("42")));
}

#[test]
fn progress_tick_skips_missing_readings() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.ready();
    ctx.runtime.set_media(|media| media.duration = None);
    assert_eq!(ctx.lifecycle.poll_progress(), None);
    assert!(ctx.progress.updates().is_empty());
}

#[test]
fn reference_change_tears_down_before_rebuilding() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.ready();
    ctx.runtime
        .last_sink()
        .unwrap()
        .state_changed(RuntimeState::Playing);
    ctx.pump();
    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Playing);
    ctx.lifecycle.set_volume(30);
    let first_epoch = ctx.lifecycle.polling_epoch();
    assert!(first_epoch.is_some());

    ctx.lifecycle
        .set_source(Some(OTHER_VIDEO.to_string()), "43".into());

    let destroy = ctx.log.position("destroy:1").unwrap();
    let construct = ctx.log.position("construct:2:yt-host-43").unwrap();
    assert!(destroy < construct);
    assert_eq!(ctx.lifecycle.polling_epoch(), None);
    assert_eq!(ctx.lifecycle.instance_generation(), Some(2));
    assert_eq!(ctx.lifecycle.playback().current_time, 0.0);
    assert!(!ctx.lifecycle.playback().is_playing);
    assert_eq!(ctx.lifecycle.playback().volume, 100);

    // Late events from the destroyed instance are dropped.
    ctx.runtime.sink(0).unwrap().state_changed(RuntimeState::Playing);
    ctx.runtime.sink(0).unwrap().ready();
    ctx.pump();
    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Initializing);
    assert!(!ctx.lifecycle.playback().is_playing);

    ctx.ready();
    assert!(ctx.lifecycle.polling_epoch() > first_epoch);
}

#[test]
fn unattached_instance_is_not_destroyed() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.runtime.set_media(|media| media.attached = false);
    ctx.lifecycle.unmount();

    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Destroyed);
    assert_eq!(ctx.lifecycle.instance_generation(), None);
    assert!(!ctx.log.contains("destroy:1"));
}

#[test]
fn remount_rebuilds_instance() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.ready();
    ctx.lifecycle.unmount();
    assert!(ctx.log.contains("destroy:1"));

    ctx.lifecycle.mount();
    assert_eq!(ctx.runtime.construct_count(), 2);
    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Initializing);
}

#[test]
fn blocked_domain_never_constructs() {
    let mut config = Config::default();
    config.player.allowed_domains = vec!["example.com".to_string()];
    let mut ctx = TestContext::with_parts(
        config,
        |log| MockDocument::new(log).on_host("mirror.invalid"),
        MockRuntime::new,
    );
    ctx.lifecycle.runtime_available();
    ctx.lifecycle.mount();
    ctx.lifecycle.set_source(Some(VIDEO.to_string()), "42".into());
    ctx.lifecycle.poll_readiness();

    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::DomainBlocked);
    assert_eq!(ctx.runtime.construct_count(), 0);

    let view = ctx.lifecycle.view();
    assert_eq!(view.overlay, Overlay::DomainBlocked);
    assert!(!view.controls_enabled);
    assert!(!view.controls_visible);
    assert_eq!(view.thumbnail_url, None);
    assert_eq!(view.watermark, None);
    assert_eq!(
        ctx.lifecycle.handle_key(PlayerKey::Space, true),
        Disposition::Pass
    );
}

#[test]
fn unresolvable_references_surface_errors() {
    let mut ctx = TestContext::new();
    ctx.lifecycle.runtime_available();
    ctx.lifecycle.mount();
    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Idle);

    ctx.lifecycle
        .set_source(Some("https://vimeo.com/12345".to_string()), "42".into());
    assert_eq!(
        ctx.lifecycle.phase(),
        &PlayerPhase::Error(PlayerError::Resolution(
            "https://vimeo.com/12345".to_string()
        ))
    );

    ctx.lifecycle.set_source(Some("   ".to_string()), "42".into());
    assert_eq!(
        ctx.lifecycle.phase(),
        &PlayerPhase::Error(PlayerError::MissingReference)
    );

    ctx.lifecycle.set_source(None, "42".into());
    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Idle);
    assert_eq!(ctx.lifecycle.view().overlay, Overlay::AwaitingVideo);
    assert_eq!(ctx.runtime.construct_count(), 0);
}

#[test]
fn construction_failure_releases_lock() {
    let mut ctx = TestContext::new();
    ctx.runtime.fail_next_construct();
    ctx.lifecycle.runtime_available();
    ctx.lifecycle.mount();
    ctx.lifecycle.set_source(Some(VIDEO.to_string()), "42".into());

    assert!(matches!(
        ctx.lifecycle.phase(),
        PlayerPhase::Error(PlayerError::Initialization(_))
    ));
    assert_eq!(ctx.lifecycle.instance_generation(), None);

    ctx.lifecycle.set_source(Some(VIDEO.to_string()), "42".into());
    assert_eq!(ctx.runtime.construct_count(), 1);
    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Initializing);
}

#[test]
fn runtime_error_stops_polling() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.ready();
    ctx.runtime.last_sink().unwrap().error(150);
    ctx.pump();

    assert_eq!(
        ctx.lifecycle.phase(),
        &PlayerPhase::Error(PlayerError::Runtime(RuntimeErrorCode::EmbeddingForbidden))
    );
    assert_eq!(ctx.lifecycle.polling_epoch(), None);
    assert_eq!(ctx.lifecycle.poll_progress(), None);

    ctx.lifecycle.toggle_play();
    assert!(!ctx.log.contains("play"));
    assert!(!ctx.lifecycle.view().controls_enabled);
}

#[test]
fn speed_cycles_back_to_normal() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    assert_eq!(ctx.lifecycle.cycle_speed(), None);
    ctx.ready();

    let rates: Vec<_> = (0..5).filter_map(|_| ctx.lifecycle.cycle_speed()).collect();
    assert_eq!(rates, vec![1.25, 1.5, 1.75, 2.0, 1.0]);
    assert_eq!(ctx.lifecycle.cycle_speed(), Some(1.25));
    assert_eq!(ctx.lifecycle.view().speed_label, "1.25×");
    assert!(ctx.log.contains("rate:2"));
}

#[test]
fn transport_reflects_runtime_state() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.lifecycle.toggle_play();
    assert!(!ctx.log.contains("play"));

    ctx.ready();
    ctx.lifecycle.toggle_play();
    assert!(ctx.log.contains("play"));

    ctx.runtime
        .last_sink()
        .unwrap()
        .state_changed(RuntimeState::Playing);
    ctx.pump();
    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::Playing);
    ctx.lifecycle.toggle_play();
    assert!(ctx.log.contains("pause"));

    ctx.lifecycle.seek(500.0);
    assert!(ctx.log.contains("seek:200"));
    ctx.lifecycle.seek(-3.0);
    assert!(ctx.log.contains("seek:0"));

    ctx.lifecycle.set_volume(0);
    assert!(ctx.lifecycle.playback().is_muted);
    assert_eq!(ctx.lifecycle.view().displayed_volume, 0);

    ctx.lifecycle.toggle_mute();
    assert!(ctx.log.contains("unmute"));
    assert!(!ctx.lifecycle.playback().is_muted);
}

#[test]
fn keyboard_bindings_when_focused() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.ready();

    assert_eq!(
        ctx.lifecycle.handle_key(PlayerKey::Space, false),
        Disposition::Pass
    );
    assert!(!ctx.log.contains("play"));

    assert_eq!(
        ctx.lifecycle.handle_key(PlayerKey::Space, true),
        Disposition::PreventDefault
    );
    assert!(ctx.log.contains("play"));

    ctx.lifecycle.handle_key(PlayerKey::ArrowRight, true);
    assert!(ctx.log.contains("seek:5"));
    ctx.lifecycle.handle_key(PlayerKey::ArrowUp, true);
    assert!(ctx.log.contains("volume:85"));
    ctx.lifecycle.set_volume(98);
    ctx.lifecycle.handle_key(PlayerKey::ArrowUp, true);
    assert!(ctx.log.contains("volume:100"));

    ctx.lifecycle.handle_key(PlayerKey::Char('m'), true);
    assert!(ctx.log.contains("mute"));
    ctx.lifecycle.handle_key(PlayerKey::Char('f'), true);
    assert!(ctx.document.is_fullscreen());

    assert_eq!(
        ctx.lifecycle.handle_key(PlayerKey::Char('x'), true),
        Disposition::Pass
    );
}

#[test]
fn shield_debounces_clicks() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.ready();
    let start = Instant::now();

    assert_eq!(
        ctx.lifecycle.handle_shield(ShieldGesture::Click, start),
        Disposition::PreventDefault
    );
    assert!(ctx.lifecycle.view().notice_visible);
    assert_eq!(
        ctx.lifecycle.next_deadline(),
        Some(start + Duration::from_millis(200))
    );

    ctx.lifecycle
        .fire_due_timers(start + Duration::from_millis(199));
    assert!(!ctx.log.contains("play"));
    ctx.lifecycle
        .fire_due_timers(start + Duration::from_millis(200));
    assert!(ctx.log.contains("play"));

    ctx.lifecycle
        .fire_due_timers(start + Duration::from_millis(1300));
    assert!(!ctx.lifecycle.view().notice_visible);
}

#[test]
fn shield_double_click_toggles_fullscreen_only() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.ready();
    let start = Instant::now();

    ctx.lifecycle.handle_shield(ShieldGesture::Click, start);
    ctx.lifecycle
        .handle_shield(ShieldGesture::Click, start + Duration::from_millis(60));
    ctx.lifecycle
        .handle_shield(ShieldGesture::DoubleClick, start + Duration::from_millis(70));
    ctx.lifecycle.fire_due_timers(start + Duration::from_secs(2));

    assert!(!ctx.log.contains("play"));
    assert_eq!(
        ctx.log
            .entries()
            .iter()
            .filter(|e| e.starts_with("fullscreen:"))
            .count(),
        1
    );
    assert!(ctx.document.is_fullscreen());
}

#[test]
fn controls_hide_while_playing() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    ctx.ready();
    ctx.runtime
        .last_sink()
        .unwrap()
        .state_changed(RuntimeState::Playing);
    ctx.pump();

    let now = Instant::now();
    ctx.lifecycle.pointer_moved(now);
    assert!(ctx.lifecycle.view().controls_visible);
    ctx.lifecycle.fire_due_timers(now + Duration::from_secs(3));
    assert!(!ctx.lifecycle.view().controls_visible);

    ctx.lifecycle.pointer_moved(now + Duration::from_secs(4));
    assert!(ctx.lifecycle.view().controls_visible);
    ctx.lifecycle.pointer_left();
    assert!(!ctx.lifecycle.view().controls_visible);

    ctx.runtime
        .last_sink()
        .unwrap()
        .state_changed(RuntimeState::Paused);
    ctx.pump();
    assert!(ctx.lifecycle.view().controls_visible);
    ctx.lifecycle.pointer_left();
    assert!(ctx.lifecycle.view().controls_visible);
}

#[test]
fn view_shows_poster_until_first_play() {
    let mut ctx = TestContext::mounted_with(VIDEO);
    let view = ctx.lifecycle.view();
    assert_eq!(view.overlay, Overlay::Loading);
    assert_eq!(view.watermark.as_deref(), Some("LMS • Lesson #42"));

    ctx.ready();
    let view = ctx.lifecycle.view();
    assert_eq!(view.overlay, Overlay::None);
    assert!(view.show_play_icon);
    assert_eq!(
        view.thumbnail_url.as_deref(),
        Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
    );
    assert_eq!(view.duration_label, "3:20");

    ctx.runtime
        .last_sink()
        .unwrap()
        .state_changed(RuntimeState::Playing);
    ctx.pump();
    let view = ctx.lifecycle.view();
    assert!(!view.show_play_icon);
    assert_eq!(view.thumbnail_url, None);
}

#[test]
fn missing_attachment_point_keeps_waiting() {
    let mut ctx = TestContext::new();
    ctx.document.set_attachment_present(false);
    ctx.lifecycle.runtime_available();
    ctx.lifecycle.mount();
    ctx.lifecycle.set_source(Some(VIDEO.to_string()), "42".into());

    assert_eq!(ctx.lifecycle.phase(), &PlayerPhase::WaitingForRuntime);
    assert!(ctx.lifecycle.awaiting_attachment());
    assert!(!ctx.lifecycle.poll_readiness());
    assert_eq!(ctx.runtime.construct_count(), 0);

    ctx.document.set_attachment_present(true);
    assert!(ctx.lifecycle.poll_readiness());
    assert!(!ctx.lifecycle.awaiting_attachment());
    assert_eq!(ctx.runtime.construct_count(), 1);

    ctx.lifecycle.unmount();
    assert!(!ctx.lifecycle.awaiting_attachment());
}
