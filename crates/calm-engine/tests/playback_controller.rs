mod common;

use calm_engine::playback::UNAVAILABLE_NOTICE;
use calm_engine::{PlaybackError, Preload, ResourceError, ResourceEvent};
use common::{abc_catalog, controller_with};

#[tokio::test]
async fn initialize_sets_lazy_first_source_and_subscribes() {
    let (controller, probe) = controller_with(abc_catalog()).await;

    assert_eq!(probe.with(|l| l.preload), Some(Preload::None));
    assert_eq!(probe.with(|l| l.source.clone()).as_deref(), Some("http://stream/a"));
    assert_eq!(probe.subscriber_count(), 1);
    assert_eq!(probe.with(|l| l.play_calls), 0);
    assert_eq!(controller.current_index(), 0);
    assert!(!controller.is_playing());
}

#[tokio::test]
async fn is_playing_follows_resource_events() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;

    controller.play().await.unwrap();
    // accepted, not yet confirmed
    assert!(!controller.is_playing());
    assert!(controller.is_starting());

    controller.pump().await;
    assert!(controller.is_playing());
    assert!(!controller.is_starting());

    // the resource stalls on its own (e.g. buffering)
    probe.emit(ResourceEvent::Stopped);
    controller.pump().await;
    assert!(!controller.is_playing());
}

#[tokio::test]
async fn next_three_times_visits_one_two_zero() {
    let (mut controller, _probe) = controller_with(abc_catalog()).await;

    let mut visited = Vec::new();
    for _ in 0..3 {
        controller.next().await.unwrap();
        visited.push(controller.current_index());
    }
    assert_eq!(visited, vec![1, 2, 0]);
}

#[tokio::test]
async fn next_and_previous_wrap_from_every_index() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    let n = controller.catalog().len();

    for i in 0..n {
        controller.select_track(i).await.unwrap();
        controller.next().await.unwrap();
        assert_eq!(controller.current_index(), (i + 1) % n);

        controller.select_track(i).await.unwrap();
        controller.previous().await.unwrap();
        assert_eq!(controller.current_index(), (i + n - 1) % n);
    }

    controller.select_track(0).await.unwrap();
    controller.previous().await.unwrap();
    assert_eq!(
        probe.with(|l| l.source.clone()).as_deref(),
        Some("http://stream/c")
    );
}

#[tokio::test]
async fn toggle_twice_returns_to_original_state() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;

    // from paused
    controller.toggle().await.unwrap();
    controller.pump().await;
    assert!(controller.is_playing());
    assert!(!probe.with(|l| l.paused));
    controller.toggle().await.unwrap();
    controller.pump().await;
    assert!(!controller.is_playing());
    assert!(probe.with(|l| l.paused));

    // from playing
    controller.play().await.unwrap();
    controller.pump().await;
    controller.toggle().await.unwrap();
    controller.pump().await;
    controller.toggle().await.unwrap();
    controller.pump().await;
    assert!(controller.is_playing());
}

#[tokio::test]
async fn toggle_reads_resource_not_cached_flag() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;

    controller.play().await.unwrap();
    controller.pump().await;
    // resource paused behind our back; event not yet applied
    probe.with(|l| l.paused = true);
    controller.toggle().await.unwrap();
    assert_eq!(probe.with(|l| l.play_calls), 2);
}

#[tokio::test]
async fn set_volume_clamps_and_keeps_play_state() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    controller.play().await.unwrap();
    controller.pump().await;

    assert_eq!(controller.set_volume(-0.5).await.unwrap(), 0.0);
    assert_eq!(probe.with(|l| l.volume), 0.0);
    assert_eq!(controller.set_volume(1.7).await.unwrap(), 1.0);
    assert_eq!(controller.state().volume, 1.0);
    assert_eq!(controller.set_volume(0.42).await.unwrap(), 0.42);
    assert_eq!(controller.set_volume(f32::NAN).await.unwrap(), 0.42);

    controller.pump().await;
    assert!(controller.is_playing());
}

#[tokio::test]
async fn selecting_a_track_restarts_from_the_beginning() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    controller.play().await.unwrap();
    controller.pump().await;
    probe.advance(42.0);
    assert_eq!(probe.with(|l| l.position_secs), 42.0);

    controller.select_track(1).await.unwrap();
    assert_eq!(probe.with(|l| l.position_secs), 0.0);
    assert_eq!(probe.with(|l| l.source.clone()).as_deref(), Some("http://stream/b"));
    assert_eq!(probe.with(|l| l.load_calls), 1);

    // selection implies autoplay intent
    controller.pump().await;
    assert!(controller.is_playing());
    assert_eq!(controller.current_track().key, "b");
}

#[tokio::test]
async fn out_of_range_selection_is_rejected_without_side_effects() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;

    match controller.select_track(3).await {
        Err(PlaybackError::IndexOutOfRange { index, len }) => {
            assert_eq!(index, 3);
            assert_eq!(len, 3);
        }
        other => panic!("expected out-of-range error, got {:?}", other),
    }
    assert_eq!(controller.current_index(), 0);
    assert_eq!(probe.with(|l| l.pause_calls), 0);
}

#[tokio::test]
async fn rejected_play_raises_one_notice_and_is_not_retried() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    probe.with(|l| l.reject_plays = 1);

    let result = controller.play().await;
    assert!(matches!(result, Err(PlaybackError::Rejected(_))));
    assert!(controller.notice().is_some());
    assert!(!controller.is_playing());
    assert!(!controller.is_starting());

    assert_eq!(controller.pump().await, 0);
    assert_eq!(probe.with(|l| l.play_calls), 1);

    assert!(controller.dismiss_notice());
    assert!(controller.notice().is_none());
    assert!(!controller.dismiss_notice());

    // manual retry works
    controller.play().await.unwrap();
    controller.pump().await;
    assert!(controller.is_playing());
    assert!(controller.notice().is_none());
}

#[tokio::test]
async fn missing_player_gets_its_own_notice() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    probe.with(|l| l.unavailable = true);

    let result = controller.play().await;
    assert!(matches!(
        result,
        Err(PlaybackError::Resource(ResourceError::Unavailable(_)))
    ));
    let notice = controller.notice().cloned();
    assert_eq!(notice.map(|n| n.message).as_deref(), Some(UNAVAILABLE_NOTICE));
    assert!(!controller.is_playing());
    assert!(!controller.is_starting());
    assert_eq!(probe.with(|l| l.play_calls), 1);
}

#[tokio::test]
async fn rejected_autoplay_after_selection_keeps_new_index() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    probe.with(|l| l.reject_plays = 1);

    let result = controller.select_track(2).await;
    assert!(matches!(result, Err(PlaybackError::Rejected(_))));
    assert_eq!(controller.current_index(), 2);
    assert!(controller.notice().is_some());
    assert!(!controller.is_playing());
}

#[tokio::test]
async fn late_start_after_pause_is_neutralised() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    probe.with(|l| l.hold_started = true);

    controller.play().await.unwrap();
    controller.pause().await;
    let pauses_before = probe.with(|l| l.pause_calls);

    // the old request finally succeeds
    probe.emit(ResourceEvent::Started);
    controller.pump().await;

    assert!(!controller.is_playing());
    assert!(probe.with(|l| l.paused));
    assert_eq!(probe.with(|l| l.pause_calls), pauses_before + 1);
}

#[tokio::test]
async fn late_start_after_track_change_is_neutralised() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    probe.with(|l| l.hold_started = true);

    controller.play().await.unwrap();
    probe.with(|l| l.reject_plays = 1);
    let _ = controller.select_track(1).await;

    probe.emit(ResourceEvent::Started);
    controller.pump().await;
    assert!(!controller.is_playing());
}

#[tokio::test]
async fn stop_unloads_and_play_reloads_current_track() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    controller.select_track(1).await.unwrap();
    controller.pump().await;

    controller.stop().await;
    assert!(!controller.is_playing());
    assert_eq!(probe.with(|l| l.unload_calls), 1);
    assert!(probe.with(|l| l.source.is_none()));

    controller.play().await.unwrap();
    controller.pump().await;
    assert_eq!(probe.with(|l| l.source.clone()).as_deref(), Some("http://stream/b"));
    assert!(controller.is_playing());
}

#[tokio::test]
async fn teardown_releases_everything_and_silences_events() {
    let (mut controller, probe) = controller_with(abc_catalog()).await;
    controller.play().await.unwrap();
    controller.pump().await;

    controller.teardown().await;
    assert!(controller.is_released());
    assert!(!controller.is_playing());
    assert!(probe.with(|l| l.released));
    assert!(probe.with(|l| l.paused));
    assert_eq!(probe.subscriber_count(), 0);

    probe.emit(ResourceEvent::Started);
    assert_eq!(controller.pump().await, 0);
    assert!(!controller.is_playing());

    assert!(matches!(controller.play().await, Err(PlaybackError::Released)));
    assert!(matches!(controller.toggle().await, Err(PlaybackError::Released)));
    assert!(matches!(controller.next().await, Err(PlaybackError::Released)));
    controller.pause().await;

    // second teardown is harmless
    controller.teardown().await;
}
