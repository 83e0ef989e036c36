//! Start/stop/reset lifecycle and the tick schedule, run in paused
//! Tokio time so the 3 s period elapses instantly.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use rfid_tracker_core::{
    clock::{ManualClock, SimState, WallClock},
    event::TrackerEvent,
    rng::RngBank,
    Roster, SimulationController, TrackerConfig,
};
use std::time::Duration;
use tokio::time::timeout;

fn nine_am() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 9, 0, 0).unwrap()
}

fn build(clock: &ManualClock) -> SimulationController {
    let _ = env_logger::builder().is_test(true).try_init();
    SimulationController::new(
        &TrackerConfig::default_test(),
        RngBank::new(42),
        Box::new(clock.clone()),
    )
}

/// Drive `next_tick` for `window` of virtual time and count ticks.
async fn ticks_within(controller: &mut SimulationController, window: Duration) -> usize {
    let mut ticks = 0;
    let _ = timeout(window, async {
        loop {
            controller.next_tick().await;
            ticks += 1;
        }
    })
    .await;
    ticks
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_period() {
    let clock = ManualClock::new(nine_am());
    let mut controller = build(&clock);
    controller.start();

    // Ticks land at 3 s, 6 s, ... 30 s.
    let ticks = ticks_within(&mut controller, Duration::from_millis(31_000)).await;
    assert_eq!(ticks, 10);
    assert_eq!(controller.current_tick(), 10);
}

#[tokio::test(start_paused = true)]
async fn second_start_does_not_double_the_schedule() {
    let clock = ManualClock::new(nine_am());
    let mut controller = build(&clock);

    assert!(controller.start().is_some());
    assert!(controller.start().is_none(), "second start must be a no-op");
    assert_eq!(controller.state(), SimState::Running);

    let ticks = ticks_within(&mut controller, Duration::from_millis(31_000)).await;
    assert_eq!(ticks, 10, "expected exactly duration / period ticks");
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_pending_ticks() {
    let clock = ManualClock::new(nine_am());
    let mut controller = build(&clock);
    controller.start();

    let ticks = ticks_within(&mut controller, Duration::from_millis(7_000)).await;
    assert_eq!(ticks, 2);

    let event = controller.stop();
    assert!(matches!(event, Some(TrackerEvent::SimulationStopped { tick: 2, .. })));
    assert!(controller.stop().is_none(), "stop on stopped is a no-op");

    let before = controller.snapshot();
    let stale = timeout(Duration::from_secs(60), controller.next_tick()).await;
    assert!(stale.is_err(), "no tick may fire after stop");
    assert_eq!(controller.current_tick(), 2);
    assert!(Roster::same_snapshot(&before, controller.roster()));
}

#[tokio::test(start_paused = true)]
async fn restart_waits_a_full_period() {
    let clock = ManualClock::new(nine_am());
    let mut controller = build(&clock);

    controller.start();
    controller.stop();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    controller.toggle();
    assert!(controller.is_running());

    assert_eq!(ticks_within(&mut controller, Duration::from_millis(2_900)).await, 0);
    assert_eq!(ticks_within(&mut controller, Duration::from_millis(200)).await, 1);
}

#[tokio::test(start_paused = true)]
async fn reset_while_running_stops_and_regenerates() {
    let clock = ManualClock::new(nine_am());
    let mut controller = build(&clock);
    let original = controller.snapshot();
    controller.start();
    ticks_within(&mut controller, Duration::from_millis(10_000)).await;

    clock.advance(ChronoDuration::minutes(5));
    let reset_at = clock.now();
    let events = controller.reset();

    assert!(matches!(events.first(), Some(TrackerEvent::SimulationStopped { .. })));
    assert!(matches!(events.last(), Some(TrackerEvent::RosterReset { entities: 10, .. })));
    assert_eq!(controller.state(), SimState::Stopped);
    assert_eq!(controller.current_tick(), 0);
    assert_eq!(controller.roster().len(), original.len());
    assert_eq!(controller.roster().version(), 0);
    assert_eq!(controller.last_update(), reset_at);
    assert!(controller.roster().entities().iter().all(|e| e.last_update == reset_at));

    let stale = timeout(Duration::from_secs(30), controller.next_tick()).await;
    assert!(stale.is_err(), "reset must cancel the schedule");
}

#[test]
fn reset_when_stopped_only_regenerates() {
    let clock = ManualClock::new(nine_am());
    let mut controller = build(&clock);
    let before = controller.snapshot();

    let events = controller.reset();

    assert_eq!(events.len(), 1);
    assert!(!Roster::same_snapshot(&before, controller.roster()));
    assert_eq!(controller.roster().len(), before.len());
}

#[test]
fn last_update_never_decreases() {
    let clock = ManualClock::new(nine_am());
    let mut controller = build(&clock);
    let mut previous = controller.snapshot();

    for step in 0..50 {
        // Every fifth step the clock does not move; one step jumps back.
        match step % 5 {
            0 => {}
            3 => clock.advance(ChronoDuration::seconds(-1)),
            _ => clock.advance(ChronoDuration::seconds(3)),
        }
        controller.run_ticks(1);
        let current = controller.snapshot();

        for (old, new) in previous.entities().iter().zip(current.entities()) {
            assert_eq!(old.id, new.id);
            assert!(new.last_update >= old.last_update, "step {step}: lastUpdate went backwards");
        }
        assert!(!Roster::same_snapshot(&previous, &current));
        previous = current;
    }
}
