use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::*;
use crate::control::*;
use crate::engine::*;
use crate::error::ClockError;
use crate::input::*;
use crate::sound::*;

use proptest::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time;

#[test]
fn five_plus_three() {
    let mut engine = ClockEngine::new(TimeControl::new(1, 0, 0));
    engine.configure(TimeControl::new(5, 0, 3)).unwrap();
    for side in Side::BOTH {
        assert_eq!(engine.state().clock(side).remaining_ms(), 300_000);
        assert_eq!(engine.state().clock(side).increment_ms(), 3000);
    }

    engine.start();
    assert_eq!(engine.state().active_player(), Some(Side::First));
    for _ in 0..10 {
        engine.advance(100);
    }
    assert_eq!(engine.state().clock(Side::First).remaining_ms(), 299_000);

    engine.switch_turn();
    assert_eq!(engine.state().clock(Side::First).remaining_ms(), 302_000);
    assert_eq!(engine.state().active_player(), Some(Side::Second));
}

#[test]
fn clock_stays_at_zero() {
    let mut engine = ClockEngine::new(TimeControl::new(0, 10, 0));
    engine.start();
    engine.switch_turn();
    engine.advance(9900);
    assert_eq!(engine.state().clock(Side::Second).remaining_ms(), 100);

    assert_eq!(engine.advance(100), Advance::Expired(Side::Second));
    assert_eq!(engine.state().clock(Side::Second).remaining_ms(), 0);
    assert_eq!(engine.advance(50), Advance::Expired(Side::Second));
    assert_eq!(engine.state().clock(Side::Second).remaining_ms(), 0);
    assert_eq!(engine.state().clock(Side::First).remaining_ms(), 10_000);
}

#[test]
fn low_time_boundary() {
    let mut engine = ClockEngine::new(TimeControl::new(0, 30, 0));
    assert!(!engine.is_low_time(Side::First, 30_000));
    engine.start();
    engine.advance(1);
    assert!(engine.is_low_time(Side::First, 30_000));
    assert!(!engine.is_low_time(Side::Second, 30_000));
}

#[test]
fn switch_while_idle() {
    let mut engine = ClockEngine::default();
    let before = *engine.state();
    assert_eq!(engine.switch_turn(), None);
    assert_eq!(*engine.state(), before);
    assert!(engine.take_events().is_empty());
}

#[derive(Debug, Clone)]
enum Op {
    Configure(TimeControl),
    Start,
    Stop,
    Switch,
    Advance(u64),
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..20, 0u32..60, 0u32..15)
            .prop_map(|(m, s, i)| Op::Configure(TimeControl::new(m, s, i))),
        Just(Op::Start),
        Just(Op::Stop),
        Just(Op::Switch),
        Just(Op::Reset),
        (0u64..200_000).prop_map(Op::Advance),
    ]
}

proptest! {
    #[test]
    fn every_reachable_state_is_consistent(ops in prop::collection::vec(op(), 0..64)) {
        let mut engine = ClockEngine::default();
        for op in ops {
            let before = *engine.state();
            match op {
                Op::Configure(tc) => {
                    let res = engine.configure(tc);
                    prop_assert_eq!(res.is_err(), before.is_active());
                }
                Op::Start => engine.start(),
                Op::Stop => {
                    engine.stop();
                    let once = *engine.state();
                    engine.stop();
                    prop_assert_eq!(*engine.state(), once);
                }
                Op::Switch => {
                    engine.switch_turn();
                    if let Some(side) = before.active_player() {
                        let clock = before.clock(side);
                        prop_assert_eq!(
                            engine.state().clock(side).remaining_ms(),
                            clock.remaining_ms() + clock.increment_ms()
                        );
                        prop_assert_eq!(
                            engine.state().clock(side.opposite()).remaining_ms(),
                            before.clock(side.opposite()).remaining_ms()
                        );
                    } else {
                        prop_assert_eq!(*engine.state(), before);
                    }
                }
                Op::Advance(ms) => {
                    engine.advance(ms);
                    for side in Side::BOTH {
                        let expected = if before.active_player() == Some(side) {
                            before.clock(side).remaining_ms().saturating_sub(ms)
                        } else {
                            before.clock(side).remaining_ms()
                        };
                        prop_assert_eq!(engine.state().clock(side).remaining_ms(), expected);
                    }
                }
                Op::Reset => {
                    engine.reset();
                    for side in Side::BOTH {
                        let clock = engine.state().clock(side);
                        prop_assert_eq!(clock.remaining_ms(), clock.initial_ms());
                    }
                    prop_assert!(!engine.state().is_active());
                }
            }
            let state = engine.state();
            prop_assert!(state.check_invariants().is_ok());
            prop_assert_eq!(state.is_active(), state.active_player().is_some());
            prop_assert!(Side::BOTH.iter().filter(|&&s| state.clock(s).is_running()).count() <= 1);
        }
    }

    #[test]
    fn split_advances_sum_to_one(parts in prop::collection::vec(0u64..5_000, 1..32)) {
        let tc = TimeControl::new(1, 0, 0);
        let mut split = ClockEngine::new(tc);
        let mut whole = ClockEngine::new(tc);
        split.start();
        whole.start();

        for &ms in &parts {
            split.advance(ms);
        }
        whole.advance(parts.iter().sum());
        prop_assert_eq!(split.state(), whole.state());
    }
}

async fn collect(mut event_rx: UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(e) = event_rx.recv().await {
        events.push(e);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn control_charges_time_between_ticks() {
    let Handle {
        cmd_tx,
        event_rx,
        ctrl,
        ..
    } = build_with_time_control(TimeControl::new(5, 0, 3));
    let join_handle = tokio::spawn(ctrl.start());

    cmd_tx.start().unwrap();
    time::sleep(Duration::from_millis(1050)).await;
    cmd_tx.switch_turn().unwrap();
    cmd_tx.shutdown().unwrap();

    let state = join_handle.await.unwrap();
    assert_eq!(state.clock(Side::First).remaining_ms(), 300_000 - 1050 + 3000);
    assert_eq!(state.clock(Side::Second).remaining_ms(), 300_000);
    assert_eq!(state.active_player(), Some(Side::Second));
    assert_eq!(
        collect(event_rx).await,
        vec![Event::Started, Event::TurnSwitch(Side::First)]
    );
}

#[tokio::test(start_paused = true)]
async fn control_stops_on_expiry() {
    let Handle {
        cmd_tx,
        event_rx,
        mut state_rx,
        ctrl,
    } = build_with_time_control(TimeControl::new(0, 1, 0));
    let join_handle = tokio::spawn(ctrl.start());

    cmd_tx.start().unwrap();
    time::sleep(Duration::from_millis(1500)).await;
    assert!(state_rx.has_changed().unwrap());
    let state = *state_rx.borrow_and_update();
    assert!(!state.is_active());
    assert_eq!(state.clock(Side::First).remaining_ms(), 0);

    cmd_tx.shutdown().unwrap();
    join_handle.await.unwrap();
    assert_eq!(
        collect(event_rx).await,
        vec![
            Event::Started,
            Event::LowTime(Side::First),
            Event::Expired(Side::First),
            Event::Stopped(StopReason::Expired(Side::First)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn control_rejects_configure_during_game() {
    let Handle {
        cmd_tx,
        event_rx,
        ctrl,
        ..
    } = build_with_time_control(TimeControl::new(5, 0, 3));
    let join_handle = tokio::spawn(ctrl.start());

    cmd_tx.start().unwrap();
    cmd_tx.configure(TimeControl::new(1, 0, 0)).unwrap();
    cmd_tx.shutdown().unwrap();

    let state = join_handle.await.unwrap();
    assert_eq!(state.clock(Side::Second).initial_ms(), 300_000);
    assert_eq!(
        collect(event_rx).await,
        vec![Event::Started, Event::Error(ClockError::GameActive)]
    );
}

#[tokio::test(start_paused = true)]
async fn control_gates_pointer_input() {
    let Handle {
        cmd_tx,
        event_rx,
        ctrl,
        ..
    } = build_with_time_control(TimeControl::default());
    let join_handle = tokio::spawn(ctrl.start());

    cmd_tx.input(Input::Key(Key::Space)).unwrap();
    cmd_tx.start().unwrap();
    cmd_tx.input(Input::Pointer(Side::Second)).unwrap();
    cmd_tx.input(Input::Pointer(Side::First)).unwrap();
    cmd_tx.input(Input::Pointer(Side::First)).unwrap();
    cmd_tx.shutdown().unwrap();

    let state = join_handle.await.unwrap();
    assert_eq!(state.active_player(), Some(Side::Second));
    assert_eq!(
        collect(event_rx).await,
        vec![Event::Started, Event::TurnSwitch(Side::First)]
    );
}

#[tokio::test(start_paused = true)]
async fn control_ends_when_senders_drop() {
    let Handle { cmd_tx, ctrl, .. } = build_with_time_control(TimeControl::default());
    let join_handle = tokio::spawn(ctrl.start());

    cmd_tx.start().unwrap();
    let sender = cmd_tx.clone();
    drop(cmd_tx);
    drop(sender);

    let state = join_handle.await.unwrap();
    assert!(state.is_active());
}

#[derive(Clone, Default)]
struct SharedCues(Arc<Mutex<Vec<Cue>>>);

impl SoundNotifier for SharedCues {
    fn play(&mut self, cue: Cue, _: f32) {
        self.0.lock().unwrap().push(cue);
    }
}

#[tokio::test(start_paused = true)]
async fn control_plays_cues() {
    let cues = SharedCues::default();
    let Handle { cmd_tx, ctrl, .. } = Builder::with_time_control(TimeControl::default())
        .notifier(cues.clone())
        .build();
    let join_handle = tokio::spawn(ctrl.start());

    cmd_tx.start().unwrap();
    cmd_tx.switch_turn().unwrap();
    cmd_tx.stop().unwrap();
    cmd_tx.reset().unwrap();
    cmd_tx.shutdown().unwrap();
    join_handle.await.unwrap();

    assert_eq!(
        *cues.0.lock().unwrap(),
        vec![Cue::GameStart, Cue::Switch, Cue::Click, Cue::GameEnd]
    );
}

#[tokio::test(start_paused = true)]
async fn zero_tick_interval_still_ticks() {
    let Handle {
        cmd_tx,
        mut state_rx,
        ctrl,
        ..
    } = Builder::with_time_control(TimeControl::new(1, 0, 0))
        .tick_interval(Duration::ZERO)
        .build();
    let join_handle = tokio::spawn(ctrl.start());

    cmd_tx.start().unwrap();
    time::sleep(Duration::from_millis(5)).await;
    let remaining = state_rx.borrow_and_update().clock(Side::First).remaining_ms();
    assert!(remaining < 60_000);

    cmd_tx.shutdown().unwrap();
    join_handle.await.unwrap();
}
