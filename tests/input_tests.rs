// Input pipeline integration tests
//
// Events go through the HAL the way the host loop feeds them; assertions
// are on what the console polls.

mod common;

use common::{ctrl_key_down, headless, headless_with, key_down, key_up, run_frame, scratch_dir};
use fantasy_hal::input::{HatDirection, InputLog, MouseButton};
use fantasy_hal::{Button, Flow, HalConfig, RawEvent, TouchPhase};
use std::fs;
use winit::keyboard::KeyCode;

#[test]
fn test_axis_sequence_through_hal() {
    let mut hal = headless(512, 512);
    let mut polled = Vec::new();

    for value in [0, 1600, -1600, 0] {
        hal.start_frame();
        hal.apply_event(RawEvent::AxisMotion { axis: 0, value });
        polled.push(hal.poll_state());
        hal.end_frame();
    }

    assert_eq!(polled, vec![0, 0b0000_0010, 0b0000_0001, 0]);
}

#[test]
fn test_keyboard_joystick_and_hat_are_ored() {
    let mut hal = headless(512, 512);
    hal.process_events(vec![
        key_down(KeyCode::KeyZ),
        RawEvent::ButtonDown { button: 7 },
        RawEvent::HatMotion {
            hat: 0,
            direction: HatDirection::DOWN,
        },
    ]);

    assert_eq!(
        hal.poll_state(),
        Button::Action1.mask() | Button::Confirm.mask() | Button::Down.mask()
    );

    let state = hal.input_state();
    assert_eq!(state.key_state, Button::Action1.mask());
    assert_eq!(state.joy_state, Button::Confirm.mask());
    assert_eq!(state.hat_state, Button::Down.mask());
}

#[test]
fn test_sim_state_does_not_leak_into_next_frame() {
    let mut hal = headless(512, 512);

    hal.start_frame();
    hal.inject_sim_state(0xFF);
    assert_eq!(hal.poll_state(), 0xFF);
    hal.end_frame();

    for _ in 0..3 {
        hal.start_frame();
        assert_eq!(hal.poll_state(), 0);
        hal.end_frame();
    }
}

#[test]
fn test_touch_lifecycle_over_frames() {
    let mut hal = headless(512, 512);
    let mut phases = Vec::new();

    hal.start_frame();
    hal.apply_event(RawEvent::FingerDown {
        finger_id: 0,
        x: 0.5,
        y: 0.25,
    });
    phases.push(hal.touch_info(0).phase);
    hal.end_frame();

    hal.start_frame();
    hal.apply_event(RawEvent::FingerMotion {
        finger_id: 0,
        x: 0.75,
        y: 0.25,
    });
    phases.push(hal.touch_info(0).phase);
    hal.end_frame();

    hal.start_frame();
    hal.apply_event(RawEvent::FingerUp {
        finger_id: 0,
        x: 0.75,
        y: 0.25,
    });
    phases.push(hal.touch_info(0).phase);
    hal.end_frame();

    phases.push(hal.touch_info(0).phase);

    assert_eq!(
        phases,
        vec![
            TouchPhase::Pressed { just_pressed: true },
            TouchPhase::Pressed {
                just_pressed: false
            },
            TouchPhase::JustReleased,
            TouchPhase::None,
        ]
    );

    // 0.75 * 512 = 384 window px -> 96 logical px at scale 4
    let slot = hal.touch_info(0);
    assert_eq!((slot.x, slot.y), (96, 32));
    assert!(hal.touch_available());
}

#[test]
fn test_touch_overflow_is_dropped() {
    let mut hal = headless(512, 512);
    for finger_id in 0..10u64 {
        hal.apply_event(RawEvent::FingerDown {
            finger_id,
            x: 0.1,
            y: 0.1,
        });
    }
    assert_eq!(hal.touch_mask(), 0xFF);
    assert_eq!(hal.touch_info(9).phase, TouchPhase::None);
}

#[test]
fn test_mouse_maps_through_letterbox() {
    // 128x128 logical in 800x600: 600x600 at x = 100
    let mut hal = headless(800, 600);
    hal.process_events(vec![
        RawEvent::MouseMotion { x: 100, y: 0 },
        RawEvent::MouseButtonDown {
            button: MouseButton::Left,
        },
        RawEvent::WheelScroll { delta: -2 },
    ]);

    let mouse = hal.mouse_state();
    assert_eq!((mouse.x, mouse.y), (0, 0));
    assert_eq!(mouse.buttons, 1);
    assert_eq!(mouse.wheel, -2);

    // Inside the left bar the coordinate goes negative
    hal.apply_event(RawEvent::MouseMotion { x: 50, y: 300 });
    let mouse = hal.mouse_state();
    assert_eq!(mouse.x, -10);
    assert_eq!(mouse.y, 64);
    assert_eq!(mouse.wheel, 0);
}

#[test]
fn test_mouse_follows_logical_resize() {
    let mut hal = headless(512, 512);
    hal.apply_event(RawEvent::MouseMotion { x: 256, y: 256 });
    assert_eq!(hal.mouse_state().x, 64);

    hal.set_backbuffer_size(256, 256).unwrap();
    assert_eq!(hal.mouse_state().x, 128);
}

#[test]
fn test_quit_stops_event_processing() {
    let mut hal = headless(512, 512);
    let flow = hal.process_events(vec![
        key_down(KeyCode::ArrowLeft),
        ctrl_key_down(KeyCode::KeyQ),
        key_down(KeyCode::ArrowRight),
    ]);

    assert_eq!(flow, Flow::Quit);
    assert_eq!(hal.poll_state(), Button::Left.mask());
}

#[test]
fn test_trace_toggle_persists_across_frames() {
    let mut hal = headless(512, 512);
    hal.apply_event(ctrl_key_down(KeyCode::KeyT));
    run_frame(&mut hal);
    run_frame(&mut hal);
    assert!(hal.debug_trace());

    hal.apply_event(ctrl_key_down(KeyCode::KeyT));
    assert!(!hal.debug_trace());
}

#[test]
fn test_configured_bindings() {
    let mut hal = headless_with(
        r#"
        [input]
        axis_deadzone = 8000
        confirm_button = 9

        [input.keys]
        action1 = ["Space", "KeyJ"]

        [hotkeys]
        quit = "Escape"
        "#,
        512,
        512,
    );

    hal.apply_event(key_down(KeyCode::Space));
    hal.apply_event(key_down(KeyCode::KeyJ));
    hal.apply_event(key_up(KeyCode::Space));
    assert_eq!(hal.poll_state(), Button::Action1.mask());
    hal.apply_event(key_up(KeyCode::KeyJ));

    hal.apply_event(RawEvent::AxisMotion {
        axis: 1,
        value: 6000,
    });
    hal.apply_event(RawEvent::ButtonDown { button: 7 });
    assert_eq!(hal.poll_state(), 0);

    hal.apply_event(RawEvent::ButtonDown { button: 9 });
    assert_eq!(hal.poll_state(), Button::Confirm.mask());

    assert_eq!(hal.apply_event(key_down(KeyCode::Escape)), Flow::Quit);
}

#[test]
fn test_reload_keeps_reload_flag_for_the_frame() {
    let mut hal = headless(512, 512);
    hal.start_frame();
    hal.apply_event(ctrl_key_down(KeyCode::KeyR));
    assert!(hal.reload_requested());

    hal.reload_config(&HalConfig::default()).unwrap();
    assert!(hal.reload_requested());

    hal.end_frame();
    hal.start_frame();
    assert!(!hal.reload_requested());
}

#[test]
fn test_reload_keeps_held_devices() {
    let mut hal = headless(512, 512);
    hal.process_events(vec![
        RawEvent::ButtonDown { button: 7 },
        RawEvent::AxisMotion {
            axis: 0,
            value: 20000,
        },
        RawEvent::FingerDown {
            finger_id: 0,
            x: 0.5,
            y: 0.5,
        },
        RawEvent::MouseMotion { x: 256, y: 128 },
        RawEvent::MouseButtonDown {
            button: MouseButton::Left,
        },
    ]);
    let before = hal.poll_state();
    assert_eq!(before, Button::Confirm.mask() | Button::Right.mask());

    hal.reload_config(&HalConfig::default()).unwrap();

    assert_eq!(hal.poll_state(), before);
    assert_eq!(hal.touch_mask(), 1);
    let mouse = hal.mouse_state();
    assert_eq!((mouse.x, mouse.y, mouse.buttons), (64, 32, 1));
}

#[test]
fn test_reload_rebinds_held_keys() {
    let mut hal = headless(512, 512);
    hal.apply_event(key_down(KeyCode::KeyZ));
    assert_eq!(hal.poll_state(), Button::Action1.mask());

    let config = HalConfig::from_toml(
        r#"
        [input.keys]
        action1 = ["Space"]
        action2 = ["KeyZ"]
        "#,
    )
    .unwrap();
    hal.reload_config(&config).unwrap();
    assert_eq!(hal.poll_state(), Button::Action2.mask());
}

#[test]
fn test_recording_replays_from_file() {
    let dir = scratch_dir("replay");
    let path = dir.join("run.json");

    let mut hal = headless(512, 512);
    hal.start_recording();
    let script = [
        vec![key_down(KeyCode::ArrowRight)],
        vec![key_down(KeyCode::KeyX)],
        vec![key_up(KeyCode::ArrowRight), key_up(KeyCode::KeyX)],
    ];
    for events in &script {
        hal.start_frame();
        hal.process_events(events.iter().copied());
        hal.end_frame();
    }
    let log = hal.stop_recording().unwrap();
    log.save_to_file(&path).unwrap();

    let mut replay = headless(320, 200);
    replay.start_playback(InputLog::load_from_file(&path).unwrap());
    let mut polled = Vec::new();
    for _ in 0..script.len() {
        replay.start_frame();
        polled.push(replay.poll_state());
        replay.end_frame();
    }

    assert_eq!(
        polled,
        vec![
            Button::Right.mask(),
            Button::Right.mask() | Button::Action2.mask(),
            0
        ]
    );

    let _ = fs::remove_dir_all(&dir);
}
