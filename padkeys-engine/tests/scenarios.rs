//! End-to-end mapping scenarios, driven tick by tick with a synthetic clock.

mod common;

use common::{axes, buttons, engine_for, run_timeline};

fn presses(timeline: &[(u64, String)], key: &str) -> Vec<u64> {
    let want = format!("+{key}");
    timeline
        .iter()
        .filter(|(_, e)| *e == want)
        .map(|(t, _)| *t)
        .collect()
}

fn releases(timeline: &[(u64, String)], key: &str) -> Vec<u64> {
    let want = format!("-{key}");
    timeline
        .iter()
        .filter(|(_, e)| *e == want)
        .map(|(t, _)| *t)
        .collect()
}

const STEPS_PROFILE: &str = r#"{
    "menu": {
        "axes": {
            "1": { "type": "steps_to_buttons", "steps": 10, "key_pos": "down", "key_neg": "up" }
        }
    }
}"#;

#[test]
fn test_full_sweep_emits_every_step() {
    let mut engine = engine_for(STEPS_PROFILE, "menu");
    // axis 1 jumps from the bottom (step 0) to the top (step 10) in one tick
    let timeline = run_timeline(&mut engine, 150, 10, |t| {
        axes(&[0.0, if t == 0 { -1.0 } else { 1.0 }])
    });

    let downs = presses(&timeline, "down");
    assert_eq!(downs.len(), 10, "timeline: {timeline:?}");
    assert_eq!(releases(&timeline, "down").len(), 10);
    assert!(presses(&timeline, "up").is_empty());
    for pair in downs.windows(2) {
        assert!(pair[1] - pair[0] >= 60, "taps too close: {downs:?}");
    }
    // each tap is released before the next one goes down
    let events: Vec<_> = timeline.iter().map(|(_, e)| e.as_str()).collect();
    for pair in events.chunks(2) {
        assert_eq!(pair, ["+down", "-down"]);
    }
}

#[test]
fn test_step_burst_stays_in_one_direction() {
    let mut engine = engine_for(STEPS_PROFILE, "menu");
    // step 5 -> step 8 in a single tick
    let timeline = run_timeline(&mut engine, 60, 10, |t| {
        axes(&[0.0, if t == 0 { 0.1 } else { 0.7 }])
    });

    assert_eq!(presses(&timeline, "down").len(), 3);
    assert!(presses(&timeline, "up").is_empty());
}

#[test]
fn test_reversal_drains_in_arrival_order() {
    let mut engine = engine_for(STEPS_PROFILE, "menu");
    // step 5 -> 7 (two down) then 7 -> 6 (one up) before the queue drains
    let timeline = run_timeline(&mut engine, 60, 10, |t| {
        let value = match t {
            0 => 0.1,
            10 => 0.5,
            _ => 0.3,
        };
        axes(&[0.0, value])
    });

    let pressed: Vec<_> = timeline
        .iter()
        .filter(|(_, e)| e.starts_with('+'))
        .map(|(_, e)| e.as_str())
        .collect();
    assert_eq!(pressed, vec!["+down", "+down", "+up"]);
}

#[test]
fn test_hold_repeat_cadence() {
    let mut engine = engine_for(
        r#"{ "p": {
            "button_hold_repeat_hold": 0.03,
            "repeat_delay": 0.35,
            "repeat_interval": 0.05,
            "buttons": { "0": { "key": "a", "mode": "hold" } }
        } }"#,
        "p",
    );
    let timeline = run_timeline(&mut engine, 80, 10, |t| buttons(&[t < 500]));

    assert_eq!(presses(&timeline, "a"), vec![0, 350, 400, 450]);
    assert_eq!(releases(&timeline, "a"), vec![30, 380, 430, 480]);
}

#[test]
fn test_default_repeat_keeps_key_down() {
    // the default repeat hold outlasts the repeat interval, so repeats
    // extend the press already in flight
    let mut engine = engine_for(
        r#"{ "p": { "buttons": { "0": { "key": "a", "mode": "hold" } } } }"#,
        "p",
    );
    let timeline = run_timeline(&mut engine, 80, 10, |t| buttons(&[t < 500]));

    assert_eq!(presses(&timeline, "a"), vec![0, 350]);
    assert_eq!(releases(&timeline, "a"), vec![60, 510]);
}

#[test]
fn test_short_hold_is_a_single_tap() {
    let mut engine = engine_for(
        r#"{ "p": { "buttons": { "3": { "key": "a", "mode": "hold" } } } }"#,
        "p",
    );
    let timeline = run_timeline(&mut engine, 60, 10, |t| {
        buttons(&[false, false, false, t < 200])
    });

    let events: Vec<_> = timeline.iter().map(|(_, e)| e.as_str()).collect();
    assert_eq!(events, vec!["+a", "-a"]);
    assert!(!engine.state().holds.is_active(3));
}

#[test]
fn test_section_jump_fires_destination_only() {
    let mut engine = engine_for(
        r#"{ "p": { "axes": { "2": {
            "type": "sections_to_keys",
            "buckets": 7,
            "keys": ["z", "x", "c", "v", "b", "n", "m"]
        } } } }"#,
        "p",
    );
    let timeline = run_timeline(&mut engine, 40, 10, |t| {
        axes(&[0.0, 0.0, if t == 0 { -1.0 } else { 0.0 }])
    });

    let events: Vec<_> = timeline.iter().map(|(_, e)| e.as_str()).collect();
    assert_eq!(events, vec!["+v", "-v"]);
}

#[test]
fn test_shared_key_coalesces() {
    let mut engine = engine_for(
        r#"{ "p": { "buttons": { "0": { "key": "a" }, "1": { "key": "a" } } } }"#,
        "p",
    );
    let timeline = run_timeline(&mut engine, 30, 10, |t| buttons(&[true, t >= 50]));

    assert_eq!(presses(&timeline, "a"), vec![0]);
    // second press at 50ms pushed the release to 50 + 120
    assert_eq!(releases(&timeline, "a"), vec![170]);
}

#[test]
fn test_missing_axis_does_not_block_buttons() {
    let mut engine = engine_for(
        r#"{ "p": {
            "buttons": { "0": { "key": "enter" } },
            "axes": { "5": { "type": "steps_to_buttons" } }
        } }"#,
        "p",
    );
    // the snapshot carries no axis 5 at all
    let timeline = run_timeline(&mut engine, 20, 10, |_| buttons(&[true]));

    let events: Vec<_> = timeline.iter().map(|(_, e)| e.as_str()).collect();
    assert_eq!(events, vec!["+enter", "-enter"]);
}

#[test]
fn test_toml_profile_drives_engine() {
    let book = padkeys_engine::ProfileBook::from_toml(
        r#"
        [menu]
        press_hold_seconds = 0.05

        [menu.buttons.0]
        key = "space"
        "#,
    )
    .unwrap();
    let profile = book.profile("menu").unwrap();
    let mut engine = padkeys_engine::Engine::new(profile, common::RecordingSink::default());
    let timeline = run_timeline(&mut engine, 10, 10, |_| buttons(&[true]));

    assert_eq!(presses(&timeline, "space"), vec![0]);
    assert_eq!(releases(&timeline, "space"), vec![50]);
}

#[test]
fn test_example_book_validates() {
    let book =
        padkeys_engine::ProfileBook::from_json(include_str!("../../profiles.example.json")).unwrap();
    let names: Vec<_> = book.names().collect();
    assert_eq!(names, vec!["ardurail", "mechanik"]);
    for name in names {
        book.profile(name).unwrap();
    }

    let mut engine = engine_for(include_str!("../../profiles.example.json"), "mechanik");
    let mut pressed = vec![false; 23];
    pressed[19] = true;
    let timeline = run_timeline(&mut engine, 5, 10, |_| buttons(&pressed));
    let events: Vec<_> = timeline.iter().map(|(_, e)| e.as_str()).collect();
    assert_eq!(events, vec!["+delete", "-delete"]);
}

#[test]
fn test_prev_next_walk_sections_and_follow_axis() {
    let mut engine = engine_for(
        r#"{ "p": {
            "press_hold_seconds": 0.02,
            "buttons": {
                "0": { "mode": "prev", "axis": 2 },
                "1": { "mode": "next", "axis": 2 }
            },
            "axes": { "2": { "type": "sections_to_keys", "keys": ["z", "x", "c"] } }
        } }"#,
        "p",
    );
    let down = |start: u64, t: u64| (start..start + 30).contains(&t);
    let timeline = run_timeline(&mut engine, 60, 10, |t| {
        let prev = down(0, t) || down(350, t) || down(400, t) || down(450, t);
        let next = down(50, t) || down(100, t) || down(150, t) || down(550, t);
        let axis = match t {
            0..=299 => -1.0,
            300..=499 => 1.0,
            _ => 0.0,
        };
        padkeys_engine::Snapshot::new(vec![prev, next], vec![None, None, Some(axis)])
    });

    let pressed: Vec<_> = timeline
        .iter()
        .filter(|(_, e)| e.starts_with('+'))
        .map(|(t, e)| (*t, e.as_str()))
        .collect();
    assert_eq!(
        pressed,
        vec![
            // prev at 0 is clamped, next walks to the end and stops
            (50, "+x"),
            (100, "+c"),
            // axis moves to the last section, the cursor follows it
            (300, "+c"),
            (350, "+x"),
            (400, "+z"),
            // prev at 450 is clamped; the axis resyncs the cursor to 1
            (500, "+x"),
            (550, "+c"),
        ]
    );
    assert_eq!(engine.state().cursors.get(2), Some(2));
}
