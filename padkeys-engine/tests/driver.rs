//! Tick loop tests on a paused tokio clock.

mod common;

use common::{buttons, engine_for, ms, ScriptedSource};
use padkeys_engine::{Inspector, RunStats, TickDriver};

#[tokio::test(start_paused = true)]
async fn test_run_ticks_until_shutdown_and_flushes() {
    let mut engine = engine_for(
        r#"{ "p": { "press_hold_seconds": 5.0, "buttons": { "0": { "key": "a" } } } }"#,
        "p",
    );
    let mut driver = TickDriver::with_period(ScriptedSource::new(vec![Ok(buttons(&[true]))]), ms(10));

    let stats = driver.run(&mut engine, tokio::time::sleep(ms(105))).await;

    // ticks at 0, 10, ..., 100
    assert_eq!(
        stats,
        RunStats {
            ticks: 11,
            failed_polls: 0
        }
    );
    // the 5s hold never expired; shutdown released it
    assert_eq!(engine.sink().events, vec!["+a", "-a"]);
    assert_eq!(engine.scheduler().held_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_polls_still_release() {
    let mut engine = engine_for(
        r#"{ "p": { "press_hold_seconds": 0.02, "buttons": { "0": { "key": "a" } } } }"#,
        "p",
    );
    let source = ScriptedSource::new(vec![
        Ok(buttons(&[true])),
        Err(()),
        Err(()),
        Err(()),
        Ok(buttons(&[true])),
    ]);
    let mut driver = TickDriver::with_period(source, ms(10));

    let stats = driver.run(&mut engine, tokio::time::sleep(ms(55))).await;

    assert_eq!(stats.ticks, 6);
    assert_eq!(stats.failed_polls, 3);
    // released at 20ms during the outage, not by the shutdown flush; the
    // button stayed down after recovery so nothing was pressed again
    assert_eq!(engine.sink().events, vec!["+a", "-a"]);
}

#[tokio::test(start_paused = true)]
async fn test_driver_feeds_inspector() {
    let source = ScriptedSource::new(vec![
        Ok(buttons(&[false])),
        Ok(buttons(&[true])),
        Ok(buttons(&[false])),
    ]);
    let mut driver = TickDriver::new(source, 100);
    assert_eq!(driver.period(), ms(10));

    let mut inspector = Inspector::new(Vec::new());
    driver.run(&mut inspector, tokio::time::sleep(ms(25))).await;

    let out = String::from_utf8(inspector.into_inner()).unwrap();
    assert_eq!(out, "[button 0] -> PRESS\n[button 0] -> RELEASE\n");
}

#[test]
fn test_rate_is_clamped() {
    let driver = TickDriver::new(ScriptedSource::new(vec![]), 0);
    assert_eq!(driver.period(), ms(1000));
    let driver = TickDriver::new(ScriptedSource::new(vec![]), 5000);
    assert_eq!(driver.period(), ms(1));
}
