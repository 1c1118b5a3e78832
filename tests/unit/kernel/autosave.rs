use super::*;
use tokio::time::{advance, timeout, Instant};

fn settings(ms: u64) -> AutosaveSettings {
    AutosaveSettings {
        mode: AutosaveMode::AfterDelay,
        delay_ms: ms,
    }
}

fn after_delay(ms: u64) -> AutosaveScheduler {
    AutosaveScheduler::new(settings(ms), tokio::runtime::Handle::current())
}

fn file(name: &str) -> DocPath {
    DocPath::file(format!("/w/{name}"))
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_edits_fires_once() {
    let mut scheduler = after_delay(100);
    let path = file("a.rs");

    for _ in 0..5 {
        assert!(scheduler.on_content_changed(&path));
        advance(Duration::from_millis(30)).await;
    }
    assert_eq!(scheduler.pending_count(), 1);

    let fired = timeout(Duration::from_secs(1), scheduler.next_due()).await;
    assert_eq!(fired.unwrap(), Some(path.clone()));
    assert!(!scheduler.is_pending(&path));

    let again = timeout(Duration::from_secs(1), scheduler.next_due()).await;
    assert!(again.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_edit_resets_the_clock() {
    let mut scheduler = after_delay(100);
    let path = file("a.rs");

    scheduler.on_content_changed(&path);
    advance(Duration::from_millis(90)).await;
    scheduler.on_content_changed(&path);
    let last_edit = Instant::now();

    let fired = timeout(Duration::from_secs(1), scheduler.next_due()).await;
    assert_eq!(fired.unwrap(), Some(path));
    assert!(Instant::now() - last_edit >= Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_notice_in_flight_is_dropped_after_reschedule() {
    let mut scheduler = after_delay(50);
    let path = file("a.rs");

    scheduler.on_content_changed(&path);
    tokio::task::yield_now().await;
    advance(Duration::from_millis(60)).await;
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }

    // The first timer already posted its notice; this edit supersedes it.
    scheduler.on_content_changed(&path);
    let rescheduled = Instant::now();

    let fired = timeout(Duration::from_secs(1), scheduler.next_due()).await;
    assert_eq!(fired.unwrap(), Some(path));
    assert!(Instant::now() - rescheduled >= Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_paths_are_debounced_independently() {
    let mut scheduler = after_delay(100);
    scheduler.on_content_changed(&file("a.rs"));
    scheduler.on_content_changed(&file("b.rs"));
    assert_eq!(scheduler.pending_count(), 2);

    let mut fired = Vec::new();
    for _ in 0..2 {
        fired.push(
            timeout(Duration::from_secs(1), scheduler.next_due())
                .await
                .unwrap()
                .unwrap(),
        );
    }
    fired.sort();
    assert_eq!(fired, vec![file("a.rs"), file("b.rs")]);
}

#[tokio::test(start_paused = true)]
async fn test_off_mode_and_untitled_never_schedule() {
    let mut scheduler = after_delay(100);
    assert!(!scheduler.on_content_changed(&DocPath::Untitled("Untitled-1".into())));

    scheduler.configure(AutosaveMode::Off, Duration::from_millis(100));
    assert!(!scheduler.on_content_changed(&file("a.rs")));
    assert_eq!(scheduler.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_switching_mode_cancels_pending_timers() {
    let mut scheduler = after_delay(100);
    scheduler.on_content_changed(&file("a.rs"));
    scheduler.configure(AutosaveMode::OnFocusChange, Duration::from_millis(100));
    assert_eq!(scheduler.pending_count(), 0);

    let fired = timeout(Duration::from_secs(1), scheduler.next_due()).await;
    assert!(fired.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_single_path() {
    let mut scheduler = after_delay(100);
    let path = file("a.rs");
    scheduler.on_content_changed(&path);
    assert!(scheduler.cancel(&path));
    assert!(!scheduler.cancel(&path));

    let fired = timeout(Duration::from_secs(1), scheduler.next_due()).await;
    assert!(fired.is_err());
}

#[tokio::test]
async fn test_focus_change_targets() {
    let mut scheduler = after_delay(100);
    let path = file("a.rs");
    assert_eq!(scheduler.on_focus_lost(Some(&path)), None);

    scheduler.configure(AutosaveMode::OnFocusChange, Duration::ZERO);
    assert_eq!(scheduler.on_focus_lost(Some(&path)), Some(path.clone()));
    assert_eq!(scheduler.on_tab_activated(Some(&path)), Some(path));
    assert_eq!(scheduler.on_tab_activated(None), None);
    assert_eq!(
        scheduler.on_tab_activated(Some(&DocPath::Untitled("Untitled-2".into()))),
        None
    );
}

#[test]
fn test_edits_outside_the_runtime_still_schedule() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let mut scheduler = AutosaveScheduler::new(settings(10), runtime.handle().clone());
    let path = file("a.rs");

    // Called from a plain thread with no runtime context.
    assert!(scheduler.on_content_changed(&path));
    assert_eq!(scheduler.pending_count(), 1);

    let fired = runtime.block_on(async {
        timeout(Duration::from_secs(5), scheduler.next_due()).await
    });
    assert_eq!(fired.unwrap(), Some(path));
}
