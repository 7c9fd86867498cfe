mod common;

use chrono::Duration;
use common::{at, medication, scheduler, RecordingPlatform};
use medminder_core::{
    AlertChannel, AlertState, DialogAction, DialogResolution, PermissionPrompt, RebuildBlock,
};

#[test]
fn metformin_is_armed_before_its_time_and_skipped_after() {
    let metformin = medication("Metformin", "08:00");
    let list = vec![metformin.clone()];
    let mut scheduler = scheduler(RecordingPlatform::granted());

    let summary = scheduler.rebuild(&list, true, at(7, 0, 0));
    assert_eq!(summary.armed, 1);
    assert_eq!(
        scheduler.pending_timer(&metformin.id).unwrap().target(),
        at(8, 0, 0)
    );

    let summary = scheduler.rebuild(&list, true, at(9, 0, 0));
    assert_eq!(summary.armed, 0);
    assert_eq!(summary.skipped_passed, 1);
    assert!(scheduler.pending_timer(&metformin.id).is_none());
}

#[test]
fn trigger_exactly_now_is_not_armed() {
    let list = vec![medication("Aspirin", "08:00")];
    let mut scheduler = scheduler(RecordingPlatform::granted());

    let summary = scheduler.rebuild(&list, true, at(8, 0, 0));
    assert_eq!(summary.armed, 0);
    assert!(scheduler.pending_timers().is_empty());
}

#[test]
fn acknowledged_medications_get_no_timer() {
    let mut taken = medication("Taken", "10:00");
    taken.toggle_acknowledged();
    let open = medication("Open", "10:00");
    let list = vec![taken.clone(), open.clone()];
    let mut scheduler = scheduler(RecordingPlatform::granted());

    let summary = scheduler.rebuild(&list, true, at(7, 0, 0));
    assert_eq!(summary.skipped_acknowledged, 1);
    assert!(scheduler.pending_timer(&taken.id).is_none());
    assert!(scheduler.pending_timer(&open.id).is_some());
}

#[test]
fn malformed_time_is_skipped_without_stopping_rebuild() {
    let broken = medication("Broken", "8am");
    let fine = medication("Fine", "12:00");
    let list = vec![broken.clone(), fine.clone()];
    let mut scheduler = scheduler(RecordingPlatform::granted());

    let summary = scheduler.rebuild(&list, true, at(7, 0, 0));
    assert_eq!(summary.skipped_invalid, 1);
    assert_eq!(summary.armed, 1);
    assert!(scheduler.pending_timer(&fine.id).is_some());
}

#[test]
fn rebuild_is_blocked_when_signed_out_or_permission_missing() {
    let list = vec![medication("A", "10:00")];

    let mut signed_out = scheduler(RecordingPlatform::granted());
    let summary = signed_out.rebuild(&list, false, at(7, 0, 0));
    assert_eq!(summary.blocked, Some(RebuildBlock::SignedOut));
    assert!(signed_out.pending_timers().is_empty());

    let mut no_permission = scheduler(RecordingPlatform::undecided(PermissionPrompt::Pending));
    let summary = no_permission.rebuild(&list, true, at(7, 0, 0));
    assert_eq!(summary.blocked, Some(RebuildBlock::PermissionNotGranted));
    assert!(no_permission.pending_timers().is_empty());
}

#[test]
fn repeated_rebuild_keeps_one_timer_per_medication() {
    let list = vec![medication("A", "10:00"), medication("B", "11:00")];
    let mut scheduler = scheduler(RecordingPlatform::granted());

    scheduler.rebuild(&list, true, at(7, 0, 0));
    let summary = scheduler.rebuild(&list, true, at(7, 30, 0));
    assert_eq!(summary.cancelled, 2);
    assert_eq!(scheduler.pending_timers().len(), 2);

    let fired = scheduler.tick(&list, at(12, 0, 0));
    assert_eq!(fired.len(), 2);
}

#[test]
fn fire_sends_notification_starts_alert_and_opens_dialog() {
    let med = medication("Metformin", "08:00");
    let list = vec![med.clone()];
    let mut scheduler = scheduler(RecordingPlatform::granted());
    scheduler.rebuild(&list, true, at(7, 0, 0));

    assert!(scheduler.tick(&list, at(7, 59, 59)).is_empty());
    let fired = scheduler.tick(&list, at(8, 0, 0));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].medication_id, med.id);

    let sent = &scheduler.platform().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Time to take Metformin");
    assert_eq!(sent[0].body, "500mg - Take as directed");
    assert!(sent[0].require_interaction);
    assert_eq!(sent[0].medication_id, Some(med.id.clone()));

    assert!(scheduler.alert().is_active());
    assert_eq!(scheduler.alert().player().plays, 1);
    assert_eq!(scheduler.current_reminder().unwrap().medication_id, med.id);
    assert!(scheduler.pending_timer(&med.id).is_none());
}

#[test]
fn delivery_failure_still_alerts_and_opens_dialog() {
    let mut platform = RecordingPlatform::granted();
    platform.fail_delivery = true;
    let list = vec![medication("A", "08:00")];
    let mut scheduler = scheduler(platform);
    scheduler.rebuild(&list, true, at(7, 0, 0));

    let fired = scheduler.tick(&list, at(8, 0, 0));
    assert_eq!(fired.len(), 1);
    assert!(scheduler.platform().sent.is_empty());
    assert!(scheduler.alert().is_active());
    assert!(scheduler.current_reminder().is_some());
}

#[test]
fn fire_for_missing_medication_is_a_no_op() {
    let med = medication("Gone", "08:00");
    let mut scheduler = scheduler(RecordingPlatform::granted());

    assert!(scheduler.fire(&med.id, &[], at(8, 0, 0)).is_none());
    assert!(!scheduler.alert().is_active());
    assert!(scheduler.platform().sent.is_empty());
}

#[test]
fn two_medications_due_in_same_minute_both_fire_and_second_replaces_dialog() {
    let first = medication("First", "08:00");
    let second = medication("Second", "08:00");
    let mut list = vec![first.clone(), second.clone()];
    let mut scheduler = scheduler(RecordingPlatform::granted());
    scheduler.rebuild(&list, true, at(7, 0, 0));

    let fired = scheduler.tick(&list, at(8, 0, 30));
    let ids: Vec<_> = fired.iter().map(|event| event.medication_id.clone()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.id) && ids.contains(&second.id));
    assert_eq!(scheduler.platform().sent.len(), 2);

    let shown = scheduler.current_reminder().unwrap().medication_id.clone();
    assert_eq!(shown, ids[1]);
    assert!(scheduler.alert().is_active());

    let resolution = scheduler.respond(DialogAction::Taken).unwrap();
    assert_eq!(resolution, DialogResolution::Taken(shown.clone()));
    list.iter_mut()
        .find(|med| med.id == shown)
        .unwrap()
        .toggle_acknowledged();

    let other = list.iter().find(|med| med.id != shown).unwrap();
    assert!(!other.acknowledged_today);
    assert!(!scheduler.alert().is_active());
}

#[test]
fn sign_out_with_three_pending_timers_tears_everything_down() {
    let list = vec![
        medication("A", "09:00"),
        medication("B", "10:00"),
        medication("C", "11:00"),
    ];
    let mut scheduler = scheduler(RecordingPlatform::granted());
    scheduler.rebuild(&list, true, at(7, 0, 0));
    assert_eq!(scheduler.pending_timers().len(), 3);
    scheduler.alert_mut().start(at(7, 0, 0));

    scheduler.teardown();

    assert!(scheduler.pending_timers().is_empty());
    assert_eq!(scheduler.alert().state(), AlertState::Idle);
    assert!(scheduler.tick(&list, at(12, 0, 0)).is_empty());
    assert!(scheduler.platform().sent.is_empty());
}

#[test]
fn deleted_medication_is_not_rearmed_from_stale_snapshot() {
    let doomed = medication("Doomed", "09:00");
    let kept = medication("Kept", "10:00");
    let stale = vec![doomed.clone(), kept.clone()];
    let mut scheduler = scheduler(RecordingPlatform::granted());
    scheduler.rebuild(&stale, true, at(7, 0, 0));

    assert!(scheduler.cancel(&doomed.id));
    assert!(scheduler.pending_timer(&doomed.id).is_none());

    let summary = scheduler.rebuild(&stale, true, at(7, 5, 0));
    assert_eq!(summary.skipped_deleted, 1);
    assert!(scheduler.pending_timer(&doomed.id).is_none());
    assert!(scheduler.pending_timer(&kept.id).is_some());

    let fired = scheduler.tick(&stale, at(9, 30, 0));
    assert!(fired.is_empty());
}

#[test]
fn cancel_then_rebuild_never_fires_pre_cancel_timer() {
    let med = medication("A", "09:00");
    let list = vec![med.clone()];
    let mut scheduler = scheduler(RecordingPlatform::granted());
    scheduler.rebuild(&list, true, at(7, 0, 0));

    scheduler.cancel(&med.id);
    scheduler.rebuild(&[], true, at(7, 1, 0));

    assert!(scheduler.tick(&list, at(9, 0, 0)).is_empty());
    assert!(!scheduler.cancel(&med.id));
}

#[test]
fn alert_repeats_and_auto_stops_through_scheduler_tick() {
    let list = vec![medication("A", "08:00")];
    let mut scheduler = scheduler(RecordingPlatform::granted());
    scheduler.rebuild(&list, true, at(7, 0, 0));
    scheduler.tick(&list, at(8, 0, 0));

    let mut now = at(8, 0, 0);
    while now < at(8, 1, 0) {
        now += Duration::seconds(1);
        scheduler.tick(&list, now);
    }

    assert_eq!(scheduler.alert().player().plays, 20);
    assert!(!scheduler.alert().is_active());
    assert_eq!(scheduler.next_wakeup(), None);
}

#[test]
fn notification_click_stops_alert_and_closes_matching_dialog() {
    let med = medication("A", "08:00");
    let list = vec![med.clone()];
    let mut scheduler = scheduler(RecordingPlatform::granted());
    scheduler.rebuild(&list, true, at(7, 0, 0));
    scheduler.tick(&list, at(8, 0, 0));

    scheduler.notification_clicked(&med.id);
    assert!(!scheduler.alert().is_active());
    assert!(scheduler.current_reminder().is_none());
}

#[test]
fn next_wakeup_reports_earliest_pending_timer() {
    let list = vec![medication("Late", "11:00"), medication("Early", "09:15")];
    let mut scheduler = scheduler(RecordingPlatform::granted());
    scheduler.rebuild(&list, true, at(7, 0, 0));

    assert_eq!(scheduler.next_wakeup(), Some(at(9, 15, 0)));
}
