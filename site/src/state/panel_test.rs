use super::*;

fn panel() -> AdminPanel<i64> {
    AdminPanel::new(6)
}

#[test]
fn starts_on_listing_without_toast() {
    let panel = panel();
    assert_eq!(panel.mode(), &PanelMode::Listing);
    assert!(panel.toast().is_none());
    assert_eq!(panel.page(), 1);
    assert_eq!(panel.page_count(), 1);
}

#[test]
fn successful_create_returns_to_listing_with_toast() {
    let mut panel = panel();
    panel.start_create();
    panel.begin_submit().unwrap();
    panel.submit_succeeded("Case created", 10_000);

    assert_eq!(panel.mode(), &PanelMode::Listing);
    assert!(!panel.is_submitting());
    assert_eq!(panel.toast().unwrap().message, "Case created");
}

#[test]
fn toast_clears_after_three_seconds() {
    let mut panel = panel();
    panel.start_edit(4);
    panel.begin_submit().unwrap();
    panel.submit_succeeded("Saved", 1_000);

    panel.tick(3_999);
    assert!(panel.toast().is_some());
    panel.tick(4_000);
    assert!(panel.toast().is_none());
}

#[test]
fn double_submit_is_blocked() {
    let mut panel = panel();
    panel.start_create();
    assert_eq!(panel.begin_submit(), Ok(()));
    assert_eq!(panel.begin_submit(), Err(PanelError::Busy));

    panel.submit_failed();
    assert_eq!(panel.mode(), &PanelMode::Creating);
    assert_eq!(panel.begin_submit(), Ok(()));
}

#[test]
fn submit_needs_an_open_form() {
    let mut panel = panel();
    assert_eq!(panel.begin_submit(), Err(PanelError::NoForm));
}

#[test]
fn cannot_leave_form_mid_submit() {
    let mut panel = panel();
    panel.start_edit(9);
    panel.begin_submit().unwrap();
    panel.back_to_list();
    assert_eq!(panel.mode(), &PanelMode::Editing(9));
}

#[test]
fn delete_requires_confirmation() {
    let mut panel = panel();
    panel.set_total(3);
    assert_eq!(panel.confirm_delete(), Err(PanelError::NothingToConfirm));

    panel.request_delete(7).unwrap();
    assert_eq!(panel.pending_delete(), Some(&7));
    panel.cancel_delete();
    assert_eq!(panel.confirm_delete(), Err(PanelError::NothingToConfirm));

    panel.request_delete(7).unwrap();
    assert_eq!(panel.confirm_delete(), Ok(7));
    assert!(panel.pending_delete().is_none());
    assert!(panel.is_submitting());
}

#[test]
fn total_shrinks_only_after_server_confirms_delete() {
    let mut panel = panel();
    panel.set_total(7);
    panel.start_edit(7);

    panel.request_delete(7).unwrap();
    let id = panel.confirm_delete().unwrap();
    assert_eq!(panel.page_count(), 2);
    assert_eq!(panel.mode(), &PanelMode::Editing(7));

    panel.delete_succeeded(&id);
    assert!(!panel.is_submitting());
    assert_eq!(panel.mode(), &PanelMode::Listing);
    assert_eq!(panel.page_count(), 1);
}

#[test]
fn failed_delete_keeps_total_and_unblocks() {
    let mut panel = panel();
    panel.set_total(7);
    assert!(panel.next_page());

    panel.request_delete(42).unwrap();
    panel.confirm_delete().unwrap();
    panel.delete_failed();
    assert!(!panel.is_submitting());
    assert_eq!(panel.page(), 2, "row still exists, page stays");
    assert!(panel.request_delete(42).is_ok());
}

#[test]
fn confirm_is_rejected_while_busy() {
    let mut panel = panel();
    panel.start_create();
    panel.request_delete(3).unwrap();
    panel.begin_submit().unwrap();
    assert_eq!(panel.confirm_delete(), Err(PanelError::Busy));
    assert_eq!(panel.pending_delete(), Some(&3));

    panel.submit_failed();
    let id = panel.confirm_delete().unwrap();
    assert_eq!(panel.confirm_delete(), Err(PanelError::Busy));
    assert_eq!(panel.begin_submit(), Err(PanelError::Busy));
    panel.delete_succeeded(&id);
}

#[test]
fn delete_blocked_while_submitting() {
    let mut panel = panel();
    panel.start_create();
    panel.begin_submit().unwrap();
    assert_eq!(panel.request_delete(1), Err(PanelError::Busy));
}

#[test]
fn deleting_last_row_of_last_page_steps_back() {
    let mut panel = panel();
    panel.set_total(7);
    assert!(panel.next_page());
    assert_eq!(panel.page(), 2);

    panel.request_delete(42).unwrap();
    let id = panel.confirm_delete().unwrap();
    assert_eq!(panel.page(), 2);
    panel.delete_succeeded(&id);
    assert_eq!(panel.page_count(), 1);
    assert_eq!(panel.page(), 1);
}

#[test]
fn paging_is_bounded() {
    let mut panel = panel();
    panel.set_total(14);
    assert_eq!(panel.page_count(), 3);
    assert!(!panel.prev_page());
    assert!(panel.next_page());
    assert!(panel.next_page());
    assert!(!panel.next_page());
    assert_eq!(panel.page(), 3);
    assert!(panel.go_to(0));
    assert_eq!(panel.page(), 1);
}

#[test]
fn create_bumps_total() {
    let mut panel = panel();
    panel.set_total(6);
    panel.start_create();
    panel.begin_submit().unwrap();
    panel.submit_succeeded("Created", 0);
    assert_eq!(panel.page_count(), 2);
}

#[test]
fn zero_limit_is_treated_as_one() {
    let panel: AdminPanel<i64> = AdminPanel::new(0);
    assert_eq!(panel.limit(), 1);
}
