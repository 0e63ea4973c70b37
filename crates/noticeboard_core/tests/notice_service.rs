use noticeboard_core::db::open_db_in_memory;
use noticeboard_core::{
    Category, NoticeDraft, NoticeService, NoticeServiceError, NoticeStatus,
    NoticeValidationError, SqliteNoticeRepository,
};
use rusqlite::Connection;

const NOW: i64 = 1_700_000_000_000;
const HOUR_MS: i64 = 3_600_000;

#[test]
fn post_fans_out_lines_with_shared_created_at() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let outcome = service
        .post_notice(&draft("Fire drill at 10:00\nAssemble in the car park"), NOW)
        .unwrap();
    assert_eq!(outcome.count(), 2);
    assert_eq!(outcome.created_at, NOW);

    for id in &outcome.ids {
        let notice = service.get_notice(*id).unwrap().unwrap();
        assert_eq!(notice.created_at, NOW);
        assert_eq!(notice.category, Category::Administration);
    }
}

#[test]
fn post_rejects_missing_fields_and_bad_window() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut no_author = draft("body");
    no_author.author = "  ".to_string();
    let err = service.post_notice(&no_author, NOW).unwrap_err();
    assert!(matches!(
        err,
        NoticeServiceError::Validation(NoticeValidationError::MissingField("author"))
    ));

    let mut reversed = draft("body");
    reversed.end_at = reversed.start_at - HOUR_MS;
    let err = service.post_notice(&reversed, NOW).unwrap_err();
    assert!(matches!(
        err,
        NoticeServiceError::Validation(NoticeValidationError::InvalidWindow { .. })
    ));

    let page = service
        .browse_active(Category::Administration, 1, None, NOW)
        .unwrap();
    assert_eq!(page.total_count, 0);
}

#[test]
fn clear_requires_confirmation() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.post_notice(&draft("a\nb"), NOW).unwrap();

    let err = service.clear_all(false).unwrap_err();
    assert!(matches!(err, NoticeServiceError::ClearNotConfirmed));
    assert_eq!(
        service
            .browse_active(Category::Administration, 1, None, NOW)
            .unwrap()
            .total_count,
        2
    );

    assert_eq!(service.clear_all(true).unwrap(), 2);
    assert_eq!(
        service
            .browse_active(Category::Administration, 1, None, NOW)
            .unwrap()
            .total_count,
        0
    );
}

#[test]
fn mark_read_and_important_toggle_independently() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = service.post_notice(&draft("line"), NOW).unwrap().ids[0];

    assert_eq!(
        service.mark_important(id, true).unwrap(),
        NoticeStatus::new(false, true)
    );
    assert_eq!(
        service.mark_read(id, true).unwrap(),
        NoticeStatus::new(true, true)
    );
    assert_eq!(
        service.mark_important(id, false).unwrap(),
        NoticeStatus::new(true, false)
    );

    let stored = service.get_notice(id).unwrap().unwrap();
    assert_eq!(stored.status, NoticeStatus::new(true, false));
}

#[test]
fn status_updates_on_missing_notice_map_to_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.mark_read(42, true).unwrap_err();
    assert!(matches!(err, NoticeServiceError::NoticeNotFound(42)));

    let err = service.set_status(42, NoticeStatus::NONE).unwrap_err();
    assert!(matches!(err, NoticeServiceError::NoticeNotFound(42)));
}

#[test]
fn notice_moves_from_active_to_expired_as_time_passes() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = service.post_notice(&draft("short lived"), NOW).unwrap().ids[0];

    let during = NOW + HOUR_MS / 2;
    assert_eq!(
        service
            .browse_active(Category::Administration, 1, None, during)
            .unwrap()
            .items[0]
            .id,
        id
    );
    assert!(service
        .list_expired(Category::Administration, during)
        .unwrap()
        .is_empty());

    let after = NOW + 2 * HOUR_MS;
    assert!(service
        .browse_active(Category::Administration, 1, None, after)
        .unwrap()
        .items
        .is_empty());
    let expired = service.list_expired(Category::Administration, after).unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, id);
}

#[test]
fn active_page_serializes_for_front_ends() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.post_notice(&draft("line"), NOW).unwrap();
    let id = service
        .browse_active(Category::Administration, 1, None, NOW)
        .unwrap()
        .items[0]
        .id;
    service.mark_important(id, true).unwrap();

    let page = service
        .browse_active(Category::Administration, 1, None, NOW)
        .unwrap();
    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["total_count"], 1);
    assert_eq!(json["total_pages"], 1);
    assert_eq!(json["items"][0]["category"], "administration");
    assert_eq!(json["items"][0]["status"]["important"], true);
    assert_eq!(json["items"][0]["status"]["read"], false);
}

fn service(conn: &Connection) -> NoticeService<SqliteNoticeRepository<'_>> {
    NoticeService::new(SqliteNoticeRepository::try_new(conn).unwrap())
}

fn draft(content: &str) -> NoticeDraft {
    NoticeDraft {
        title: "Safety".to_string(),
        author: "facilities".to_string(),
        category: Category::Administration,
        content: content.to_string(),
        start_at: NOW,
        end_at: NOW + HOUR_MS,
    }
}
