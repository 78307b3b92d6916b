use super::paste::*;

fn new_paste(ttl_seconds: Option<u64>, max_views: Option<u64>) -> NewPaste {
    NewPaste {
        content: "<b>hi</b> & bye".to_string(),
        ttl_seconds,
        max_views,
    }
}

#[test]
fn new_paste_derives_expiry_from_ttl() {
    let paste = Paste::new("abc".to_string(), new_paste(Some(2), Some(3)), 1_000);
    assert_eq!(paste.created_at, 1_000);
    assert_eq!(paste.expires_at, Some(3_000));
    assert_eq!(paste.views_count, 0);
    assert_eq!(paste.max_views, Some(3));
    assert_eq!(paste.content, "<b>hi</b> & bye");
}

#[test]
fn new_paste_without_ttl_has_no_expiry() {
    let paste = Paste::new("abc".to_string(), new_paste(None, None), 1_000);
    assert_eq!(paste.expires_at, None);
    assert_eq!(paste.ttl_seconds, None);
}

#[test]
fn huge_ttl_saturates_instead_of_overflowing() {
    let paste = Paste::new("abc".to_string(), new_paste(Some(u64::MAX), None), 5);
    assert_eq!(paste.expires_at, Some(i64::MAX));
    let rendered = paste.expires_at.map(format_timestamp_ms).expect("deadline set");
    assert!(rendered.ends_with("59.999Z"), "{}", rendered);
}

#[test]
fn timestamps_render_like_iso_strings() {
    assert_eq!(
        format_timestamp_ms(1_704_067_202_000),
        "2024-01-01T00:00:02.000Z"
    );
    assert_eq!(
        format_timestamp_ms(1_704_067_200_123),
        "2024-01-01T00:00:00.123Z"
    );
}

#[test]
fn out_of_range_timestamps_clamp_instead_of_vanishing() {
    let latest = format_timestamp_ms(i64::MAX);
    assert!(latest.ends_with('Z'), "{}", latest);
    assert_eq!(
        latest,
        chrono::DateTime::<chrono::Utc>::MAX_UTC
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    );
    assert!(!format_timestamp_ms(i64::MIN).is_empty());
}

#[test]
fn view_serializes_nulls_for_unlimited_pastes() {
    let view = PasteView {
        content: "x".to_string(),
        remaining_views: None,
        expires_at: None,
    };
    let json = serde_json::to_value(&view).expect("serialize view");
    assert_eq!(
        json,
        serde_json::json!({ "content": "x", "remaining_views": null, "expires_at": null })
    );
}

#[test]
fn record_survives_bincode_storage_encoding() {
    let paste = Paste::new("id".to_string(), new_paste(Some(9), None), 42);
    let bytes = bincode::serialize(&paste).expect("encode");
    let decoded: Paste = bincode::deserialize(&bytes).expect("decode");
    assert_eq!(decoded, paste);
}
