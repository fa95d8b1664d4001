//! Tests for `message` module

use crate::message::*;
use crate::table::RowId;

#[test]
fn test_violation_message_fields() {
    // Arrange & Act
    let msg = Message::unique_key_violation("code", RowId::new(4), 2, vec![0], false);

    // Assert
    assert_eq!(msg.code, MSGCODE_UNIQUE_KEY_VIOLATION);
    assert_eq!(msg.severity, Severity::Error);
    assert_eq!(msg.row, Some(RowId::new(4)));
    assert_eq!(msg.row_index, Some(2));
    assert_eq!(msg.unique_key.as_deref(), Some("code"));
    assert!(msg.text.contains("row 3"));
    assert!(msg.text.contains("duplicate"));
    assert!(msg.limit.is_none());
}

#[test]
fn test_overlap_message_wording() {
    let msg = Message::unique_key_violation("validity", RowId::new(1), 0, vec![1, 2], true);
    assert!(msg.text.contains("overlap"));
}

#[test]
fn test_too_many_message_carries_limit() {
    // Arrange & Act
    let msg = Message::too_many_violations("code", vec![0], 10);

    // Assert
    assert_eq!(msg.code, MSGCODE_TOO_MANY_UNIQUE_KEY_VIOLATIONS);
    assert_eq!(msg.limit, Some(10));
    assert!(msg.row.is_none());
    assert!(msg.text.contains("10"));
}

#[test]
fn test_message_list_queries() {
    // Arrange
    let mut list = MessageList::new();
    list.add(Message::unique_key_violation("a", RowId::new(1), 0, vec![0], false));
    list.add(Message::unique_key_violation("b", RowId::new(2), 1, vec![1], false));
    list.add(Message::too_many_violations("b", vec![1], 10));

    // Act & Assert
    assert_eq!(list.len(), 3);
    assert!(list.contains_errors());
    assert_eq!(list.for_row(RowId::new(2)).count(), 1);
    assert_eq!(list.for_unique_key("b").count(), 2);
    assert!(list
        .message_by_code(MSGCODE_TOO_MANY_UNIQUE_KEY_VIOLATIONS)
        .is_some());
}

#[test]
fn test_empty_list_has_no_severity() {
    let list = MessageList::new();
    assert_eq!(list.severity(), None);
    assert!(!list.contains_errors());
}

#[test]
fn test_message_list_serializes_as_array() {
    // Arrange
    let list: MessageList = vec![Message::too_many_violations("k", vec![], 10)]
        .into_iter()
        .collect();

    // Act
    let json = serde_json::to_value(&list).expect("serialize");

    // Assert
    assert!(json.is_array());
    assert_eq!(json[0]["code"], "UKV-002");
    assert_eq!(json[0]["severity"], "error");
}
