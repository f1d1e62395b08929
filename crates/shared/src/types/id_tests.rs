use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_is_time_ordered() {
    let first = OrderId::new();
    let second = OrderId::new();
    assert_ne!(first, second);
    assert_eq!(first.into_inner().get_version_num(), 7);
}

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = BudgetId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = UserId::from_uuid(uuid);
    assert_eq!(format!("{id}"), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = OrderId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
    assert!(OrderId::from_str("invalid").is_err());
}

#[test]
fn test_typed_id_serializes_transparently() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_value(AuditLogId::from_uuid(uuid)).unwrap();
    assert_eq!(json, serde_json::Value::String(uuid.to_string()));
}
