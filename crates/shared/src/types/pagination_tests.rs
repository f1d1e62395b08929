use super::*;

#[test]
fn test_default_page_request() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 50);
    assert_eq!(request.offset(), 0);
    assert_eq!(request.limit(), 50);
}

#[test]
fn test_offset_for_later_pages() {
    let request = PageRequest::new(3, 20);
    assert_eq!(request.offset(), 40);
    assert_eq!(request.limit(), 20);
}

#[test]
fn test_new_clamps_values() {
    let request = PageRequest::new(0, 10_000);
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, MAX_PER_PAGE);

    let request = PageRequest::new(2, 0);
    assert_eq!(request.per_page, 1);
}

#[test]
fn test_deserialized_zero_per_page_still_limits() {
    let request: PageRequest = serde_json::from_str(r#"{"page": 2, "per_page": 0}"#).unwrap();
    assert_eq!(request.limit(), 1);
    assert_eq!(request.offset(), 1);
}

