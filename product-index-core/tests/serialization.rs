use product_index_core::{Availability, CellValue, MetadataRow};

#[test]
fn cell_values_serialize_as_plain_json() {
    assert_eq!(serde_json::to_string(&CellValue::Int(150)).unwrap(), "150");
    assert_eq!(serde_json::to_string(&CellValue::Float(12.5)).unwrap(), "12.5");
    assert_eq!(serde_json::to_string(&CellValue::Bool(true)).unwrap(), "true");
    assert_eq!(
        serde_json::to_string(&CellValue::Text("Łódź".to_string())).unwrap(),
        "\"Łódź\""
    );
}

#[test]
fn cell_values_deserialize_by_shape() {
    let v: CellValue = serde_json::from_str("10").unwrap();
    assert_eq!(v, CellValue::Int(10));
    let v: CellValue = serde_json::from_str("10.5").unwrap();
    assert_eq!(v, CellValue::Float(10.5));
    let v: CellValue = serde_json::from_str("\"A10\"").unwrap();
    assert_eq!(v, CellValue::Text("A10".to_string()));
}

#[test]
fn availability_serializes_by_name() {
    assert_eq!(
        serde_json::to_string(&Availability::Unavailable).unwrap(),
        "\"Unavailable\""
    );
    assert_eq!(Availability::Unknown.to_string(), "Unknown");
}

#[test]
fn empty_row_fields_serialize_as_null() {
    let row = MetadataRow::new("Ring");
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["item"], "Ring");
    assert!(json["type"].is_null());
    assert!(json["price"].is_null());
}
