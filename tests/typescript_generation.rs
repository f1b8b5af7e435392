//! TypeScript Generation Tests
//!
//! Validates that truckconnect types can be exported to TypeScript when the tauri
//! feature is enabled.

#[cfg(feature = "tauri")]
#[test]
fn test_core_types_implement_specta_type() {
    use specta::Type;

    fn assert_type<T: Type>() {}

    // Values
    assert_type::<truckconnect::PrimitiveType>();
    assert_type::<truckconnect::Value>();
    assert_type::<truckconnect::FPlacement>();
    assert_type::<truckconnect::DPlacement>();
    assert_type::<truckconnect::codec::ChannelStorage>();

    // Schema and protocol
    assert_type::<truckconnect::TelemetryId>();
    assert_type::<truckconnect::FieldOffsets>();
    assert_type::<truckconnect::schema::ChannelCategory>();
    assert_type::<truckconnect::CommunicationResult>();
    assert_type::<truckconnect::TrailerIndexOrCount>();
    assert_type::<truckconnect::Version>();
    assert_type::<truckconnect::connection::EventRecord>();
}

#[cfg(not(feature = "tauri"))]
#[test]
fn test_tauri_feature_disabled() {
    // types still serialize without specta
    let json = serde_json::to_string(&truckconnect::PrimitiveType::FVector).unwrap();
    assert_eq!(json, "\"fvector\"");
}
