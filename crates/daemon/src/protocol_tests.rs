use super::*;
use serde_json::json;

#[test]
fn request_serializes_to_the_method_args_wire_shape() {
    let request = Request::StartService(NameArg {
        name: "cms".to_string(),
    });
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({"method": "StartService", "args": {"name": "cms"}})
    );
}

#[test]
fn request_deserializes_from_the_method_args_wire_shape() {
    let value = json!({
        "method": "StopService",
        "args": {"name": "cms", "grace_period": "5s", "ticker_period": "200ms"}
    });
    let request: Request = serde_json::from_value(value).unwrap();
    match request {
        Request::StopService(args) => {
            assert_eq!(args.name, "cms");
            assert_eq!(args.grace_period, "5s");
            assert_eq!(args.ticker_period, "200ms");
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[test]
fn unit_variant_request_round_trips_without_args() {
    let value = json!({"method": "GetAllServiceCatalogEntries"});
    let request: Request = serde_json::from_value(value).unwrap();
    assert!(matches!(request, Request::GetAllServiceCatalogEntries));
}

#[test]
fn unrecognized_method_fails_to_deserialize() {
    let value = json!({"method": "DoesNotExist", "args": {}});
    assert!(serde_json::from_value::<Request>(value).is_err());
}

#[test]
fn envelope_omits_data_on_failure_and_error_on_success() {
    let ok = Envelope::ok(json!({"pid": 123}));
    let ok_value = serde_json::to_value(&ok).unwrap();
    assert_eq!(ok_value, json!({"success": true, "data": {"pid": 123}}));

    let err = Envelope::err("unknown method: Bogus");
    let err_value = serde_json::to_value(&err).unwrap();
    assert_eq!(
        err_value,
        json!({"success": false, "error": "unknown method: Bogus"})
    );
}

#[test]
fn parse_duration_accepts_ms_s_and_m() {
    assert_eq!(
        parse_duration("250ms").unwrap(),
        std::time::Duration::from_millis(250)
    );
    assert_eq!(
        parse_duration("5s").unwrap(),
        std::time::Duration::from_secs(5)
    );
    assert_eq!(
        parse_duration("2m").unwrap(),
        std::time::Duration::from_secs(120)
    );
}

#[test]
fn parse_duration_rejects_unknown_units_and_garbage() {
    assert!(parse_duration("5h").is_err());
    assert!(parse_duration("abc").is_err());
    assert!(parse_duration("").is_err());
    assert!(parse_duration("5").is_err());
}
