use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use photo_geotag::app::Session;
use photo_geotag::config::ElevationConfig;
use photo_geotag::core::elevation::{ElevationClient, ElevationError, ElevationSource};
use photo_geotag::core::metadata::MetadataEngine;
use photo_geotag::models::Rational;

// The client blocks on its own runtime, so the mock server is driven from a
// separate one and the lookups run outside of it.
fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("should build test runtime")
}

fn client_for(server: &MockServer) -> ElevationClient {
    ElevationClient::new(ElevationConfig {
        endpoint: format!("{}/punkt", server.uri()),
        ..ElevationConfig::default()
    })
    .expect("should build elevation client")
}

#[test]
fn lookup_returns_first_point_height() {
    let rt = test_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/punkt"))
            .and(query_param("koordsys", "4258"))
            .and(query_param("nord", "61.5"))
            .and(query_param("ost", "7.25"))
            .and(query_param("geojson", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "koordsys": 4258,
                "points": [{"x": 7.25, "y": 61.5, "z": 1043.7, "terreng": "Fjell"}]
            })))
            .expect(1)
            .mount(&server),
    );

    let client = client_for(&server);
    assert_eq!(client.lookup(61.5, 7.25), Some(1043.7));
}

#[test]
fn server_error_means_unknown_height_and_zero_altitude() {
    let rt = test_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server),
    );

    let client = client_for(&server);
    assert!(matches!(
        client.fetch(61.5, 7.25),
        Err(ElevationError::Status(status)) if status.as_u16() == 500
    ));

    let mut session = Session::new(client);
    let point = session.set_point("61.5", "7.25").expect("valid point");
    assert_eq!(point.elevation, None);

    let group = MetadataEngine::gps_group_for(&point);
    assert_eq!(group.altitude, Rational::new(0, 100));
    assert_eq!(group.altitude_ref, 0);
}

#[test]
fn body_without_height_is_unknown() {
    let rt = test_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"points": []})))
            .mount(&server),
    );

    let client = client_for(&server);
    assert_eq!(client.lookup(0.0, 0.0), None);
}

#[test]
fn unreachable_service_is_unknown() {
    let client = ElevationClient::new(ElevationConfig {
        endpoint: String::from("http://127.0.0.1:9/punkt"),
        ..ElevationConfig::default()
    })
    .expect("should build elevation client");

    assert_eq!(client.lookup(61.5, 7.25), None);
}
