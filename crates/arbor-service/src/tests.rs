//! End-to-end tests against a live server on an ephemeral port.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use arbor_config::Config;
use arbor_engine::GenerationEngine;

use crate::demo::demo_context;
use crate::BridgeServer;

fn running_server() -> BridgeServer {
    let context = demo_context(&Config::default()).unwrap();
    let mut server = BridgeServer::new("127.0.0.1", 0); // port 0 = OS assigns
    server.start(Arc::new(Mutex::new(context))).unwrap();

    // Give server a moment to start
    thread::sleep(Duration::from_millis(100));
    server
}

#[test]
fn test_health_endpoint_responds() {
    let mut server = running_server();
    let port = server.actual_port();

    let resp = ureq::get(&format!("http://localhost:{}/health", port))
        .call()
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
    server.stop();
}

#[test]
fn test_rules_endpoint_lists_rules_and_attributes() {
    let mut server = running_server();
    let port = server.actual_port();

    let resp = ureq::get(&format!("http://localhost:{}/rules", port))
        .call()
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    let rules = body["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["name"], "Default$Lot");
    assert!(rules[0]["parameters"].as_array().unwrap().is_empty());

    let attributes = body["attributes"].as_array().unwrap();
    assert_eq!(attributes.len(), 4);
    assert_eq!(attributes[0]["name"], "hasRoof");
    assert_eq!(attributes[0]["returnType"], "bool");
    assert_eq!(attributes[1]["returnType"], "float");
    assert_eq!(attributes[3]["returnType"], "enum");
    server.stop();
}

#[test]
fn test_generate_returns_shape_results() {
    let mut server = running_server();
    let port = server.actual_port();

    let resp = ureq::post(&format!("http://localhost:{}/generate", port))
        .set("Content-Type", "application/json")
        .send_string(
            r#"{
                "vertices": [0, 0, 0, 10, 0, 0, 10, 0, 10, 0, 0, 10],
                "indices": [0, 1, 2, 0, 2, 3],
                "uid": "lot-17"
            }"#,
        )
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    let shapes = body.as_array().unwrap();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0]["uids"], serde_json::json!(["lot-17"]));

    let data = &shapes[0]["data"];
    let meshes = data["meshes"].as_array().unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0]["name"], "building");
    assert_eq!(meshes[0]["vertices"].as_array().unwrap().len(), 12);
    assert_eq!(meshes[0]["submeshes"][0]["material"], 0);
    assert_eq!(data["materials"][0]["name"], "wall");
    server.stop();
}

#[test]
fn test_generate_applies_attribute_overrides() {
    let context = demo_context(&Config::default()).unwrap();
    let shared = Arc::new(Mutex::new(context));
    let mut server = BridgeServer::new("127.0.0.1", 0);
    server.start(shared.clone()).unwrap();
    thread::sleep(Duration::from_millis(100));

    let port = server.actual_port();
    let resp = ureq::post(&format!("http://localhost:{}/generate", port))
        .set("Content-Type", "application/json")
        .send_string(
            r#"{
                "vertices": [0, 0, 0, 10, 0, 0, 10, 0, 10],
                "indices": [0, 1, 2],
                "attributes": {"height": 42.0, "roofStyle": "hip"}
            }"#,
        )
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The overrides were flushed to the engine during generation.
    let ctx = shared.lock().unwrap();
    assert_eq!(ctx.engine().float_value(1).map(|b| b.value), Some(42.0));
    assert_eq!(ctx.engine().enum_selection(3), Some(2));
    drop(ctx);
    server.stop();
}

#[test]
fn test_generate_with_empty_shape_returns_422() {
    let mut server = running_server();
    let port = server.actual_port();

    let resp = ureq::post(&format!("http://localhost:{}/generate", port))
        .set("Content-Type", "application/json")
        .send_string(r#"{"vertices": [], "indices": []}"#);

    match resp {
        Err(ureq::Error::Status(code, response)) => {
            assert_eq!(code, 422);
            let body: serde_json::Value =
                serde_json::from_str(&response.into_string().unwrap()).unwrap();
            assert!(body["error"].as_str().unwrap().contains("generation"));
        }
        other => panic!("expected 422 status error, got {other:?}"),
    }
    server.stop();
}

#[test]
fn test_unknown_endpoint_returns_404() {
    let mut server = running_server();
    let port = server.actual_port();

    let resp = ureq::get(&format!("http://localhost:{}/nonexistent", port)).call();
    assert!(resp.is_err());
    if let Err(ureq::Error::Status(code, _)) = resp {
        assert_eq!(code, 404);
    } else {
        panic!("Expected 404 status error");
    }
    server.stop();
}
