//! End-to-end tests: tracker, consumers and a local ingestion endpoint

use std::fs;

use sensors_client::consumer::{
    BatchConsumer, BatchConsumerConfig, DebugConsumer, DebugConsumerConfig, FileConsumer,
};
use sensors_client::event::{Properties, PropertyValue, properties};
use sensors_client::test::MockServer;
use sensors_client::{ClientConfig, Consumer, DebugError, Error, Tracker};
use tempfile::TempDir;

#[test]
fn test_batch_delivery_end_to_end() {
    let server = MockServer::start().unwrap();
    let consumer = BatchConsumer::new(
        BatchConsumerConfig::new(server.url("/sa?project=default")).with_max_size(3),
    )
    .unwrap();
    let mut tracker = Tracker::new(consumer);
    tracker.register_super_properties(properties([("$app_version", "2.1.0")]));

    tracker
        .track(
            "u1",
            "login",
            properties([
                ("$time", PropertyValue::from(1_690_000_000_000_i64)),
                ("plan", "pro".into()),
            ]),
        )
        .unwrap();
    tracker
        .profile_set("u1", properties([("name", "Ada")]))
        .unwrap();
    assert_eq!(server.request_count(), 0);

    // Third record reaches max_size
    tracker.profile_unset_keys("u1", ["age", "city"]).unwrap();
    assert_eq!(server.request_count(), 1);

    tracker.track("u2", "logout", Properties::new()).unwrap();
    assert!(tracker.close().unwrap());
    assert_eq!(server.request_count(), 2);

    let first = server.requests()[0].events();
    assert_eq!(first.len(), 3);
    assert_eq!(first[0]["type"], "track");
    assert_eq!(first[0]["time"], 1_690_000_000_000_i64);
    assert_eq!(first[0]["properties"]["plan"], "pro");
    assert_eq!(first[0]["properties"]["$app_version"], "2.1.0");
    assert_eq!(first[0]["lib"]["$app_version"], "2.1.0");
    assert!(
        first[0]["lib"]["$lib_detail"]
            .as_str()
            .unwrap()
            .contains("tracker_integration.rs")
    );
    assert_eq!(first[1]["type"], "profile_set");
    assert_eq!(first[2]["type"], "profile_unset");
    assert_eq!(first[2]["properties"]["age"], true);

    let second = server.requests()[1].events();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0]["distinct_id"], "u2");
}

#[test]
fn test_debug_consumer_rejection_surfaces() {
    let server = MockServer::with_response(400, "bad event").unwrap();
    let consumer = DebugConsumer::new(DebugConsumerConfig::new(server.url("/sa")).dry_run())
        .unwrap()
        .with_output(Vec::new());
    let mut tracker = Tracker::new(consumer);

    let err = tracker
        .track("u1", "login", Properties::new())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Debug(DebugError::UnexpectedResponse { status: 400, .. })
    ));

    let request = &server.requests()[0];
    assert!(request.path.starts_with("/debug"));
    assert_eq!(request.header("dry-run"), Some("true"));
    assert!(String::from_utf8_lossy(tracker.consumer().output()).contains("ret_code: 400"));
}

#[test]
fn test_file_consumer_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.log");
    let mut tracker = Tracker::new(FileConsumer::new(&path).unwrap());

    tracker
        .track_signup("user-42", "anon-7", Properties::new())
        .unwrap();
    tracker.profile_delete("user-42").unwrap();
    assert!(tracker.track("", "login", Properties::new()).is_err());
    tracker.close().unwrap();

    let records: Vec<serde_json::Value> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["event"], "$SignUp");
    assert_eq!(records[0]["original_id"], "anon-7");
    assert_eq!(records[1]["type"], "profile_delete");
    assert_eq!(records[1]["properties"], serde_json::json!({}));
}

#[test]
fn test_tracker_from_config_file() {
    let server = MockServer::start().unwrap();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("sensors.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[consumer]
type = "batch"
url = "{}"
max_size = 10

[super_properties]
platform = "server"
"#,
            server.url("/sa")
        ),
    )
    .unwrap();

    let config = ClientConfig::from_file(&config_path).unwrap();
    let mut tracker = Tracker::from_config(&config).unwrap();
    tracker.track("u1", "login", Properties::new()).unwrap();
    assert_eq!(server.request_count(), 0);

    assert!(tracker.flush().unwrap());
    let events = server.requests()[0].events();
    assert_eq!(events[0]["properties"]["platform"], "server");
}

#[test]
fn test_boxed_consumers_interchangeable() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().unwrap();

    let consumers: Vec<Box<dyn Consumer>> = vec![
        Box::new(FileConsumer::new(dir.path().join("a.log")).unwrap()),
        Box::new(BatchConsumer::new(BatchConsumerConfig::new(server.url("/sa"))).unwrap()),
    ];

    for consumer in consumers {
        let mut tracker = Tracker::new(consumer);
        assert!(tracker.track("u1", "login", Properties::new()).unwrap());
        assert!(tracker.close().unwrap());
    }
    assert_eq!(server.request_count(), 1);
}
