//! Relay integration tests. Drive both stores the way an orchestrator does.
//!
//! Run with: `cargo test -p pass-pairing-relay --test integration`

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use pass_pairing_core::config::Config;
use pass_pairing_core::{PairingError, PairingInfo};
use pass_pairing_relay::{RelayError, RelayFrame, RelayState, attach_device, forward_to_device};

/// Build relay state from a JSON5 config file on disk.
fn state_from_file(contents: &str) -> RelayState {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pass-pairing.json5");
    std::fs::write(&path, contents).unwrap();
    RelayState::new(Config::load(&path).unwrap())
}

#[tokio::test]
async fn test_extension_to_device_flow() {
    let state = RelayState::new(Config::default());

    // Upgrade layer: extension announces itself
    assert!(!state.pairing.exists("ext-1"));
    state.pairing.add("ext-1");
    assert!(state.pairing.exists("ext-1"));

    // Pairing negotiation: mobile side stores handshake state
    let info = PairingInfo::new()
        .with("token", "abc")
        .with("device_id", "dev-1");
    state.pairing.set_pairing_info("ext-1", info.clone()).unwrap();
    assert_eq!(state.pairing.get_pairing_info("ext-1").unwrap(), info);

    // Transport accept: device socket comes up
    let (_conn, mut outbound) = attach_device(&state, "dev-1");

    // Relay: look up the paired device and forward
    let paired = state.pairing.get_pairing_info("ext-1").unwrap();
    let device_id = paired.get("device_id").and_then(|v| v.as_str()).unwrap();
    forward_to_device(&state, device_id, "ext-1", json!({"op": "fill", "id": 7})).unwrap();

    let text = outbound.next().await.unwrap();
    let frame: RelayFrame = serde_json::from_str(&text).unwrap();
    assert_eq!(
        frame,
        RelayFrame::Relay {
            from: "ext-1".into(),
            payload: json!({"op": "fill", "id": 7}),
        }
    );
}

#[tokio::test]
async fn test_missing_extension_and_device() {
    let state = RelayState::new(Config::default());

    let err = state.pairing.get_pairing_info("ext-missing").unwrap_err();
    assert!(matches!(err, PairingError::NotFound { ref extension_id } if extension_id == "ext-missing"));

    let err = state
        .pairing
        .set_pairing_info("ext-missing", PairingInfo::new().with("token", "abc"))
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!state.pairing.exists("ext-missing"));

    assert!(state.connections.get_connection("dev-2").is_none());
    let err = forward_to_device(&state, "dev-2", "ext-1", json!({})).unwrap_err();
    assert!(matches!(err, RelayError::DeviceNotConnected { .. }));
}

#[tokio::test]
async fn test_device_reconnect_replaces_connection() {
    let state = RelayState::new(Config::default());

    let (c1, mut out1) = attach_device(&state, "dev-1");
    let (c2, mut out2) = attach_device(&state, "dev-1");

    let current = state.connections.get_connection("dev-1").unwrap();
    assert!(Arc::ptr_eq(&current, &c2));
    assert!(c1.is_closed());
    assert!(out1.next().await.is_none());

    forward_to_device(&state, "dev-1", "ext-1", json!("ping")).unwrap();
    assert!(out2.next().await.is_some());
    assert_eq!(state.connections.len(), 1);
}

#[tokio::test]
async fn test_stores_are_isolated_per_state() {
    let a = RelayState::new(Config::default());
    let b = RelayState::new(Config::default());

    a.pairing.add("ext-1");
    let _ = attach_device(&a, "dev-1");

    assert!(!b.pairing.exists("ext-1"));
    assert!(b.connections.get_connection("dev-1").is_none());
}

#[tokio::test]
async fn test_configured_ttl_expires_pairings() {
    let state = state_from_file("{pairing: {ttl_secs: 1, sweep_interval_secs: 1}}");
    let sweeper = state.start_sweeper().expect("sweeper should start with a TTL");

    state.pairing.add("ext-1");
    assert!(state.pairing.exists("ext-1"));

    let mut swept = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if state.pairing.is_empty() {
            swept = true;
            break;
        }
    }
    assert!(swept, "expired pairing was not swept");
    assert!(state.pairing.get_pairing_info("ext-1").unwrap_err().is_not_found());

    state.shutdown();
    sweeper.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pairing_and_connections() {
    let state = Arc::new(RelayState::new(Config::default()));

    let tasks: Vec<_> = (0..32)
        .map(|t| {
            let state = state.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    let ext = format!("ext-{t}-{i}");
                    let dev = format!("dev-{t}-{i}");
                    state.pairing.add(&ext);
                    state
                        .pairing
                        .set_pairing_info(&ext, PairingInfo::new().with("device_id", dev.clone()))
                        .unwrap();
                    let (_conn, outbound) = attach_device(&state, &dev);
                    forward_to_device(&state, &dev, &ext, json!(i)).unwrap();
                    drop(outbound);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(state.pairing.len(), 32 * 50);
    assert_eq!(state.connections.len(), 32 * 50);
    for t in 0..32 {
        for i in 0..50 {
            let info = state.pairing.get_pairing_info(&format!("ext-{t}-{i}")).unwrap();
            let expected = format!("dev-{t}-{i}");
            assert_eq!(info.get("device_id").and_then(|v| v.as_str()), Some(expected.as_str()));
        }
    }
}
