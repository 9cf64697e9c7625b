//! # Gateway Pipeline Tests
//!
//! Drives the full service loop with a scripted coordinator and asserts
//! the middleware contract: check ordering, short-circuiting, reply
//! discipline, and the side effects each namespace triggers.

#[cfg(test)]
mod tests {
    use crate::integration::support::{harness, valid_payload, ScriptedCoordinator, NETHASH};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_valid_peer_traffic_is_forwarded_with_stamped_address() {
        let (coordinator, driver) = harness(ScriptedCoordinator::default(), "203.0.113.5");

        let reply = driver
            .emit("p2p.peer.getStatus", valid_payload())
            .await
            .await
            .unwrap();

        assert!(!reply.is_err());
        assert_eq!(reply.data.unwrap()["success"], true);

        let relayed = coordinator.relayed.lock();
        assert_eq!(relayed.len(), 1);
        assert_eq!(relayed[0].endpoint, "p2p.peer.getStatus");
        assert_eq!(relayed[0].data["height"], 5544);

        let headers = relayed[0].headers.as_ref().unwrap();
        assert_eq!(headers.remote_address(), Some("203.0.113.5"));
        assert_eq!(headers.get("version"), Some("2.1.0"));
    }

    #[tokio::test]
    async fn test_peer_acceptance_fires_before_forwarding() {
        let (coordinator, driver) = harness(ScriptedCoordinator::default(), "203.0.113.5");

        driver
            .emit("p2p.peer.getStatus", valid_payload())
            .await
            .await
            .unwrap();

        assert_eq!(
            coordinator.calls_after_setup(),
            vec!["is_app_ready", "accept_new_peer", "relay"]
        );
    }

    #[tokio::test]
    async fn test_missing_headers_short_circuits_without_coordinator_calls() {
        let (coordinator, driver) = harness(ScriptedCoordinator::default(), "203.0.113.5");

        let reply = driver
            .emit(
                "p2p.peer.getStatus",
                serde_json::json!({"data": {"height": 1}}),
            )
            .await
            .await
            .unwrap();

        let payload = reply.error.unwrap();
        assert_eq!(payload.name.as_deref(), Some("HeadersRequired"));
        assert_eq!(payload.message, "Request data and data.headers is mandatory");
        assert!(coordinator.calls_after_setup().is_empty());
    }

    #[tokio::test]
    async fn test_header_violations_are_aggregated_before_readiness_check() {
        let (coordinator, driver) = harness(ScriptedCoordinator::default(), "203.0.113.5");

        let reply = driver
            .emit(
                "p2p.peer.getStatus",
                serde_json::json!({
                    "data": {},
                    "headers": {"version": "not-semver", "nethash": NETHASH}
                }),
            )
            .await
            .await
            .unwrap();

        let payload = reply.error.unwrap();
        assert_eq!(payload.name.as_deref(), Some("HeadersValidationFailed"));
        assert!(payload.message.starts_with("Headers validation failed: "));
        assert!(payload.message.contains("headers.version"));
        assert!(payload.message.contains("headers.port"));
        // Schema rejection precedes any coordinator involvement
        assert!(coordinator.calls_after_setup().is_empty());
    }

    #[tokio::test]
    async fn test_not_ready_subsystem_blocks_forwarding() {
        let (coordinator, driver) = harness(
            ScriptedCoordinator::default().with_not_ready("transaction-pool"),
            "203.0.113.5",
        );

        let reply = driver
            .emit("p2p.peer.getStatus", valid_payload())
            .await
            .await
            .unwrap();

        let payload = reply.error.unwrap();
        assert_eq!(payload.name.as_deref(), Some("AppNotReady"));
        assert_eq!(
            payload.message,
            "Application is not ready : transaction-pool is not ready"
        );
        assert_eq!(coordinator.calls_after_setup(), vec!["is_app_ready"]);
    }

    #[tokio::test]
    async fn test_internal_traffic_from_unlisted_ip_is_rejected() {
        let (coordinator, driver) = harness(ScriptedCoordinator::default(), "203.0.113.5");

        let reply = driver
            .emit("p2p.internal.getUsernames", valid_payload())
            .await
            .await
            .unwrap();

        let payload = reply.error.unwrap();
        assert_eq!(payload.name.as_deref(), Some("ForgerNotAuthorized"));
        assert_eq!(
            payload.message,
            "Not authorized: internal endpoint is only available for whitelisted forger"
        );
        // The whitelist check ran; the status endpoint itself never did
        assert_eq!(
            coordinator.calls_after_setup(),
            vec!["is_app_ready", "is_forger_authorized"]
        );
    }

    #[tokio::test]
    async fn test_internal_traffic_from_whitelisted_forger_is_forwarded() {
        let (coordinator, driver) = harness(
            ScriptedCoordinator::default().whitelisting("10.0.0.2".parse().unwrap()),
            "10.0.0.2",
        );

        let reply = driver
            .emit("p2p.internal.getUsernames", valid_payload())
            .await
            .await
            .unwrap();

        assert!(!reply.is_err());
        // Internal traffic skips peer acceptance entirely
        assert_eq!(
            coordinator.calls_after_setup(),
            vec!["is_app_ready", "is_forger_authorized", "relay"]
        );
    }

    #[tokio::test]
    async fn test_unadvertised_event_gets_no_reply() {
        let (coordinator, driver) = harness(ScriptedCoordinator::default(), "203.0.113.5");

        let silent = driver
            .emit("p2p.peer.notAdvertised", valid_payload())
            .await;

        // An advertised event emitted afterwards still resolves, proving
        // the silent one was skipped rather than queued
        let reply = driver
            .emit("p2p.peer.getStatus", valid_payload())
            .await
            .await
            .unwrap();
        assert!(!reply.is_err());

        assert!(silent.await.is_err());
        assert_eq!(coordinator.relayed.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_worker_keeps_serving_after_rejections() {
        let (_, driver) = harness(ScriptedCoordinator::default(), "203.0.113.5");

        for _ in 0..3 {
            let reply = driver
                .emit("p2p.peer.getStatus", serde_json::json!({}))
                .await
                .await
                .unwrap();
            assert!(reply.is_err());
        }

        let reply = timeout(
            Duration::from_secs(1),
            driver.emit("p2p.peer.getStatus", valid_payload()).await,
        )
        .await
        .unwrap()
        .unwrap();
        assert!(!reply.is_err());
    }
}
