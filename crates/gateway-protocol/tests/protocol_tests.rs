//! Protocol layer tests — identifier parsing, wire formats, URL paths.

#[cfg(test)]
mod tests {
    use gateway_protocol::*;
    use serde_json::json;

    fn lease_id() -> LeaseId {
        LeaseId {
            owner: "akash1qqzwc5d7hynl67nsmn9jukvwqp3vzdl6j2t7lk".into(),
            dseq: 140,
            gseq: 1,
            oseq: 3,
            provider: "akash1c5kg2w6vnqjcqk9hkm3cjgodm2v6z04fykqvlm".into(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // LeaseId
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn lease_id_from_path() {
        let id = LeaseId::from_path(&[
            "akash1qqzwc5d7hynl67nsmn9jukvwqp3vzdl6j2t7lk",
            "140",
            "1",
            "3",
            "akash1c5kg2w6vnqjcqk9hkm3cjgodm2v6z04fykqvlm",
        ])
        .unwrap();
        assert_eq!(id, lease_id());
    }

    #[test]
    fn lease_id_segment_count() {
        let err = LeaseId::from_path(&["owner", "1", "1"]).unwrap_err();
        assert_eq!(
            err,
            ParseIdError::SegmentCount {
                got: 3,
                expected: 5
            }
        );
    }

    #[test]
    fn lease_id_empty_owner() {
        let err = LeaseId::from_path(&["", "140", "1", "3", "prov"]).unwrap_err();
        assert_eq!(err, ParseIdError::EmptyField("owner"));
        assert_eq!(err.to_string(), "empty owner");
    }

    #[test]
    fn lease_id_empty_provider() {
        let err = LeaseId::from_path(&["owner", "140", "1", "3", ""]).unwrap_err();
        assert_eq!(err, ParseIdError::EmptyField("provider"));
    }

    #[test]
    fn lease_id_invalid_dseq_names_field() {
        let err = LeaseId::from_path(&["owner", "abc", "1", "3", "prov"]).unwrap_err();
        assert!(matches!(
            err,
            ParseIdError::InvalidNumber { field: "dseq", .. }
        ));
        assert!(err.to_string().contains("dseq"));
    }

    #[test]
    fn lease_id_invalid_gseq_names_field() {
        let err = LeaseId::from_path(&["owner", "140", "-1", "3", "prov"]).unwrap_err();
        assert!(matches!(
            err,
            ParseIdError::InvalidNumber { field: "gseq", .. }
        ));
    }

    #[test]
    fn lease_id_display() {
        let s = lease_id().to_string();
        assert_eq!(
            s,
            "akash1qqzwc5d7hynl67nsmn9jukvwqp3vzdl6j2t7lk/140/1/3/akash1c5kg2w6vnqjcqk9hkm3cjgodm2v6z04fykqvlm"
        );
    }

    #[test]
    fn lease_id_deployment_projection() {
        let d = lease_id().deployment();
        assert_eq!(d.owner, lease_id().owner);
        assert_eq!(d.dseq, 140);
    }

    // ─────────────────────────────────────────────────────────────────────
    // DeploymentId
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn deployment_id_from_path() {
        let id = DeploymentId::from_path(&["owner", "42"]).unwrap();
        assert_eq!(id.owner, "owner");
        assert_eq!(id.dseq, 42);
    }

    #[test]
    fn deployment_id_bad_dseq() {
        let err = DeploymentId::from_path(&["owner", "forty-two"]).unwrap_err();
        assert!(matches!(
            err,
            ParseIdError::InvalidNumber { field: "dseq", .. }
        ));
    }

    #[test]
    fn deployment_id_segment_count() {
        let err = DeploymentId::from_path(&["owner"]).unwrap_err();
        assert_eq!(
            err,
            ParseIdError::SegmentCount {
                got: 1,
                expected: 2
            }
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // Log line wire format
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn log_line_wire_format() {
        let line = ServiceLogLine {
            name: "web".into(),
            message: "listening on :8080".into(),
        };
        let wire = serde_json::to_string(&line).unwrap();
        assert_eq!(wire, r#"{"name":"web","message":"listening on :8080"}"#);
    }

    #[test]
    fn log_line_roundtrip() {
        let wire = r#"{"name":"db","message":"ready to accept connections"}"#;
        let line: ServiceLogLine = serde_json::from_str(wire).unwrap();
        assert_eq!(line.name, "db");
        assert_eq!(line.message, "ready to accept connections");
    }

    #[test]
    fn close_codes_are_private_use_and_distinct() {
        assert!(close_code::LOGS_FETCH_FAILED >= 4000);
        assert!(close_code::NO_RUNNING_SERVICE >= 4000);
        assert_ne!(close_code::LOGS_FETCH_FAILED, close_code::NO_RUNNING_SERVICE);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Status bodies
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn lease_status_wire_format() {
        let status = LeaseStatus {
            services: vec![ServiceStatus {
                name: "web".into(),
                available: 1,
                total: 2,
                uris: vec!["web.example.com".into()],
            }],
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["services"][0]["name"], "web");
        assert_eq!(json["services"][0]["available"], 1);
        assert_eq!(json["services"][0]["uris"][0], "web.example.com");
    }

    #[test]
    fn service_status_omits_empty_uris() {
        let status = ServiceStatus {
            name: "worker".into(),
            available: 1,
            total: 1,
            uris: Vec::new(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("uris").is_none());
    }

    #[test]
    fn provider_status_camel_case() {
        let status = ProviderStatus {
            address: "akash1abc".into(),
            active_leases: 7,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["activeLeases"], 7);
        assert!(json.get("active_leases").is_none());
    }

    #[test]
    fn submit_manifest_roundtrip() {
        let req = SubmitManifestRequest {
            deployment: DeploymentId {
                owner: "owner".into(),
                dseq: 9,
            },
            manifest: json!({"services": [{"name": "web", "image": "nginx"}]}),
        };
        let wire = serde_json::to_string(&req).unwrap();
        let parsed: SubmitManifestRequest = serde_json::from_str(&wire).unwrap();
        assert_eq!(parsed, req);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Paths
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn path_builders() {
        let id = lease_id();
        assert_eq!(paths::status_path(), "status");
        assert_eq!(
            paths::lease_status_path(&id),
            format!("lease/{id}/status")
        );
        assert_eq!(
            paths::service_status_path(&id, "web"),
            format!("lease/{id}/service/web/status")
        );
        assert_eq!(
            paths::service_logs_path(&id, "web"),
            format!("lease/{id}/service/web/logs")
        );
        assert_eq!(
            paths::submit_manifest_path(&id.deployment()),
            format!("deployment/{}/{}/manifest", id.owner, id.dseq)
        );
    }
}
