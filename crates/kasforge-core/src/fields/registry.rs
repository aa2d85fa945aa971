//! Built-in configuration field declarations
//!
//! Declaration order here is the order fields appear in schemas and in the
//! generated environment text.

use super::{ConfigurationField, FieldKind, FieldValue};

/// Key of the network selector, compared across runs for resync warnings.
pub const NETWORK_FIELD: &str = "network";

fn field(
    key: &str,
    label: &str,
    group: &str,
    kind: FieldKind,
    default: FieldValue,
    visible_for: &[&str],
) -> ConfigurationField {
    ConfigurationField {
        key: key.to_string(),
        label: label.to_string(),
        group: group.to_string(),
        kind,
        default,
        required: false,
        visible_for: visible_for.iter().map(|s| s.to_string()).collect(),
        deprecated: false,
        frontend_only: false,
    }
}

fn required(mut f: ConfigurationField) -> ConfigurationField {
    f.required = true;
    f
}

pub fn builtin_fields() -> Vec<ConfigurationField> {
    let nodes = &["kaspa-node", "kaspa-node-archive"];
    let every_profile = &[
        "kaspa-node",
        "kaspa-node-archive",
        "kaspa-stratum",
        "kasia-indexer",
        "kasia-app",
        "k-social-app",
        "kaspa-explorer",
        "kaspa-dashboard",
    ];

    vec![
        required(field(
            NETWORK_FIELD,
            "Network",
            "Network",
            FieldKind::Enum {
                options: vec![
                    "mainnet".to_string(),
                    "testnet-10".to_string(),
                    "testnet-11".to_string(),
                ],
            },
            FieldValue::Text("mainnet".to_string()),
            nodes,
        )),
        field(
            "node_external_ip",
            "Advertised external IP",
            "Network",
            FieldKind::Text {
                pattern: Some(r"^$|^(\d{1,3}\.){3}\d{1,3}$".to_string()),
            },
            FieldValue::Text(String::new()),
            nodes,
        ),
        field(
            "node_rpc_port",
            "Node gRPC port",
            "Node",
            FieldKind::Number {
                min: Some(1024.0),
                max: Some(65535.0),
            },
            FieldValue::Number(16110.0),
            nodes,
        ),
        field(
            "node_utxo_index",
            "Maintain UTXO index",
            "Node",
            FieldKind::Bool,
            FieldValue::Bool(true),
            nodes,
        ),
        required(field(
            "stratum_mining_address",
            "Mining payout address",
            "Mining",
            FieldKind::Text {
                pattern: Some(r"^kaspa:[a-z0-9]{61,63}$".to_string()),
            },
            FieldValue::Text(String::new()),
            &["kaspa-stratum"],
        )),
        field(
            "stratum_port",
            "Stratum listen port",
            "Mining",
            FieldKind::Number {
                min: Some(1024.0),
                max: Some(65535.0),
            },
            FieldValue::Number(5555.0),
            &["kaspa-stratum"],
        ),
        field(
            "stratum_var_diff",
            "Variable difficulty",
            "Mining",
            FieldKind::Bool,
            FieldValue::Bool(true),
            &["kaspa-stratum"],
        ),
        field(
            "stratum_extranonce",
            "Extranonce subscription",
            "Mining",
            FieldKind::Bool,
            FieldValue::Bool(false),
            &["kaspa-stratum"],
        ),
        field(
            "kasia_public_port",
            "Kasia web port",
            "Apps",
            FieldKind::Number {
                min: Some(1024.0),
                max: Some(65535.0),
            },
            FieldValue::Number(3001.0),
            &["kasia-app"],
        ),
        field(
            "k_social_public_port",
            "K-Social web port",
            "Apps",
            FieldKind::Number {
                min: Some(1024.0),
                max: Some(65535.0),
            },
            FieldValue::Number(3002.0),
            &["k-social-app"],
        ),
        field(
            "explorer_public_port",
            "Explorer web port",
            "Apps",
            FieldKind::Number {
                min: Some(1024.0),
                max: Some(65535.0),
            },
            FieldValue::Number(4000.0),
            &["kaspa-explorer"],
        ),
        field(
            "dashboard_refresh_secs",
            "Dashboard refresh interval",
            "Monitoring",
            FieldKind::Number {
                min: Some(1.0),
                max: Some(3600.0),
            },
            FieldValue::Number(15.0),
            &["kaspa-dashboard"],
        ),
        field(
            "log_level",
            "Log level",
            "Advanced",
            FieldKind::Enum {
                options: vec![
                    "error".to_string(),
                    "warn".to_string(),
                    "info".to_string(),
                    "debug".to_string(),
                    "trace".to_string(),
                ],
            },
            FieldValue::Text("info".to_string()),
            every_profile,
        ),
        // Wizard-side toggle; never persisted or synthesized.
        {
            let mut f = field(
                "show_advanced",
                "Show advanced settings",
                "Advanced",
                FieldKind::Bool,
                FieldValue::Bool(false),
                every_profile,
            );
            f.frontend_only = true;
            f
        },
        // Retired when TLS termination moved out of the stack.
        {
            let mut f = field(
                "ssl_email",
                "Certificate contact email",
                "Advanced",
                FieldKind::Text { pattern: None },
                FieldValue::Text(String::new()),
                every_profile,
            );
            f.deprecated = true;
            f
        },
    ]
}
