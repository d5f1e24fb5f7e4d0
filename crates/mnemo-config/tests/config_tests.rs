// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use mnemo_config::diagnostic::ConfigError;
use mnemo_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "saludo"
log_level = "debug"
system_prompt = "You are a cheerful cat girl."

[provider]
api_key = "sk-test"
base_url = "http://localhost:11434/v1"
chat_model = "qwen2.5"
embedding_model = "nomic-embed-text"
max_tokens = 512

[storage]
database_path = "/tmp/mnemo-test.db"
wal_mode = false

[retrieval]
similarity_threshold = 0.35
facts_top_k = 5
memories_top_k = 2
retrieval_timeout_secs = 3
model_timeout_secs = 30

[gateway]
host = "0.0.0.0"
port = 9000
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "saludo");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(
        config.agent.system_prompt.as_deref(),
        Some("You are a cheerful cat girl.")
    );
    assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.provider.chat_model, "qwen2.5");
    assert_eq!(config.provider.max_tokens, 512);
    assert_eq!(config.storage.database_path, "/tmp/mnemo-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.retrieval.similarity_threshold, 0.35);
    assert_eq!(config.retrieval.facts_top_k, 5);
    assert_eq!(config.retrieval.memories_top_k, 2);
    assert_eq!(config.gateway.port, 9000);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = load_config_from_str("[retrieval]\nfacts_top_k = 7\n").unwrap();
    assert_eq!(config.retrieval.facts_top_k, 7);
    assert_eq!(config.retrieval.memories_top_k, 3);
    assert_eq!(config.retrieval.similarity_threshold, 0.5);
    assert_eq!(config.provider.base_url, "https://api.openai.com/v1");
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = "[retrieval]\nfacts_topk = 2\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "facts_topk");
            assert_eq!(suggestion.as_deref(), Some("facts_top_k"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port")))
    );
}

#[test]
fn validation_runs_after_parse() {
    let errors = load_and_validate_str("[retrieval]\nmemories_top_k = 0\n").unwrap_err();
    assert!(
        errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("memories_top_k"))
        )
    );
}

#[test]
fn loads_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mnemo.toml");
    std::fs::write(&path, "[agent]\nname = \"from-file\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config should validate");
    assert_eq!(config.agent.name, "from-file");
}
