//! Scenario: secrets never live in config
//!
//! # Invariants under test
//! - A token-looking literal anywhere in the merged tree aborts the load and
//!   the error does not echo the value.
//! - The score-feed token is read from the env var the config names.
//! - A missing token is `None` when optional and an error naming the variable
//!   when required.
//! - `Debug` output redacts the token.

use stk_config::{load_layered_yaml_from_strings, resolve_score_feed_token};

#[test]
fn literal_secret_is_rejected_without_echo() {
    let yaml = r#"
feeds:
  scores:
    token_env: "ghp_abcdefghijklmnop1234"
"#;
    let err = load_layered_yaml_from_strings(&[yaml]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("CONFIG_SECRET_DETECTED"), "{msg}");
    assert!(msg.contains("/feeds/scores/token_env"), "{msg}");
    assert!(!msg.contains("ghp_abcdefghijklmnop1234"), "{msg}");
}

#[test]
fn secret_in_overlay_is_rejected() {
    let base = "cluster:\n  name: testnet\n";
    let overlay = "cluster:\n  url: \"sk_live_0000000000000000\"\n";
    assert!(load_layered_yaml_from_strings(&[base, overlay]).is_err());
}

#[test]
fn token_resolves_from_named_env_var() {
    let var = "STK_TEST_SCORE_TOKEN_RESOLVES";
    std::env::set_var(var, "value-from-env");
    let yaml = format!("feeds:\n  scores:\n    token_env: \"{var}\"\n");
    let loaded = load_layered_yaml_from_strings(&[yaml.as_str()]).unwrap();

    let token = resolve_score_feed_token(&loaded.config_json, true)
        .unwrap()
        .unwrap();
    assert_eq!(token.env_var, var);
    assert_eq!(token.expose(), "value-from-env");

    let dbg = format!("{token:?}");
    assert!(!dbg.contains("value-from-env"), "{dbg}");
    assert!(dbg.contains("<REDACTED>"));
    std::env::remove_var(var);
}

#[test]
fn missing_token_is_optional_or_named_error() {
    let var = "STK_TEST_SCORE_TOKEN_MISSING";
    std::env::remove_var(var);
    let yaml = format!("feeds:\n  scores:\n    token_env: \"{var}\"\n");
    let loaded = load_layered_yaml_from_strings(&[yaml.as_str()]).unwrap();

    assert!(resolve_score_feed_token(&loaded.config_json, false)
        .unwrap()
        .is_none());

    let err = resolve_score_feed_token(&loaded.config_json, true).unwrap_err();
    assert!(err.to_string().contains(var));
}
