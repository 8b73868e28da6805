use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;

fn write_feeds(dir: &Path) {
    std::fs::write(
        dir.join("votes.json"),
        r#"[
            {"nodePubkey": "N1", "votePubkey": "V1", "commission": 10, "activatedStake": 100},
            {"nodePubkey": "N2", "votePubkey": "V2", "commission": 5, "activatedStake": 200},
            {"nodePubkey": "N3", "votePubkey": "V3", "commission": 100, "activatedStake": 300}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("infos.json"),
        r#"[{"identity": "N1", "name": "Alpha Validator"}, {"identity": "N3", "name": "Gamma"}]"#,
    )
    .unwrap();
    std::fs::write(dir.join("scores.json"), r#"[{"account": "N2", "total_score": 10}]"#).unwrap();
}

/// Scored validators come first; every vote record appears once.
#[test]
fn match_prints_merged_records_as_json_lines() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_feeds(dir.path());

    let out = Command::cargo_bin("stk")?
        .current_dir(dir.path())
        .args([
            "match", "--votes", "votes.json", "--infos", "infos.json", "--scores", "scores.json",
            "--batch-size", "1",
        ])
        .output()?;
    assert!(out.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(out.stdout)?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["vote"]["nodePubkey"], "N2");
    assert_eq!(lines[0]["score"]["total_score"], 10);
    assert_eq!(lines[1]["info"]["name"], "Alpha Validator");
    Ok(())
}

/// Commission cap and case-insensitive name query narrow the output.
#[test]
fn match_applies_commission_and_query_filter() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_feeds(dir.path());

    Command::cargo_bin("stk")?
        .current_dir(dir.path())
        .args([
            "match", "--votes", "votes.json", "--infos", "infos.json", "--scores", "scores.json",
            "--max-commission", "50", "--query", "alpha",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"votePubkey\":\"V1\""))
        .stdout(predicate::str::contains("V2").not())
        .stdout(predicate::str::contains("V3").not());
    Ok(())
}

/// Without a score file the token env var must be set.
#[test]
fn match_without_scores_requires_token() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_feeds(dir.path());
    std::fs::write(
        dir.path().join("stk.yaml"),
        "feeds:\n  scores:\n    token_env: STK_CLI_TEST_TOKEN_UNSET\n",
    )?;

    Command::cargo_bin("stk")?
        .current_dir(dir.path())
        .env_remove("STK_CLI_TEST_TOKEN_UNSET")
        .args(["match", "--votes", "votes.json", "--infos", "infos.json", "--config", "stk.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("STK_CLI_TEST_TOKEN_UNSET"));
    Ok(())
}

/// `stk config-hash` prints the hash line then canonical JSON.
#[test]
fn config_hash_prints_hash_and_canonical_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("base.yaml"), "matcher:\n  batch_size: 100\n")?;
    std::fs::write(dir.path().join("overlay.yaml"), "matcher:\n  batch_size: 25\n")?;

    Command::cargo_bin("stk")?
        .current_dir(dir.path())
        .args(["config-hash", "base.yaml", "overlay.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_match("^config_hash=[0-9a-f]{64}\n")?)
        .stdout(predicate::str::contains(r#"{"matcher":{"batch_size":25}}"#));
    Ok(())
}
