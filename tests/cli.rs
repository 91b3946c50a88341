use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn rollmacro(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rollmacro").unwrap();
    cmd.env("ROLLMACRO_HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_roll_expands_variables() {
    let home = TempDir::new().unwrap();

    rollmacro(&home)
        .args(["set-vars", "str=3\natk=1d20+{str}"])
        .assert()
        .success();

    rollmacro(&home)
        .args(["roll", "{atk}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1d20+3"));
}

#[test]
fn test_change_command_updates_variables() {
    let home = TempDir::new().unwrap();
    rollmacro(&home)
        .args(["set-vars", "hp=10\nmp=5"])
        .assert()
        .success();

    rollmacro(&home)
        .args(["roll", ":hp+3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hp: 10 -> 13"));

    rollmacro(&home)
        .args(["vars", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hp=13\nmp=5"));
}

#[test]
fn test_change_without_target_leaves_variables_alone() {
    let home = TempDir::new().unwrap();
    rollmacro(&home).args(["set-vars", "hp=10"]).assert().success();

    rollmacro(&home)
        .args(["roll", ":"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No variable named in"));

    rollmacro(&home)
        .args(["vars", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hp=10"));
}

#[test]
fn test_change_expands_tokens_in_operand() {
    let home = TempDir::new().unwrap();
    rollmacro(&home)
        .args(["set-vars", "hp=10\ndmg=4"])
        .assert()
        .success();

    rollmacro(&home).args(["change", ":hp-{dmg}"]).assert().success();

    rollmacro(&home)
        .args(["vars", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hp=6\ndmg=4"));
}

#[test]
fn test_roll_accepts_chat_and_inline_forms() {
    let home = TempDir::new().unwrap();
    rollmacro(&home).args(["set-vars", "str=2"]).assert().success();

    rollmacro(&home)
        .args(["roll", "/bcd", "2d6+{str}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2d6+2"));

    rollmacro(&home)
        .args(["roll", "Hit [[/bcd 1d20]] for [[/bcd 1d8+{str}]]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1d20").and(predicate::str::contains("1d8+2")));
}

#[test]
fn test_entities_are_separate() {
    let home = TempDir::new().unwrap();
    rollmacro(&home)
        .args(["--entity", "aria", "set-vars", "hp=7"])
        .assert()
        .success();

    rollmacro(&home)
        .args(["vars", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hp=7").not());

    rollmacro(&home)
        .args(["vars", "--raw", "--entity", "aria"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hp=7"));
}

#[test]
fn test_import_from_stdin_then_tree() {
    let home = TempDir::new().unwrap();

    rollmacro(&home)
        .args(["import", "--tab", "Combat", "--splitter", ":", "--split"])
        .write_stdin("// str=2\n■Attacks=\nSword:1d20+{str}\nAxe:1d20\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 macro(s)"));

    rollmacro(&home)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("Combat"))
        .stdout(predicate::str::contains("Sword"));

    rollmacro(&home)
        .args(["vars", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("str=2"));
}

#[test]
fn test_tables_roundtrip_through_files() {
    let home = TempDir::new().unwrap();
    let body = home.path().join("loot.txt");
    fs::write(&body, "1D6\n1:Gold\n2:Sword\n").unwrap();

    rollmacro(&home)
        .args(["table", "save", "loot", "--file"])
        .arg(&body)
        .assert()
        .success();

    rollmacro(&home)
        .args(["roll", "LOOT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1:Gold"));

    rollmacro(&home)
        .args(["table", "save", "bad cmd", "--file"])
        .arg(&body)
        .assert()
        .failure()
        .stderr(predicate::str::contains("alphanumeric"));
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    rollmacro(&home)
        .args(["config", "game-system", "Cthulhu7th"])
        .assert()
        .success()
        .stdout(predicate::str::contains("game-system set to Cthulhu7th"));

    rollmacro(&home)
        .args(["config", "game-system"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cthulhu7th"));
}

#[test]
fn test_sync_push_writes_sheet() {
    let home = TempDir::new().unwrap();
    let sheet = home.path().join("sheet.json");
    fs::write(&sheet, r#"{"hitPoints": 10}"#).unwrap();

    rollmacro(&home)
        .args(["config", "macro-splitter", ":"])
        .assert()
        .success();
    let config_path = home.path().join("config.json");
    let mut config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    config["sync_rules"] = serde_json::Value::String("hp:hitPoints".to_string());
    fs::write(&config_path, config.to_string()).unwrap();

    rollmacro(&home).args(["set-vars", "hp=4"]).assert().success();
    rollmacro(&home)
        .args(["sync", "push", "hp", "--write", "--sheet"])
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("hitPoints"))
        .stdout(predicate::str::contains("= 4"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&sheet).unwrap()).unwrap();
    assert_eq!(written["hitPoints"], "4");
}

#[test]
fn test_unknown_macro_reference_fails() {
    let home = TempDir::new().unwrap();
    rollmacro(&home)
        .args(["roll", "--macro", "abcdef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
