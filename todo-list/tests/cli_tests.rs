use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn todo(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("todo").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("TODO_STORE_PATH")
        .env_remove("TODO_LOG_LEVEL");
    cmd
}

#[test]
fn add_list_toggle_delete_flow() {
    let temp = TempDir::new().unwrap();

    todo(&temp)
        .args(["add", "Buy milk"])
        .assert()
        .success()
        .stdout("Task added with ID 1\n");
    temp.child("tasks.json")
        .assert(predicate::str::contains("\"title\": \"Buy milk\""));

    todo(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout("  1 [ ] Buy milk (Low)\n");

    todo(&temp)
        .args(["toggle", "1"])
        .assert()
        .success()
        .stdout("Task 1 marked completed\n");

    todo(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] Buy milk"));

    todo(&temp)
        .args(["delete", "1", "--yes"])
        .assert()
        .success()
        .stdout("Task 1 deleted\n");

    todo(&temp).arg("list").assert().success().stdout("No tasks.\n");
}

#[test]
fn add_with_all_fields_is_listed() {
    let temp = TempDir::new().unwrap();

    todo(&temp)
        .args([
            "add",
            "File taxes",
            "--description",
            "forms in the drawer",
            "--priority",
            "high",
            "--due",
            "2026-10-31",
        ])
        .assert()
        .success();

    todo(&temp).arg("list").assert().success().stdout(
        "  1 [ ] File taxes (High, due 2026-10-31)\n        forms in the drawer\n",
    );
}

#[test]
fn empty_title_is_a_warning_and_saves_nothing() {
    let temp = TempDir::new().unwrap();

    todo(&temp)
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("warning: Please enter a task title."));

    temp.child("tasks.json").assert(predicate::path::missing());
}

#[test]
fn delete_asks_for_confirmation() {
    let temp = TempDir::new().unwrap();
    todo(&temp).args(["add", "Walk dog"]).assert().success();

    todo(&temp)
        .args(["delete", "1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Are you sure you want to delete task 'Walk dog'?",
        ))
        .stdout(predicate::str::contains("Deletion cancelled"));
    todo(&temp)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("Walk dog"));

    todo(&temp)
        .args(["delete", "1"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1 deleted"));
    todo(&temp).arg("list").assert().stdout("No tasks.\n");
}

#[test]
fn edit_keeps_omitted_fields() {
    let temp = TempDir::new().unwrap();
    todo(&temp)
        .args(["add", "Walk dog", "-d", "before 9"])
        .assert()
        .success();

    todo(&temp)
        .args(["edit", "1", "--title", "Walk the dog"])
        .assert()
        .success()
        .stdout("Task 1 updated\n");

    todo(&temp)
        .arg("list")
        .assert()
        .stdout("  1 [ ] Walk the dog (Low)\n        before 9\n");
}

#[test]
fn unknown_id_is_an_error() {
    let temp = TempDir::new().unwrap();

    todo(&temp)
        .args(["toggle", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task 42 not found"));
}

#[test]
fn corrupt_store_is_reported_and_kept() {
    let temp = TempDir::new().unwrap();
    temp.child("tasks.json").write_str("garbage").unwrap();

    todo(&temp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is corrupt"));

    temp.child("tasks.json").assert("garbage");
}

#[test]
fn store_location_comes_from_flag_config_and_env() {
    let temp = TempDir::new().unwrap();
    temp.child("todo.toml")
        .write_str("store_path = \"from-config.json\"\n")
        .unwrap();

    todo(&temp).args(["add", "Config task"]).assert().success();
    temp.child("from-config.json").assert(predicate::path::exists());

    todo(&temp)
        .env("TODO_STORE_PATH", "from-env.json")
        .args(["add", "Env task"])
        .assert()
        .success();
    temp.child("from-env.json").assert(predicate::path::exists());

    todo(&temp)
        .args(["--file", "data/from-flag.json", "add", "Flag task"])
        .assert()
        .success();
    temp.child("data/from-flag.json")
        .assert(predicate::str::contains("Flag task"));
}
