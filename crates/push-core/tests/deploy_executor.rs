//! Remote unpack protocol and remote cleanup.

mod support;

use std::path::PathBuf;

use push_core::deploy::{DeployDescriptor, DeployExecutor};
use push_core::error::PushError;
use tempfile::TempDir;

use support::{RecordingRunner, ScriptedConfirmer, fake_tools};

fn archive_in(temp: &TempDir) -> PathBuf {
    let archive = temp.path().join("myproj-version-HEAD.tar.gz");
    std::fs::write(&archive, b"archive").unwrap();
    archive
}

#[test]
fn deploy_stages_unpacks_and_removes_archive() {
    let temp = TempDir::new().unwrap();
    let archive = archive_in(&temp);
    let tools = fake_tools();
    let runner = RecordingRunner::new();

    let descriptor = DeployDescriptor::new(&archive, "u1", "h1", "/srv/data");
    DeployExecutor::new(&tools, &runner, 10)
        .deploy(&descriptor)
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            format!(
                "scp -o ConnectTimeout=10 -q {} h1:/tmp/myproj-version-HEAD.tar.gz",
                archive.display()
            ),
            "ssh -o ConnectTimeout=10 h1 sudo -u u1 mkdir -p /srv/data".to_string(),
            "ssh -o ConnectTimeout=10 h1 sudo -u u1 tar zxf /tmp/myproj-version-HEAD.tar.gz \
             -C /srv/data -p --no-same-owner --overwrite-dir"
                .to_string(),
            "ssh -o ConnectTimeout=10 h1 rm -f /tmp/myproj-version-HEAD.tar.gz".to_string(),
        ]
    );
}

#[test]
fn missing_archive_fails_before_contacting_host() {
    let temp = TempDir::new().unwrap();
    let tools = fake_tools();
    let runner = RecordingRunner::new();

    let descriptor =
        DeployDescriptor::new(temp.path().join("absent.tar.gz"), "u1", "h1", "/srv/data");
    let err = DeployExecutor::new(&tools, &runner, 10)
        .deploy(&descriptor)
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PushError>(),
        Some(PushError::MissingArchive { .. })
    ));
    assert!(runner.commands().is_empty());
}

#[test]
fn staged_archive_is_removed_even_when_unpack_fails() {
    let temp = TempDir::new().unwrap();
    let archive = archive_in(&temp);
    let tools = fake_tools();
    let runner = RecordingRunner::new();
    runner.fail_when("tar zxf");

    let descriptor = DeployDescriptor::new(&archive, "u1", "h1", "/srv/data");
    let err = DeployExecutor::new(&tools, &runner, 10)
        .deploy(&descriptor)
        .unwrap_err();

    assert!(err.to_string().contains("tar zxf"));
    let commands = runner.commands();
    assert_eq!(commands.len(), 4);
    assert!(commands[3].ends_with("rm -f /tmp/myproj-version-HEAD.tar.gz"));
}

#[test]
fn failed_transfer_stops_deploy() {
    let temp = TempDir::new().unwrap();
    let archive = archive_in(&temp);
    let tools = fake_tools();
    let runner = RecordingRunner::new();
    runner.fail_when("scp");

    let descriptor = DeployDescriptor::new(&archive, "u1", "h1", "/srv/data");
    assert!(
        DeployExecutor::new(&tools, &runner, 10)
            .deploy(&descriptor)
            .is_err()
    );
    assert_eq!(runner.programs(), vec!["scp"]);
}

#[test]
fn remote_paths_with_spaces_are_quoted() {
    let temp = TempDir::new().unwrap();
    let archive = archive_in(&temp);
    let tools = fake_tools();
    let runner = RecordingRunner::new();

    let descriptor = DeployDescriptor::new(&archive, "u1", "h1", "/srv/my data");
    DeployExecutor::new(&tools, &runner, 5)
        .deploy(&descriptor)
        .unwrap();

    assert_eq!(
        runner.commands()[1],
        "ssh -o ConnectTimeout=5 h1 sudo -u u1 mkdir -p '/srv/my data'"
    );
}

#[test]
fn cleanup_asks_before_removing() {
    let tools = fake_tools();
    let runner = RecordingRunner::new();
    let confirmer = ScriptedConfirmer::answering([true]);

    let removed = DeployExecutor::new(&tools, &runner, 10)
        .cleanup("h1", "/srv/data/old", "u1", false, &confirmer)
        .unwrap();

    assert!(removed);
    assert_eq!(confirmer.questions().len(), 1);
    assert!(confirmer.questions()[0].contains("/srv/data/old on h1"));
    assert_eq!(
        runner.commands(),
        vec!["ssh -o ConnectTimeout=10 h1 sudo -u u1 rm -rf /srv/data/old"]
    );
}

#[test]
fn declined_cleanup_leaves_remote_untouched() {
    let tools = fake_tools();
    let runner = RecordingRunner::new();
    let confirmer = ScriptedConfirmer::answering([false]);

    let removed = DeployExecutor::new(&tools, &runner, 10)
        .cleanup("h1", "/srv/data/old", "u1", false, &confirmer)
        .unwrap();

    assert!(!removed);
    assert!(runner.commands().is_empty());
}

#[test]
fn forced_cleanup_does_not_ask() {
    let tools = fake_tools();
    let runner = RecordingRunner::new();
    let confirmer = ScriptedConfirmer::silent();

    let removed = DeployExecutor::new(&tools, &runner, 10)
        .cleanup("h1", "/srv/data/old", "u1", true, &confirmer)
        .unwrap();

    assert!(removed);
    assert_eq!(runner.commands().len(), 1);
}
