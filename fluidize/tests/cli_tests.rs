// fluidize/tests/cli_tests.rs

use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Abstraction for managing a sandboxed fluidize store.
struct FluidizeTestEnv {
    tmp: TempDir,
}

impl FluidizeTestEnv {
    fn new() -> Result<Self> {
        Ok(Self {
            tmp: tempfile::tempdir()?,
        })
    }

    fn base(&self) -> PathBuf {
        self.tmp.path().to_path_buf()
    }

    fn fluidize(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fluidize"));
        cmd.env("FLUIDIZE_BASE_PATH", self.tmp.path());
        cmd
    }

    /// Seeds a minimal simulation template in the local library.
    fn seed_template(&self, id: &str) -> Result<()> {
        let dir = self.base().join("simulations").join(id);
        std::fs::create_dir_all(dir.join("source"))?;
        std::fs::write(
            dir.join("metadata.yaml"),
            "label: Seeded Template\ndescription: test fixture\n",
        )?;
        std::fs::write(dir.join("main.sh"), "#!/bin/bash\necho hello\n")?;
        Ok(())
    }
}

#[test]
fn test_project_create_writes_store_layout() -> Result<()> {
    let env = FluidizeTestEnv::new()?;

    env.fluidize()
        .args(["project", "create", "demo", "--label", "Demo Project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"));

    let project_dir = env.base().join("projects").join("demo");
    assert!(project_dir.join("metadata.yaml").exists());
    assert!(project_dir.join("graph.json").exists());
    assert!(project_dir.join("parameters.json").exists());

    // metadata.yaml nests the summary under `project:`
    let metadata: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(project_dir.join("metadata.yaml"))?)?;
    assert_eq!(
        metadata["project"]["label"].as_str(),
        Some("Demo Project")
    );

    env.fluidize()
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo Project"));
    Ok(())
}

#[test]
fn test_node_and_edge_lifecycle() -> Result<()> {
    let env = FluidizeTestEnv::new()?;

    env.fluidize()
        .args(["project", "create", "p1"])
        .assert()
        .success();

    env.fluidize()
        .args(["node", "add", "a", "--project", "p1", "--label", "Source"])
        .assert()
        .success();
    env.fluidize()
        .args(["node", "add", "b", "--project", "p1", "--label", "Sink"])
        .assert()
        .success();
    env.fluidize()
        .args([
            "edge", "add", "e1", "--project", "p1", "--source", "a", "--target", "b",
        ])
        .assert()
        .success();

    env.fluidize()
        .args(["graph", "--project", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Source").and(predicate::str::contains("e1")));

    // Node workspaces were materialized with defaults
    assert!(
        env.base()
            .join("projects/p1/a/properties.yaml")
            .exists()
    );

    // Deleting the middle node cascades the edge
    env.fluidize()
        .args(["node", "rm", "a", "--project", "p1"])
        .assert()
        .success();
    env.fluidize()
        .args(["graph", "--project", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("e1").not());
    Ok(())
}

#[test]
fn test_edge_to_missing_node_is_rejected() -> Result<()> {
    let env = FluidizeTestEnv::new()?;

    env.fluidize()
        .args(["project", "create", "p1"])
        .assert()
        .success();
    env.fluidize()
        .args(["node", "add", "a", "--project", "p1"])
        .assert()
        .success();

    env.fluidize()
        .args([
            "edge", "add", "e1", "--project", "p1", "--source", "a", "--target", "ghost",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-existent"));
    Ok(())
}

#[test]
fn test_run_on_empty_graph_fails_cleanly() -> Result<()> {
    let env = FluidizeTestEnv::new()?;

    env.fluidize()
        .args(["project", "create", "p1"])
        .assert()
        .success();

    env.fluidize()
        .args(["run", "--project", "p1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No nodes to run"));

    // The rejected run left no directory behind
    assert!(!env.base().join("projects/p1/runs/run_1").exists());
    Ok(())
}

#[test]
fn test_node_from_template_copies_workspace() -> Result<()> {
    let env = FluidizeTestEnv::new()?;
    env.seed_template("heat-2d")?;

    env.fluidize()
        .args(["project", "create", "p1"])
        .assert()
        .success();

    env.fluidize()
        .args([
            "node", "add", "n1", "--project", "p1", "--simulation", "heat-2d",
        ])
        .assert()
        .success();

    assert!(env.base().join("projects/p1/n1/main.sh").exists());
    assert!(env.base().join("projects/p1/n1/source").is_dir());
    Ok(())
}

#[test]
fn test_node_from_missing_template_fails() -> Result<()> {
    let env = FluidizeTestEnv::new()?;

    env.fluidize()
        .args(["project", "create", "p1"])
        .assert()
        .success();

    env.fluidize()
        .args(["node", "add", "n1", "--project", "p1", "--simulation", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template 'nope' not found"));
    Ok(())
}

#[test]
fn test_sims_lists_seeded_templates() -> Result<()> {
    let env = FluidizeTestEnv::new()?;
    env.seed_template("heat-2d")?;

    env.fluidize()
        .args(["sims"])
        .assert()
        .success()
        .stdout(predicate::str::contains("heat-2d").and(predicate::str::contains("Seeded Template")));
    Ok(())
}

#[test]
fn test_status_for_unknown_run_fails() -> Result<()> {
    let env = FluidizeTestEnv::new()?;

    env.fluidize()
        .args(["project", "create", "p1"])
        .assert()
        .success();

    env.fluidize()
        .args(["status", "9", "--project", "p1"])
        .assert()
        .failure();
    Ok(())
}
