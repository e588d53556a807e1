//! Bodies of the built-in tasks.

use std::path::Path;
use std::slice;

use anyhow::Context as _;

use crate::deploy::{DeployDescriptor, DeployExecutor, gate};
use crate::error::PushError;
use crate::exec::Invocation;
use crate::hosts::{HostResolver, HostTable};
use crate::ui;

use super::runner::TaskRunner;
use super::{TaskKind, copy};

impl TaskRunner<'_> {
    pub(super) fn clean(&mut self) -> anyhow::Result<()> {
        let context = self.context;
        self.before(TaskKind::Clean, &[], None)?;
        remove_dir(context.layout().containment_dir())?;
        self.reset();
        self.after(TaskKind::Clean, &[], None)?;
        ui::success("Finished cleaning project.");
        Ok(())
    }

    pub(super) fn mostly_clean(&mut self) -> anyhow::Result<()> {
        let context = self.context;
        self.before(TaskKind::MostlyClean, &[], None)?;
        for dir in context.layout().intermediate_dirs() {
            remove_dir(dir)?;
        }
        self.after(TaskKind::MostlyClean, &[], None)?;
        ui::success("Finished mostly cleaning project.");
        Ok(())
    }

    pub(super) fn build(&mut self) -> anyhow::Result<()> {
        let context = self.context;
        let layout = context.layout();

        // the build directory itself is created by rsync
        create_dir(layout.release_dir())?;

        self.before(TaskKind::Build, &[], None)?;

        let tree = format!("{}/", layout.current_dir().display());
        copy::copy(context, self.runner, &tree, Some(layout.build_dir()))?;

        // gitignored directories are absent from the build tree
        for dir in &context.settings().copy_dirs {
            if layout.build_dir().join(dir).is_dir() {
                copy::copy(context, self.runner, dir, None)?;
            } else {
                tracing::debug!(dir = %dir, "configured copy directory not present, skipping");
            }
        }

        self.after(TaskKind::Build, &[], None)?;
        ui::success("Finished building project.");
        Ok(())
    }

    pub(super) fn test(&mut self) -> anyhow::Result<()> {
        let context = self.context;
        if context.settings().skip_tests {
            ui::notice("Not running tests because 'skip_tests' is set.");
            return Ok(());
        }

        create_dir(context.layout().test_dir())?;
        self.before(TaskKind::Test, &[], None)?;
        self.after(TaskKind::Test, &[], None)?;

        // only reported when tests actually ran
        ui::success("Finished testing project.");
        Ok(())
    }

    pub(super) fn archive(&mut self) -> anyhow::Result<()> {
        let context = self.context;
        let layout = context.layout();
        let tools = context.tools();

        create_dir(layout.archive_dir())?;
        self.before(TaskKind::Archive, &[], None)?;

        let release = layout.release_dir();
        if !release.is_dir() {
            return Err(PushError::MissingReleaseDir {
                path: release.to_path_buf(),
            }
            .into());
        }

        // drop empty directories, but a project may legitimately ship nothing
        self.runner.run_checked(
            &Invocation::new(tools.get("find")?)
                .arg(release.to_string_lossy())
                .args(["-type", "d", "-empty", "-delete"]),
        )?;
        create_dir(release)?;

        self.runner.run_checked(
            &Invocation::new(tools.get("tar")?)
                .arg("-czf")
                .arg(context.archive_path().to_string_lossy())
                .arg("-C")
                .arg(release.to_string_lossy())
                .args(["-p", "."]),
        )?;

        self.after(TaskKind::Archive, &[], None)?;
        ui::success("Finished creating archive.");
        Ok(())
    }

    pub(super) fn register(&mut self) -> anyhow::Result<()> {
        let context = self.context;
        let settings = context.settings();

        self.before(TaskKind::Register, &[], None)?;

        let file = context.current_dir().join(&settings.registration_file);
        if file.is_file() {
            match context.tools().optional(&settings.registry_tool) {
                Some(tool) => {
                    ui::progress(format!(
                        "Registering {} from {} with {}.",
                        settings.registration_file,
                        context.current_dir().display(),
                        settings.registry_tool
                    ));
                    self.runner.run_checked(
                        &Invocation::new(tool)
                            .args(["register", "-"])
                            .stdin_file(&file),
                    )?;
                }
                None => ui::warn(format!(
                    "Not registering {} because {} could not be found.",
                    settings.registration_file, settings.registry_tool
                )),
            }
        }

        self.after(TaskKind::Register, &[], None)?;
        Ok(())
    }

    pub(super) fn clone_deploy(&mut self) -> anyhow::Result<()> {
        let context = self.context;
        let settings = context.settings();

        // checked before any hook runs, so a refusal leaves no trace
        gate::enforce(context.repo(), settings.no_tag, self.confirmer)?;

        let hosts = slice::from_ref(&settings.clone_host);
        self.before(TaskKind::Clone, hosts, None)?;
        self.deploy_to(&settings.clone_host, &settings.clone_destination())?;
        self.after(TaskKind::Clone, hosts, None)?;

        ui::success("Finished sending project to clone.");
        Ok(())
    }

    pub(super) fn live(&mut self, name: &str) -> anyhow::Result<()> {
        let context = self.context;

        let runner = self.runner;
        let table = self.host_table.get_or_insert_with(|| {
            let tool = context.tools().optional(&context.settings().registry_tool);
            HostTable::load(tool, runner)
        });
        let mut hosts = HostResolver::new(table, self.confirmer).resolve(name)?.hosts;
        hosts.sort();

        self.before(TaskKind::Live, &hosts, None)?;

        // one host at a time: deploys may stop to ask the operator
        for host in &hosts {
            self.deploy_to(host, &context.settings().host_path)?;
        }

        self.after(TaskKind::Live, &hosts, None)?;
        ui::success("Finished deploying project.");
        Ok(())
    }

    pub(super) fn cleanup(&mut self, host: &str, path: &str) -> anyhow::Result<()> {
        let context = self.context;
        let settings = context.settings();
        let hosts = [host.to_string()];

        self.before(TaskKind::Cleanup, &hosts, None)?;
        let executor = DeployExecutor::new(context.tools(), self.runner, settings.connect_timeout);
        executor.cleanup(
            host,
            path,
            &settings.host_user,
            settings.force_clean_remote,
            self.confirmer,
        )?;
        self.after(TaskKind::Cleanup, &hosts, None)?;
        Ok(())
    }

    /// Deploy this run's archive to one host, with `deploy` hooks around it.
    fn deploy_to(&mut self, host: &str, remote_path: &str) -> anyhow::Result<()> {
        let context = self.context;
        let settings = context.settings();
        let descriptor = DeployDescriptor::new(
            context.archive_path(),
            settings.host_user.as_str(),
            host,
            remote_path,
        );

        DeployExecutor::check_archive(&descriptor.archive)?;

        let hosts = slice::from_ref(&descriptor.remote_host);
        self.before(TaskKind::Deploy, hosts, Some(&descriptor))?;

        let executor = DeployExecutor::new(context.tools(), self.runner, settings.connect_timeout);
        for entry in &settings.purge {
            let stale = format!("{}/{}", remote_path.trim_end_matches('/'), entry);
            executor.cleanup(
                host,
                &stale,
                &settings.host_user,
                settings.force_clean_remote,
                self.confirmer,
            )?;
        }

        ui::progress(format!(
            "Deploying {} to {}:{} as {}.",
            descriptor.archive.display(),
            host,
            remote_path,
            settings.host_user
        ));
        executor.deploy(&descriptor)?;

        self.after(TaskKind::Deploy, hosts, Some(&descriptor))?;
        Ok(())
    }
}

fn create_dir(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

fn remove_dir(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
