//! Transfer an archive to a remote host and unpack it there.

use std::path::{Path, PathBuf};

use crate::confirm::Confirmer;
use crate::error::PushError;
use crate::exec::{CommandRunner, Invocation, shell_quote};
use crate::tools::Tools;
use crate::ui;

/// Where archives are staged on the remote host.
pub const REMOTE_TEMP_DIR: &str = "/tmp";

/// One archive going to one place on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployDescriptor {
    pub archive: PathBuf,
    pub remote_user: String,
    pub remote_host: String,
    pub remote_path: String,
}

impl DeployDescriptor {
    pub fn new(
        archive: impl Into<PathBuf>,
        remote_user: impl Into<String>,
        remote_host: impl Into<String>,
        remote_path: impl Into<String>,
    ) -> Self {
        Self {
            archive: archive.into(),
            remote_user: remote_user.into(),
            remote_host: remote_host.into(),
            remote_path: remote_path.into(),
        }
    }

    /// Staging path on the remote host, keyed only by the archive's file name.
    pub fn remote_archive(&self) -> String {
        let name = self
            .archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{REMOTE_TEMP_DIR}/{name}")
    }
}

/// Runs the remote side of a deploy over ssh/scp.
pub struct DeployExecutor<'a> {
    tools: &'a Tools,
    runner: &'a dyn CommandRunner,
    connect_timeout: u32,
}

impl<'a> DeployExecutor<'a> {
    pub fn new(tools: &'a Tools, runner: &'a dyn CommandRunner, connect_timeout: u32) -> Self {
        Self {
            tools,
            runner,
            connect_timeout,
        }
    }

    /// Fail before any network traffic if the archive is not on disk.
    pub fn check_archive(archive: &Path) -> anyhow::Result<()> {
        if !archive.is_file() {
            return Err(PushError::MissingArchive {
                path: archive.to_path_buf(),
            }
            .into());
        }
        Ok(())
    }

    /// Transfer and unpack `descriptor.archive` on the remote host.
    ///
    /// 1. copy the archive to `/tmp/<name>` on the host
    /// 2. `mkdir -p` the destination as the remote user
    /// 3. untar into the destination as the remote user, overwriting existing
    ///    entries and without restoring the archived owners
    /// 4. remove the staged archive, whether or not steps 2-3 succeeded
    pub fn deploy(&self, descriptor: &DeployDescriptor) -> anyhow::Result<()> {
        Self::check_archive(&descriptor.archive)?;

        let host = &descriptor.remote_host;
        let staged = descriptor.remote_archive();

        self.runner.run_checked(
            &Invocation::new(self.tools.get("scp")?)
                .args(self.connect_options())
                .arg("-q")
                .arg(descriptor.archive.to_string_lossy())
                .arg(format!("{host}:{staged}")),
        )?;

        let unpacked = self.unpack(descriptor, &staged);
        let removed = self.remote(host, &format!("rm -f {}", shell_quote(&staged)));

        unpacked?;
        removed
    }

    fn unpack(&self, descriptor: &DeployDescriptor, staged: &str) -> anyhow::Result<()> {
        let user = shell_quote(&descriptor.remote_user);
        let path = shell_quote(&descriptor.remote_path);
        self.remote(
            &descriptor.remote_host,
            &format!("sudo -u {user} mkdir -p {path}"),
        )?;
        self.remote(
            &descriptor.remote_host,
            &format!(
                "sudo -u {user} tar zxf {} -C {path} -p --no-same-owner --overwrite-dir",
                shell_quote(staged)
            ),
        )
    }

    /// Remove `remote_path` on `host` as `remote_user`.
    ///
    /// Asks first unless `force` is set. Returns whether anything was removed.
    pub fn cleanup(
        &self,
        host: &str,
        remote_path: &str,
        remote_user: &str,
        force: bool,
        confirmer: &dyn Confirmer,
    ) -> anyhow::Result<bool> {
        if !force {
            let question = format!(
                "Are you sure you wish to remove {remote_path} on {host}? (You can skip this question by setting force_clean_remote.)"
            );
            if !confirmer.confirm(&question)? {
                tracing::info!(host, remote_path, "remote cleanup declined");
                return Ok(false);
            }
        }

        ui::progress(format!("Removing {remote_path} from {host}."));
        self.remote(
            host,
            &format!(
                "sudo -u {} rm -rf {}",
                shell_quote(remote_user),
                shell_quote(remote_path)
            ),
        )?;
        Ok(true)
    }

    fn remote(&self, host: &str, command: &str) -> anyhow::Result<()> {
        self.runner.run_checked(
            &Invocation::new(self.tools.get("ssh")?)
                .args(self.connect_options())
                .arg(host)
                .arg(command),
        )?;
        Ok(())
    }

    fn connect_options(&self) -> [String; 2] {
        ["-o".to_string(), format!("ConnectTimeout={}", self.connect_timeout)]
    }
}
