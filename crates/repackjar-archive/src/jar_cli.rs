use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use repackjar_platform::{Command, ProcessExecutor};

use crate::Result;
use crate::contents;
use crate::tool::ArchiveTool;

/// Backend that drives the JDK `jar` executable.
///
/// `jar -cf0M` stores entries without compression and without generating a
/// manifest, so the manifest already present in the tree is kept as-is.
pub struct JarCliTool {
    program: PathBuf,
    executor: Arc<dyn ProcessExecutor>,
    timeout: Option<Duration>,
}

impl JarCliTool {
    pub fn new(program: impl Into<PathBuf>, executor: Arc<dyn ProcessExecutor>) -> Self {
        Self {
            program: program.into(),
            executor,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn command(&self, dir: &Path) -> Command {
        Command::new(&self.program)
            .current_dir(dir)
            .timeout(self.timeout)
    }
}

impl ArchiveTool for JarCliTool {
    fn extract(&self, archive_name: &str, into: &Path) -> Result<()> {
        let invocation = self.command(into).arg("-xf").arg(archive_name).build();
        self.executor.run(&invocation)?;
        Ok(())
    }

    fn create_uncompressed(
        &self,
        archive_name: &str,
        contents_glob: &str,
        from: &Path,
    ) -> Result<()> {
        // Expanded here instead of by a shell.
        let entries = contents::select(from, contents_glob, archive_name)?;
        let invocation = self
            .command(from)
            .arg("-cf0M")
            .arg(archive_name)
            .args(&entries)
            .build();
        self.executor.run(&invocation)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "jar-cli"
    }
}
