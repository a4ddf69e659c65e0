use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use repackjar_archive::{ALL_CONTENTS, ArchiveTool, JarCliTool, NativeZipTool};
use repackjar_fs::Workspace;
use repackjar_platform::SystemExecutor;
use tracing::{debug, error, info, warn};

use crate::config::{Backend, RepackConfig};
use crate::dispatcher::{Dispatcher, discover};
use crate::error::{PipelineError, RepackError};

/// Where a run is, and where it stopped when it fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Staging,
    LocatingLibrary,
    RepackingDependencies,
    RepackingOuter,
    Finalizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Staging => "staging",
            Stage::LocatingLibrary => "locating library",
            Stage::RepackingDependencies => "repacking dependencies",
            Stage::RepackingOuter => "repacking outer archive",
            Stage::Finalizing => "finalizing",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepackSummary {
    pub final_name: String,
    pub output_path: PathBuf,
    pub dependencies: usize,
    pub original_size: u64,
    pub repacked_size: u64,
}

/// Build the archive backend selected by `config`.
pub fn build_tool(config: &RepackConfig) -> Result<Box<dyn ArchiveTool>, RepackError> {
    match config.backend {
        Backend::Native => Ok(Box::new(NativeZipTool::new())),
        Backend::JarCli => {
            let program = repackjar_platform::locate(&config.jar_tool)?;
            debug!("using jar tool at {}", program.display());
            let mut tool = JarCliTool::new(program, Arc::new(SystemExecutor::new()));
            if let Some(timeout) = config.tool_timeout() {
                tool = tool.with_timeout(timeout);
            }
            Ok(Box::new(tool))
        }
    }
}

/// Repackages one outer archive and its nested jars.
pub struct Pipeline<'a> {
    config: &'a RepackConfig,
    tool: &'a dyn ArchiveTool,
    final_name: String,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RepackConfig, tool: &'a dyn ArchiveTool) -> Self {
        Self {
            config,
            tool,
            final_name: config.final_name(),
        }
    }

    fn at<T, E>(&self, stage: Stage, result: Result<T, E>) -> Result<T, PipelineError>
    where
        E: Into<RepackError>,
    {
        result.map_err(|e| PipelineError {
            final_name: self.final_name.clone(),
            stage,
            source: e.into(),
        })
    }

    fn fail<T>(&self, stage: Stage, source: RepackError) -> Result<T, PipelineError> {
        self.at(stage, Err(source))
    }

    pub fn run(&self) -> Result<RepackSummary, PipelineError> {
        let name = self.final_name.as_str();
        let artifact = self.config.artifact_path();

        info!("{name}: {}", Stage::Validating);
        self.at(Stage::Validating, self.config.validate())?;
        if !artifact.is_file() {
            return self.fail(
                Stage::Validating,
                RepackError::MissingArtifact {
                    final_name: self.final_name.clone(),
                    path: artifact,
                },
            );
        }
        if !self.config.includes.is_empty() {
            debug!("include patterns {:?} are not applied", self.config.includes);
        }
        let original_size = self.at(Stage::Validating, file_size(&artifact))?;

        info!("{name}: {} with {} backend", Stage::Staging, self.tool.name());
        let workspace = self.at(Stage::Staging, Workspace::create(self.config.workspace_path()))?;
        let staged = workspace.path().join(name);
        self.at(Stage::Staging, repackjar_fs::copy_file(&artifact, &staged))?;
        self.at(Stage::Staging, self.tool.extract(name, workspace.path()))?;
        self.at(Stage::Staging, repackjar_fs::remove_file(&staged))?;

        info!("{name}: {}", Stage::LocatingLibrary);
        let relative = self.at(Stage::LocatingLibrary, self.config.lib_relative_path())?;
        let lib_dir = workspace.path().join(relative);
        if !lib_dir.is_dir() {
            return self.fail(
                Stage::LocatingLibrary,
                RepackError::MissingLibraryDirectory { path: lib_dir },
            );
        }

        info!("{name}: {}", Stage::RepackingDependencies);
        let archives = self.at(Stage::RepackingDependencies, discover(&lib_dir))?;
        let report = self.at(
            Stage::RepackingDependencies,
            Dispatcher::new(self.tool, self.config.jobs()).run(&lib_dir, &archives),
        )?;
        let dependencies = match report.into_verdict() {
            Ok(count) => count,
            Err(e) => {
                error!("{name}: {e}");
                return self.fail(Stage::RepackingDependencies, e);
            }
        };

        info!("{name}: {}", Stage::RepackingOuter);
        self.at(
            Stage::RepackingOuter,
            self.tool.create_uncompressed(name, ALL_CONTENTS, workspace.path()),
        )?;

        info!("{name}: {}", Stage::Finalizing);
        self.at(Stage::Finalizing, repackjar_fs::replace_file(&staged, &artifact))?;
        let repacked_size = self.at(Stage::Finalizing, file_size(&artifact))?;
        if let Err(e) = workspace.remove() {
            warn!("{name}: {e}");
        }

        info!(
            "{name}: repacked {dependencies} nested jars, {original_size} -> {repacked_size} bytes"
        );
        Ok(RepackSummary {
            final_name: self.final_name.clone(),
            output_path: artifact,
            dependencies,
            original_size,
            repacked_size,
        })
    }
}

fn file_size(path: &Path) -> Result<u64, RepackError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| RepackError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_read_as_phrases() {
        assert_eq!(Stage::RepackingOuter.to_string(), "repacking outer archive");
        assert_eq!(Stage::Validating.to_string(), "validating");
    }

    #[test]
    fn native_backend_needs_no_external_tool() {
        let config = RepackConfig {
            jar_tool: "definitely-not-a-real-jar-tool".to_string(),
            ..Default::default()
        };
        assert_eq!(build_tool(&config).unwrap().name(), "native");
    }

    #[test]
    fn jar_cli_backend_reports_missing_tool() {
        let config = RepackConfig {
            backend: Backend::JarCli,
            jar_tool: "definitely-not-a-real-jar-tool".to_string(),
            ..Default::default()
        };
        let err = build_tool(&config).err().unwrap();
        assert!(err.is_subprocess_failure(), "{err}");
    }

    #[test]
    fn invalid_config_fails_before_touching_disk() {
        let out = tempfile::tempdir().unwrap();
        let config = RepackConfig {
            output_dir: out.path().to_path_buf(),
            ..Default::default()
        };
        let tool = NativeZipTool::new();
        let err = Pipeline::new(&config, &tool).run().unwrap_err();
        assert_eq!(err.stage, Stage::Validating);
        assert!(matches!(err.source, RepackError::InvalidConfig(_)));
        assert!(!config.workspace_path().exists());
    }
}
