use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_LIB_PATH: &str = "/lib";
pub const DEFAULT_STAGING_DIR: &str = "repackjarTemp";
pub const DEFAULT_JAR_TOOL: &str = "jar";
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("artifact id must not be empty")]
    MissingArtifactId,
    #[error("library path '{0}' must be relative to the archive root")]
    UnsafeLibraryPath(String),
    #[error("staging directory name '{0}' must be a single path component")]
    UnsafeStagingDir(String),
    #[error("jobs must be at least 1")]
    ZeroJobs,
}

/// Which implementation extracts and rebuilds archives.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    Native,
    JarCli,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Backend::Native),
            "jar-cli" | "jar" => Ok(Backend::JarCli),
            other => Err(format!("unknown backend '{other}' (expected native or jar-cli)")),
        }
    }
}

/// Everything one repackaging run needs to know.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct RepackConfig {
    /// Directory holding the built archive. The workspace is created inside it.
    pub output_dir: PathBuf,
    pub artifact_id: String,
    pub jar_file_suffix: Option<String>,
    /// Location of the nested jars relative to the archive root.
    pub lib_relative_path: String,
    /// Accepted for compatibility, never applied.
    pub includes: Vec<String>,
    pub staging_dir_name: String,
    /// Worker count. `None` picks one from the available parallelism.
    pub jobs: Option<usize>,
    pub backend: Backend,
    pub jar_tool: String,
    /// Per-invocation limit for external tools. Zero disables it.
    pub tool_timeout_secs: u64,
}

impl Default for RepackConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("target"),
            artifact_id: String::new(),
            jar_file_suffix: None,
            lib_relative_path: DEFAULT_LIB_PATH.to_string(),
            includes: Vec::new(),
            staging_dir_name: DEFAULT_STAGING_DIR.to_string(),
            jobs: None,
            backend: Backend::Native,
            jar_tool: DEFAULT_JAR_TOOL.to_string(),
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

impl RepackConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `artifactId + suffix + ".jar"`.
    pub fn final_name(&self) -> String {
        let suffix = self.jar_file_suffix.as_deref().unwrap_or_default();
        format!("{}{suffix}.jar", self.artifact_id)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(self.final_name())
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.output_dir.join(&self.staging_dir_name)
    }

    /// The library path with leading separators stripped.
    ///
    /// Rejects anything that could resolve outside the extracted archive.
    pub fn lib_relative_path(&self) -> Result<PathBuf, ConfigError> {
        let trimmed = self.lib_relative_path.trim_start_matches(['/', '\\']);
        let normalized = trimmed.replace('\\', "/");
        let path = PathBuf::from(&normalized);

        let mut relative = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                _ => return Err(ConfigError::UnsafeLibraryPath(self.lib_relative_path.clone())),
            }
        }
        Ok(relative)
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(default_jobs)
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        (self.tool_timeout_secs > 0).then(|| Duration::from_secs(self.tool_timeout_secs))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.artifact_id.trim().is_empty() {
            return Err(ConfigError::MissingArtifactId);
        }
        self.lib_relative_path()?;

        let mut components = Path::new(&self.staging_dir_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(ConfigError::UnsafeStagingDir(self.staging_dir_name.clone())),
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::ZeroJobs);
        }
        Ok(())
    }
}

/// One worker per core, leaving a core for the rest of the build.
pub fn default_jobs() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cores.saturating_sub(1).max(1)
}
