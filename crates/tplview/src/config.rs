//! Preview configuration and command-line arguments.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tplview_render::{RenderPaths, RetryPolicy, DEFAULT_OUTPUT};

/// Settings for one preview session.
///
/// Unset template or content paths are allowed; they make the preview "not
/// ready" rather than invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    pub template: Option<PathBuf>,
    pub content: Option<PathBuf>,
    pub output: PathBuf,
    pub watch: bool,
    /// Pause before retrying a locked input file.
    pub retry_delay: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            template: None,
            content: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            watch: false,
            retry_delay: RetryPolicy::default().delay,
        }
    }
}

impl PreviewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    pub fn with_content(mut self, path: impl Into<PathBuf>) -> Self {
        self.content = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Makes every relative path absolute against `base`.
    ///
    /// Paths are joined, not canonicalized, so files that do not exist yet
    /// are fine.
    pub fn resolve_against(mut self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_absolute() || path.as_os_str().is_empty() {
                path
            } else {
                base.join(path)
            }
        };
        self.template = self.template.map(resolve);
        self.content = self.content.map(resolve);
        self.output = resolve(self.output);
        self
    }

    /// Makes every relative path absolute against the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be read.
    pub fn resolve_from_current_dir(self) -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(self.resolve_against(&cwd))
    }

    pub fn render_paths(&self) -> RenderPaths {
        RenderPaths {
            template: self.template.clone(),
            content: self.content.clone(),
            output: self.output.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            delay: self.retry_delay,
            ..RetryPolicy::default()
        }
    }
}

/// Command-line arguments of the `tplview` binary.
#[derive(Debug, Parser)]
#[command(name = "tplview")]
#[command(version)]
#[command(about = "Render a template against JSON or XML content")]
#[command(long_about = "Render a template against JSON or XML content.\n\n\
    The content document is available to the template as `content`.\n\
    With --watch, the output is rendered again whenever the template or\n\
    the content file is saved.")]
pub struct Cli {
    /// Path to the template source file
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Path to the XML or JSON content file
    #[arg(long, value_name = "PATH")]
    pub content: Option<PathBuf>,

    /// Path to the output file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Re-render whenever the template or content file changes
    #[arg(long)]
    pub watch: bool,
}

impl Cli {
    /// Builds the preview configuration, resolving paths against `cwd`.
    pub fn into_config(self, cwd: &Path) -> PreviewConfig {
        PreviewConfig {
            template: self.template,
            content: self.content,
            output: self.output,
            watch: self.watch,
            ..PreviewConfig::default()
        }
        .resolve_against(cwd)
    }
}
