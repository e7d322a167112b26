//! The render pipeline: read inputs, normalize content, evaluate, write.
//!
//! One call to [`RenderPipeline::render`] is one complete render cycle:
//!
//! 1. Readiness check ([`RenderPipeline::can_render`])
//! 2. Read the content file, retrying once after a delay if it is locked
//! 3. Read the template file with the same retry policy
//! 4. Pick the content format from the content file extension
//! 5. Normalize the content
//! 6. Parse and render the template
//! 7. Overwrite the output file and return the text
//!
//! Any failure ends the cycle with a diagnostic and an empty string. Nothing
//! is returned as an error and nothing panics, so the pipeline can be driven
//! straight from a file-change handler. Use [`RenderPipeline::try_render`]
//! when the failure itself is needed.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tplview_content::{normalize, ContentError, ContentFormat};

use crate::diagnostics::DiagnosticsSink;
use crate::engine::{MiniJinjaEngine, TemplateEngine};
use crate::error::RenderError;
use crate::fs::{FileSystem, RealFs};
use crate::renderer::ContentRenderer;

/// Default path of the rendered output.
pub const DEFAULT_OUTPUT: &str = "./preview.txt";

/// The three locations a render works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPaths {
    pub template: Option<PathBuf>,
    pub content: Option<PathBuf>,
    pub output: PathBuf,
}

impl Default for RenderPaths {
    fn default() -> Self {
        Self {
            template: None,
            content: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl RenderPaths {
    pub fn new(
        template: impl Into<PathBuf>,
        content: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template: Some(template.into()),
            content: Some(content.into()),
            output: output.into(),
        }
    }
}

/// How a locked or unreadable file is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Pause before each extra attempt.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            delay: Duration::from_secs(1),
        }
    }
}

/// Renders a template file against a content file into an output file.
pub struct RenderPipeline {
    paths: RenderPaths,
    engine: Arc<dyn TemplateEngine>,
    fs: Arc<dyn FileSystem>,
    log: Arc<dyn DiagnosticsSink>,
    retry: RetryPolicy,
}

impl RenderPipeline {
    /// Creates a pipeline on the real file system with the MiniJinja engine.
    pub fn new(paths: RenderPaths, log: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            paths,
            engine: Arc::new(MiniJinjaEngine::new()),
            fs: Arc::new(RealFs),
            log,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn paths(&self) -> &RenderPaths {
        &self.paths
    }

    pub fn log(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.log
    }

    /// Whether the template and content files exist and an output is set.
    ///
    /// Checked against the file system on every call.
    pub fn can_render(&self) -> bool {
        let exists = |path: &Option<PathBuf>| path.as_deref().is_some_and(|p| self.fs.exists(p));
        exists(&self.paths.template)
            && exists(&self.paths.content)
            && !self.paths.output.as_os_str().is_empty()
    }

    /// Runs one render cycle.
    ///
    /// Returns the rendered text, or an empty string if the render did not
    /// happen. Failures are reported to the diagnostics sink.
    pub fn render(&self) -> String {
        match self.try_render() {
            Ok(output) => output,
            Err(err) => {
                self.report(&err);
                String::new()
            }
        }
    }

    /// Runs one render cycle, returning the failure instead of logging it.
    ///
    /// # Errors
    ///
    /// Returns the first [`RenderError`] hit by any step.
    pub fn try_render(&self) -> Result<String, RenderError> {
        let (template_path, content_path) = match (&self.paths.template, &self.paths.content) {
            (Some(template), Some(content)) if self.can_render() => (template, content),
            _ => return Err(RenderError::NotReady),
        };

        let content_text = self.read_with_retry(content_path)?;
        let template_text = self.read_with_retry(template_path)?;

        let format = ContentFormat::from_path(content_path)?;
        let content = normalize(&content_text, format)?;

        let output = ContentRenderer::with_engine(Arc::clone(&self.engine))
            .set_normalized(content)
            .parse(&template_text)?
            .render()?;

        self.fs
            .write(&self.paths.output, &output)
            .map_err(|source| RenderError::Output {
                path: self.paths.output.clone(),
                source,
            })?;

        tracing::debug!(
            output = %self.paths.output.display(),
            bytes = output.len(),
            "render complete"
        );
        Ok(output)
    }

    /// Reads a file, retrying after [`RetryPolicy::delay`] on failure.
    ///
    /// Text that is not valid UTF-8 is a content error and is not retried.
    /// The sleep blocks the calling thread.
    fn read_with_retry(&self, path: &Path) -> Result<String, RenderError> {
        let mut attempt = 0;
        loop {
            match self.fs.read_to_string(path) {
                Ok(text) => return Ok(text),
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    return Err(ContentError::Encoding {
                        path: path.to_path_buf(),
                        message: err.to_string(),
                    }
                    .into())
                }
                Err(err) if attempt < self.retry.retries => {
                    attempt += 1;
                    tracing::debug!(
                        path = %path.display(),
                        error = %err,
                        attempt,
                        delay = ?self.retry.delay,
                        "read failed, retrying"
                    );
                    thread::sleep(self.retry.delay);
                }
                Err(source) => {
                    return Err(RenderError::Unreadable {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }
    }

    fn report(&self, err: &RenderError) {
        tracing::debug!(error = %err, kind = ?err.kind(), "render abandoned");
        match err {
            RenderError::NotReady => self.log.warning(&err.to_string()),
            RenderError::Unreadable { source, .. } => {
                self.log.warning_with_cause(&err.to_string(), source)
            }
            RenderError::Content(ContentError::UnsupportedFormat { .. }) => {
                self.log.error(&err.to_string())
            }
            RenderError::Content(cause) => {
                self.log.warning_with_cause("Unable to set parser content", cause)
            }
            RenderError::Output { source, .. } => {
                self.log.error_with_cause(&err.to_string(), source)
            }
            RenderError::Template(_)
            | RenderError::ContentNotLoaded
            | RenderError::TemplateNotLoaded => self.log.error(&err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Level, MemoryLog};
    use crate::error::FailureKind;
    use crate::fs::MockFs;

    fn pipeline(fs: MockFs, paths: RenderPaths) -> (RenderPipeline, Arc<MockFs>, Arc<MemoryLog>) {
        let fs = Arc::new(fs);
        let log = Arc::new(MemoryLog::new());
        let pipeline = RenderPipeline::new(paths, log.clone())
            .with_file_system(fs.clone())
            .with_retry(RetryPolicy {
                retries: 1,
                delay: Duration::from_millis(10),
            });
        (pipeline, fs, log)
    }

    fn ready_fs() -> MockFs {
        MockFs::new()
            .with_file("t.liquid", "{{ content.title }}")
            .with_file("c.json", r#"{"title":"Hello"}"#)
    }

    #[test]
    fn test_render_writes_output() {
        let (pipeline, fs, log) = pipeline(ready_fs(), RenderPaths::new("t.liquid", "c.json", "out.txt"));
        assert_eq!(pipeline.render(), "Hello");
        assert_eq!(fs.contents("out.txt").as_deref(), Some("Hello"));
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_can_render_requires_all_three() {
        let cases = [
            (RenderPaths::new("t.liquid", "c.json", "out.txt"), true),
            (RenderPaths::new("missing.liquid", "c.json", "out.txt"), false),
            (RenderPaths::new("t.liquid", "missing.json", "out.txt"), false),
            (RenderPaths::new("t.liquid", "c.json", ""), false),
            (RenderPaths::default(), false),
        ];
        for (paths, expected) in cases {
            let (pipeline, _, _) = pipeline(ready_fs(), paths.clone());
            assert_eq!(pipeline.can_render(), expected, "{:?}", paths);
        }
    }

    #[test]
    fn test_can_render_is_not_cached() {
        let (pipeline, fs, _) = pipeline(
            MockFs::new().with_file("t.liquid", "x"),
            RenderPaths::new("t.liquid", "c.json", "out.txt"),
        );
        assert!(!pipeline.can_render());
        fs.set_file("c.json", "{}");
        assert!(pipeline.can_render());
    }

    #[test]
    fn test_not_ready_logs_warning_and_returns_empty() {
        let (pipeline, fs, log) = pipeline(MockFs::new(), RenderPaths::new("t.liquid", "c.json", "out.txt"));
        assert_eq!(pipeline.render(), "");
        assert!(log.contains(
            Level::Warning,
            "Unable to render as inputs or outputs not found or not specified"
        ));
        assert_eq!(fs.contents("out.txt"), None);
    }

    #[test]
    fn test_unsupported_extension_is_error_without_retry() {
        let fs = MockFs::new()
            .with_file("t.liquid", "{{ content }}")
            .with_file("c.yaml", "title: x");
        let (pipeline, fs, log) = pipeline(fs, RenderPaths::new("t.liquid", "c.yaml", "out.txt"));

        assert_eq!(pipeline.render(), "");
        assert!(log.contains(Level::Error, "Unsupported content type"));
        assert_eq!(fs.read_attempts("c.yaml"), 1);
        assert_eq!(fs.contents("out.txt"), None);
    }

    #[test]
    fn test_malformed_content_logs_parser_message() {
        let fs = MockFs::new()
            .with_file("t.liquid", "{{ content }}")
            .with_file("c.json", r#"{"title": "#);
        let (pipeline, _, log) = pipeline(fs, RenderPaths::new("t.liquid", "c.json", "out.txt"));

        assert_eq!(pipeline.render(), "");
        assert!(log.contains(Level::Warning, "Unable to set parser content"));
        assert!(log.contains(Level::Warning, "Info: Invalid JSON content"));
    }

    #[test]
    fn test_template_error_is_logged() {
        let fs = MockFs::new()
            .with_file("t.liquid", "{% if %}")
            .with_file("c.json", "{}");
        let (pipeline, fs, log) = pipeline(fs, RenderPaths::new("t.liquid", "c.json", "out.txt"));

        assert_eq!(pipeline.render(), "");
        assert!(log.contains(Level::Error, "Error: "));
        assert_eq!(fs.contents("out.txt"), None);
    }

    #[test]
    fn test_short_lock_succeeds_on_retry() {
        let (pipeline, fs, log) = pipeline(ready_fs(), RenderPaths::new("t.liquid", "c.json", "out.txt"));
        fs.lock_for("c.json", Duration::from_millis(2));

        assert_eq!(pipeline.render(), "Hello");
        assert_eq!(fs.read_attempts("c.json"), 2);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_long_lock_abandons_after_one_retry() {
        let (pipeline, fs, log) = pipeline(ready_fs(), RenderPaths::new("t.liquid", "c.json", "out.txt"));
        fs.lock_for("c.json", Duration::from_secs(5));

        assert_eq!(pipeline.render(), "");
        assert_eq!(fs.read_attempts("c.json"), 2);
        assert_eq!(fs.read_attempts("t.liquid"), 0);
        assert!(log.contains(Level::Warning, "Unable to read file: c.json"));
        assert!(log.contains(Level::Warning, "Info: c.json is locked"));
    }

    #[test]
    fn test_undecodable_content_is_not_retried() {
        let (pipeline, fs, log) = pipeline(ready_fs(), RenderPaths::new("t.liquid", "c.json", "out.txt"));
        fs.fail_reads("c.json", io::ErrorKind::InvalidData);

        let err = pipeline.try_render().unwrap_err();
        assert_eq!(err.kind(), FailureKind::ContentParse);
        assert_eq!(fs.read_attempts("c.json"), 1);

        assert_eq!(pipeline.render(), "");
        assert!(log.contains(Level::Warning, "Unable to set parser content"));
        assert!(log.contains(Level::Warning, "Info: Invalid text encoding in c.json"));
    }

    #[test]
    fn test_output_failure_logs_cause_as_error() {
        let (pipeline, fs, log) = pipeline(ready_fs(), RenderPaths::new("t.liquid", "c.json", "out.txt"));
        fs.lock_for("out.txt", Duration::from_secs(5));

        assert_eq!(pipeline.render(), "");
        assert_eq!(
            log.entries(),
            vec![
                (Level::Error, "Unable to write output file: out.txt".to_string()),
                (
                    Level::Error,
                    "    Info: out.txt is locked by another process".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_try_render_exposes_failure_kind() {
        let (pipeline, _, log) = pipeline(MockFs::new(), RenderPaths::default());
        let err = pipeline.try_render().unwrap_err();
        assert!(matches!(err, RenderError::NotReady));
        assert!(log.entries().is_empty());
    }
}
