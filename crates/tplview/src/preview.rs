//! The preview facade.

use std::sync::{Arc, Mutex, PoisonError};

use tplview_render::{
    ConsoleLog, DiagnosticsSink, FileSystem, RenderPipeline, TemplateEngine,
};
use tplview_watch::{
    ChangeCallback, ReadyCheck, RenderQueue, WatchBackend, WatchController, WatchState,
};

use crate::config::PreviewConfig;

/// Errors raised while assembling a preview.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("Unable to start the render worker: {0}")]
    Worker(#[from] std::io::Error),
}

/// A configured preview: render on demand, or on every file change.
///
/// Direct calls to [`render`](Self::render) and renders triggered by file
/// changes share one lock, so the output file only ever has one writer.
pub struct Preview {
    config: PreviewConfig,
    log: Arc<dyn DiagnosticsSink>,
    pipeline: Arc<RenderPipeline>,
    render_lock: Arc<Mutex<()>>,
    controller: WatchController,
    // Dropped after the controller so pending renders can still run.
    _queue: Arc<RenderQueue>,
}

impl Preview {
    /// Creates a preview that logs to the console.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Worker`] if the render thread cannot start.
    pub fn new(config: PreviewConfig) -> Result<Self, PreviewError> {
        Self::builder(config).build()
    }

    pub fn builder(config: PreviewConfig) -> PreviewBuilder {
        PreviewBuilder {
            config,
            log: None,
            fs: None,
            engine: None,
            backend: None,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// The sink every diagnostic goes to.
    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.log
    }

    /// Everything logged since the preview was created.
    pub fn log(&self) -> String {
        self.log.contents()
    }

    /// Whether both inputs exist and an output is set.
    pub fn can_render(&self) -> bool {
        self.pipeline.can_render()
    }

    /// Renders once, waiting for any render already in progress.
    ///
    /// Returns the rendered text, or an empty string on failure.
    pub fn render(&self) -> String {
        let _guard = self
            .render_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.pipeline.render()
    }

    /// Starts re-rendering on changes. See [`WatchController::start_watch`].
    pub fn start_watch(&self) -> bool {
        self.controller.start_watch()
    }

    /// Stops re-rendering on changes. A render already running completes.
    pub fn stop_watch(&self) {
        self.controller.stop_watch();
    }

    pub fn watch_state(&self) -> WatchState {
        self.controller.state()
    }
}

/// Builder for [`Preview`] with replaceable collaborators.
pub struct PreviewBuilder {
    config: PreviewConfig,
    log: Option<Arc<dyn DiagnosticsSink>>,
    fs: Option<Arc<dyn FileSystem>>,
    engine: Option<Arc<dyn TemplateEngine>>,
    backend: Option<Arc<dyn WatchBackend>>,
}

impl PreviewBuilder {
    pub fn log(mut self, log: Arc<dyn DiagnosticsSink>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn watch_backend(mut self, backend: Arc<dyn WatchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Assembles the preview and starts its render worker.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Worker`] if the render thread cannot start.
    pub fn build(self) -> Result<Preview, PreviewError> {
        let log = self
            .log
            .unwrap_or_else(|| Arc::new(ConsoleLog::new()) as Arc<dyn DiagnosticsSink>);
        let paths = self.config.render_paths();

        let mut pipeline = RenderPipeline::new(paths.clone(), Arc::clone(&log))
            .with_retry(self.config.retry_policy());
        if let Some(fs) = self.fs {
            pipeline = pipeline.with_file_system(fs);
        }
        if let Some(engine) = self.engine {
            pipeline = pipeline.with_engine(engine);
        }
        let pipeline = Arc::new(pipeline);
        let render_lock = Arc::new(Mutex::new(()));

        let queue = {
            let pipeline = Arc::clone(&pipeline);
            let render_lock = Arc::clone(&render_lock);
            Arc::new(RenderQueue::spawn(move || {
                let _guard = render_lock.lock().unwrap_or_else(PoisonError::into_inner);
                pipeline.render();
            })?)
        };

        let ready: ReadyCheck = {
            let pipeline = Arc::clone(&pipeline);
            Arc::new(move || pipeline.can_render())
        };
        let on_change: ChangeCallback = {
            let queue = Arc::clone(&queue);
            Arc::new(move || {
                queue.trigger();
            })
        };
        let mut controller = WatchController::new(&paths, Arc::clone(&log), ready, on_change);
        if let Some(backend) = self.backend {
            controller = controller.with_backend(backend);
        }

        Ok(Preview {
            config: self.config,
            log,
            pipeline,
            render_lock,
            controller,
            _queue: queue,
        })
    }
}
