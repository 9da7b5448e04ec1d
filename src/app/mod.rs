// SPDX-License-Identifier: GPL-3.0-only

//! Photo booth controller
//!
//! [`PhotoBooth`] wires the frame source, the live render loop, the shared
//! filter selection, the countdown, the capture session, the photo library and
//! the notifier together. It holds no presentation state: front ends read the
//! plain data it exposes and call its operations.
//!
//! Operations are grouped by concern in `handlers`:
//! - **camera**: stream lifecycle, switching, mirror, suspend/resume
//! - **capture**: filter selection, countdown, take/retake/save
//! - **gallery**: library deletion and export

mod handlers;
pub mod state;

pub use state::{Countdown, CountdownEvent};

use crate::backends::camera::{CameraDevice, SharedSource, StreamHandle};
use crate::config::Config;
use crate::filters::{FilterKind, FilterSelection};
use crate::notify::Notifier;
use crate::pipelines::photo::{CaptureSession, PhotoPipeline};
use crate::render::{RenderLoop, Scheduler, SharedSurface};
use crate::storage::{PhotoLibrary, PhotoStore};
use tracing::info;

/// The photo booth
pub struct PhotoBooth {
    config: Config,
    source: SharedSource,
    stream: Option<StreamHandle>,
    selection: FilterSelection,
    render: RenderLoop,
    surface: SharedSurface,
    pipeline: PhotoPipeline,
    countdown: Option<Countdown>,
    session: Option<CaptureSession>,
    library: PhotoLibrary,
    store: Box<dyn PhotoStore>,
    notifier: Box<dyn Notifier>,
    suspended: bool,
}

impl PhotoBooth {
    /// Create a booth and load the stored library
    ///
    /// No stream is opened until [`PhotoBooth::start_camera`].
    pub fn new(
        config: Config,
        source: SharedSource,
        scheduler: impl Scheduler + 'static,
        store: Box<dyn PhotoStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let selection = FilterSelection::new(config.default_filter);
        let surface = SharedSurface::new();
        let render = RenderLoop::new(
            source.clone(),
            selection.clone(),
            surface.clone(),
            scheduler,
        );
        render.set_mirrored(config.mirror_preview);

        let pipeline = PhotoPipeline::new(
            config.preview_max_width,
            config.preview_max_height,
            config.jpeg_quality,
        );

        let loaded = store.load_all();
        let library = PhotoLibrary::from_photos(loaded.photos().to_vec(), config.library_capacity);
        if let Some(max_id) = library.max_id() {
            pipeline.encoder().observe_id(max_id);
        }

        info!(
            photos = library.len(),
            filter = %config.default_filter,
            mirrored = config.mirror_preview,
            "Photo booth ready"
        );

        Self {
            config,
            source,
            stream: None,
            selection,
            render,
            surface,
            pipeline,
            countdown: None,
            session: None,
            library,
            store,
            notifier,
            suspended: false,
        }
    }

    /// Current configuration, including runtime changes (mirror, last camera)
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the active filter
    pub fn filter_selection(&self) -> FilterSelection {
        self.selection.clone()
    }

    pub fn current_filter(&self) -> FilterKind {
        self.selection.get()
    }

    pub fn is_mirrored(&self) -> bool {
        self.render.is_mirrored()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Device of the active stream
    pub fn current_device(&self) -> Option<&CameraDevice> {
        self.stream.as_ref().map(|s| s.device())
    }

    /// Surface holding the latest live frame
    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render
    }

    pub fn library(&self) -> &PhotoLibrary {
        &self.library
    }

    /// Capture awaiting save or retake
    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Seconds left on a running countdown
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining())
    }
}

impl Drop for PhotoBooth {
    fn drop(&mut self) {
        self.shutdown();
    }
}
