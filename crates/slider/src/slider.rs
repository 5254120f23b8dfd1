use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::backend::RenderBackend;
use crate::completion::{completion_pair, Completion, PendingResult, SliderResult};
use crate::error::{LoadError, RenderError, SliderError};
use crate::fetch::ImageFetcher;
use crate::sizing::{compute_size, ContainerSize};
use crate::source::ImageSource;
use crate::state::ShaderState;
use crate::texture::{TextureCache, TextureId, TextureSet};
use crate::timeline::Easing;
use crate::transition::{TransitionController, TransitionPhase, TransitionStep};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderOptions {
    pub transition_duration: Duration,
    pub easing: Easing,
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self {
            transition_duration: Duration::from_secs(1),
            easing: Easing::EaseOut,
        }
    }
}

/// A queued request to switch to `index`.
#[derive(Debug)]
pub struct TransitionRequest {
    pub index: usize,
    completion: Completion,
}

impl TransitionRequest {
    pub(crate) fn new(index: usize, completion: Completion) -> Self {
        Self { index, completion }
    }
}

#[derive(Debug)]
pub(crate) enum Operation {
    Init(Completion),
    Switch(TransitionRequest),
    Update {
        sources: Vec<ImageSource>,
        completion: Completion,
    },
}

/// The operation currently holding the slider.
enum Active {
    Init(Completion),
    Update(Completion),
    Switch(Completion),
}

/// Displacement cross-fade slideshow over a [`RenderBackend`].
///
/// Public operations are queued and run strictly one at a time in FIFO order;
/// [`Slider::frame`] drives them. Every operation hands back a
/// [`PendingResult`] that resolves when it has finished.
pub struct Slider<B: RenderBackend> {
    backend: B,
    cache: TextureCache,
    shader: ShaderState,
    transition: TransitionController,
    queue: VecDeque<Operation>,
    active: Option<Active>,
    initialized: bool,
}

impl<B: RenderBackend> Slider<B> {
    pub fn new(
        backend: B,
        fetcher: Arc<dyn ImageFetcher>,
        options: SliderOptions,
        images: Vec<ImageSource>,
    ) -> Self {
        Self {
            backend,
            cache: TextureCache::with_sources(fetcher, images),
            shader: ShaderState::default(),
            transition: TransitionController::new(options.transition_duration, options.easing),
            queue: VecDeque::new(),
            active: None,
            initialized: false,
        }
    }

    /// Loads the configured images and shows the first one.
    pub fn init(&mut self) -> PendingResult {
        let (completion, pending) = completion_pair();
        self.enqueue(Operation::Init(completion));
        pending
    }

    /// Cross-fades to the image at `index`.
    pub fn switch_by_id(&mut self, index: usize) -> PendingResult {
        let (completion, pending) = completion_pair();
        self.enqueue(Operation::Switch(TransitionRequest::new(index, completion)));
        pending
    }

    /// Replaces the image list and reloads every texture.
    ///
    /// The textures on screen stay until the next switch.
    pub fn update_slider(&mut self, images: Vec<ImageSource>) -> PendingResult {
        let (completion, pending) = completion_pair();
        self.enqueue(Operation::Update {
            sources: images,
            completion,
        });
        pending
    }

    pub(crate) fn enqueue(&mut self, operation: Operation) {
        self.queue.push_back(operation);
    }

    /// Re-fits the drawing buffer to the current image and redraws.
    ///
    /// The host resizes the backend's surface to `container` beforehand.
    pub fn set_container_size(&mut self, container: ContainerSize) -> Result<(), RenderError> {
        self.fit_to(self.shader.current_dims(), container);
        self.backend.render(&self.shader)
    }

    /// One animation tick.
    pub fn frame(&mut self, now: Instant) -> Result<(), RenderError> {
        let mut render_error = None;

        if let Some(outcome) = self.cache.poll(&mut self.backend) {
            self.finish_load(outcome, &mut render_error);
        }

        let mut rendered = false;
        if let TransitionStep::Completed { index } = self.transition.advance(&mut self.shader, now)
        {
            let result = self.backend.render(&self.shader);
            rendered = true;
            self.transition.commit(&mut self.shader);
            self.release_unused();
            info!(index, "switched image");
            let outcome = settle_render(result, &mut render_error);
            match self.active.take() {
                Some(Active::Switch(completion)) => completion.resolve(outcome),
                other => self.active = other,
            }
        }

        self.activate_queued(now);

        if !rendered {
            if let Err(err) = self.backend.render(&self.shader) {
                render_error.get_or_insert(err);
            }
        }

        match render_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn shader_state(&self) -> &ShaderState {
        &self.shader
    }

    pub fn textures(&self) -> &TextureSet {
        self.cache.textures()
    }

    pub fn sources(&self) -> &[ImageSource] {
        self.cache.sources()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.transition.phase()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Queued operations, not counting the one in progress.
    pub fn pending_operations(&self) -> usize {
        self.queue.len()
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Resolves every queued and in-flight operation with `Disposed`.
    pub fn dispose(&mut self) {
        let dropped = self.queue.len() + usize::from(self.active.is_some());
        if dropped > 0 {
            debug!(count = dropped, "disposing pending slider operations");
        }
        for operation in self.queue.drain(..) {
            let completion = match operation {
                Operation::Init(completion) => completion,
                Operation::Switch(request) => request.completion,
                Operation::Update { completion, .. } => completion,
            };
            completion.resolve(Err(SliderError::Disposed));
        }
        if let Some(active) = self.active.take() {
            let completion = match active {
                Active::Init(completion) | Active::Update(completion) | Active::Switch(completion) => {
                    completion
                }
            };
            completion.resolve(Err(SliderError::Disposed));
        }
    }

    fn finish_load(
        &mut self,
        outcome: Result<(), LoadError>,
        render_error: &mut Option<RenderError>,
    ) {
        match self.active.take() {
            Some(Active::Init(completion)) => {
                let result = match outcome {
                    Ok(()) => self.finalize_init(render_error),
                    Err(err) => {
                        warn!(error = %err, "slider initialisation failed");
                        Err(err.into())
                    }
                };
                completion.resolve(result);
            }
            Some(Active::Update(completion)) => {
                self.release_unused();
                match &outcome {
                    Ok(()) => info!(count = self.cache.sources().len(), "slider images updated"),
                    Err(err) => warn!(error = %err, "slider update failed"),
                }
                completion.resolve(outcome.map_err(SliderError::from));
            }
            other => self.active = other,
        }
    }

    fn finalize_init(&mut self, render_error: &mut Option<RenderError>) -> SliderResult {
        let textures = self.cache.textures();
        let first = textures.get(0).cloned();
        let second = textures.get(1).cloned().or_else(|| first.clone());
        self.shader = ShaderState {
            current: first,
            next: second,
            disp_factor: 0.0,
        };
        self.initialized = true;
        self.release_unused();

        let container = self.backend.container_size();
        self.fit_to(self.shader.current_dims(), container);
        info!(count = self.cache.sources().len(), "slider initialised");
        let result = self.backend.render(&self.shader);
        settle_render(result, render_error)
    }

    fn activate_queued(&mut self, now: Instant) {
        while self.active.is_none() {
            let Some(operation) = self.queue.pop_front() else {
                return;
            };
            match operation {
                Operation::Init(completion) => {
                    if self.initialized {
                        completion.resolve(Err(SliderError::AlreadyInitialized));
                        continue;
                    }
                    let sources = self.cache.sources().to_vec();
                    match self.cache.update_all(sources) {
                        Ok(()) => self.active = Some(Active::Init(completion)),
                        Err(err) => completion.resolve(Err(err.into())),
                    }
                }
                Operation::Update {
                    sources,
                    completion,
                } => {
                    match self.cache.update_all(sources) {
                        Ok(()) => self.active = Some(Active::Update(completion)),
                        Err(err) => completion.resolve(Err(err.into())),
                    }
                }
                Operation::Switch(request) => {
                    let TransitionRequest { index, completion } = request;
                    match self.begin_switch(index, now) {
                        Ok(()) => self.active = Some(Active::Switch(completion)),
                        Err(err) => {
                            error!(index, error = %err, "switch rejected");
                            completion.resolve(Err(err));
                        }
                    }
                }
            }
        }
    }

    fn begin_switch(&mut self, index: usize, now: Instant) -> SliderResult {
        if !self.initialized {
            return Err(SliderError::NotInitialized);
        }
        let textures = self.cache.textures();
        if index >= textures.len() {
            return Err(SliderError::InvalidIndex {
                index,
                len: textures.len(),
            });
        }
        let target = textures
            .get(index)
            .cloned()
            .ok_or(SliderError::TextureNotLoaded { index })?;
        let dims = target.dimensions();
        self.transition
            .begin(&mut self.shader, index, target, now)?;
        let container = self.backend.container_size();
        self.fit_to(Some(dims), container);
        Ok(())
    }

    fn fit_to(&mut self, image: Option<(u32, u32)>, container: ContainerSize) {
        let size = compute_size(image, container);
        debug!(width = size.width, height = size.height, "render size");
        self.backend.resize(size);
    }

    fn release_unused(&mut self) {
        let mut live: Vec<TextureId> = self.cache.textures().ids().collect();
        live.extend(self.shader.ids());
        live.sort_unstable();
        live.dedup();
        self.backend.retain_textures(&live);
    }
}

impl<B: RenderBackend> Drop for Slider<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Recoverable surface errors are reported to the host but do not fail the
/// operation that triggered the render.
fn settle_render(
    result: Result<(), RenderError>,
    render_error: &mut Option<RenderError>,
) -> SliderResult {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            let recoverable = err.is_recoverable();
            render_error.get_or_insert(err.clone());
            if recoverable {
                Ok(())
            } else {
                Err(SliderError::Render(err))
            }
        }
    }
}
