use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::{debug, info, warn};

use crate::backend::RenderBackend;
use crate::error::LoadError;
use crate::fetch::{DecodedImage, ImageFetcher};
use crate::source::ImageSource;

/// Identity of one uploaded texture; the backend keys GPU resources by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFilter {
    pub mag: FilterMode,
    pub min: FilterMode,
    pub anisotropy: u16,
}

impl TextureFilter {
    pub fn linear(anisotropy: u16) -> Self {
        Self {
            mag: FilterMode::Linear,
            min: FilterMode::Linear,
            anisotropy: anisotropy.max(1),
        }
    }
}

#[derive(Debug)]
pub struct LoadedTexture {
    pub id: TextureId,
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
    pub filter: TextureFilter,
}

impl LoadedTexture {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

pub type TextureRef = Arc<LoadedTexture>;

/// Textures parallel-indexed to the source list; `None` marks an entry that
/// has not been (or could not be) loaded.
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    slots: Vec<Option<TextureRef>>,
}

impl TextureSet {
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TextureRef> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn ids(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.slots.iter().flatten().map(|texture| texture.id)
    }

    fn install(&mut self, index: usize, texture: TextureRef) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(texture);
        }
    }
}

enum LoadEvent {
    Decoded { index: usize, image: DecodedImage },
    Failed { index: usize, error: LoadError },
    Finished,
}

struct Batch {
    events: Receiver<LoadEvent>,
    len: usize,
}

/// Owns the source list and the uploaded textures.
///
/// Fetching happens on a loader thread per batch; uploads happen on the
/// thread that calls [`TextureCache::poll`], in index order.
pub struct TextureCache {
    fetcher: Arc<dyn ImageFetcher>,
    sources: Vec<ImageSource>,
    textures: TextureSet,
    batch: Option<Batch>,
    next_id: u64,
}

impl TextureCache {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self::with_sources(fetcher, Vec::new())
    }

    /// A cache that knows its sources but has not started loading them.
    pub fn with_sources(fetcher: Arc<dyn ImageFetcher>, sources: Vec<ImageSource>) -> Self {
        Self {
            fetcher,
            sources,
            textures: TextureSet::default(),
            batch: None,
            next_id: 1,
        }
    }

    pub fn sources(&self) -> &[ImageSource] {
        &self.sources
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    pub fn is_loading(&self) -> bool {
        self.batch.is_some()
    }

    /// Fetches, decodes, and uploads a single image on the calling thread.
    pub fn load<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        source: &ImageSource,
    ) -> Result<TextureRef, LoadError> {
        let image = self.fetcher.fetch(source)?;
        self.upload(backend, source.clone(), &image)
    }

    /// Replaces the source list and starts loading every entry in order.
    ///
    /// The set is reset to `sources.len()` absent entries straight away.
    pub fn update_all(&mut self, sources: Vec<ImageSource>) -> Result<(), LoadError> {
        let len = sources.len();
        self.sources = sources.clone();
        self.textures = TextureSet::with_len(len);
        self.batch = None;

        let (tx, rx) = unbounded();
        let fetcher = Arc::clone(&self.fetcher);
        thread::Builder::new()
            .name("slider-loader".into())
            .spawn(move || run_loader(fetcher, sources, tx))
            .map_err(|error| LoadError::Io {
                location: "image loader thread".into(),
                error,
            })?;

        debug!(count = len, "started image batch");
        self.batch = Some(Batch { events: rx, len });
        Ok(())
    }

    /// Installs whatever the loader has produced so far.
    ///
    /// Returns the batch outcome exactly once, when it finishes or fails.
    pub fn poll<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Option<Result<(), LoadError>> {
        loop {
            let batch = self.batch.as_ref()?;
            let len = batch.len;
            let event = match batch.events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.batch = None;
                    warn!("image loader exited without reporting completion");
                    return Some(Err(LoadError::WorkerLost));
                }
            };

            match event {
                LoadEvent::Decoded { index, image } => {
                    let Some(source) = self.sources.get(index).cloned() else {
                        continue;
                    };
                    match self.upload(backend, source.clone(), &image) {
                        Ok(texture) => {
                            debug!(
                                index,
                                source = %source,
                                width = texture.width,
                                height = texture.height,
                                "installed texture"
                            );
                            self.textures.install(index, texture);
                        }
                        Err(error) => {
                            warn!(index, source = %source, error = %error, "failed to upload image");
                            self.batch = None;
                            return Some(Err(error));
                        }
                    }
                }
                LoadEvent::Failed { index, error } => {
                    let source = self
                        .sources
                        .get(index)
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    warn!(index, source = %source, error = %error, "failed to load image");
                    self.batch = None;
                    return Some(Err(error));
                }
                LoadEvent::Finished => {
                    self.batch = None;
                    info!(count = len, "image batch loaded");
                    return Some(Ok(()));
                }
            }
        }
    }

    fn upload<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        source: ImageSource,
        image: &DecodedImage,
    ) -> Result<TextureRef, LoadError> {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        // anisotropy is queried per upload; the backend may change adapters
        let texture = LoadedTexture {
            id,
            width: image.width,
            height: image.height,
            filter: TextureFilter::linear(backend.max_anisotropy()),
            source,
        };
        backend
            .upload_texture(&texture, image)
            .map_err(|err| LoadError::Upload {
                location: texture.source.to_string(),
                message: format!("{err:#}"),
            })?;
        Ok(Arc::new(texture))
    }
}

fn run_loader(fetcher: Arc<dyn ImageFetcher>, sources: Vec<ImageSource>, tx: Sender<LoadEvent>) {
    for (index, source) in sources.iter().enumerate() {
        let event = match fetcher.fetch(source) {
            Ok(image) => LoadEvent::Decoded { index, image },
            Err(error) => {
                let _ = tx.send(LoadEvent::Failed { index, error });
                return;
            }
        };
        if tx.send(event).is_err() {
            // the cache moved on to a newer batch
            return;
        }
    }
    let _ = tx.send(LoadEvent::Finished);
}
