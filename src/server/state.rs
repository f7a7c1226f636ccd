use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::audio::Transcoder;
use crate::render::RenderedClip;
use crate::tts::Synthesizer;

#[derive(Clone)]
pub struct AppState {
    // Held for the whole synthesis so requests run one at a time
    pub synthesizer: Arc<Mutex<Synthesizer>>,
    pub transcoder: Arc<Transcoder>,
    pub default_voice: Arc<str>,
    // Only the most recent clip is kept; a new synthesis replaces it
    pub latest: Arc<RwLock<Option<Arc<RenderedClip>>>>,
}

impl AppState {
    pub fn new(synthesizer: Synthesizer, transcoder: Transcoder, default_voice: &str) -> Self {
        Self {
            synthesizer: Arc::new(Mutex::new(synthesizer)),
            transcoder: Arc::new(transcoder),
            default_voice: Arc::from(default_voice),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Drop the current clip.
    pub fn discard_latest(&self) {
        self.latest.write().take();
    }

    pub fn store_latest(&self, clip: RenderedClip) -> Arc<RenderedClip> {
        let clip = Arc::new(clip);
        *self.latest.write() = Some(clip.clone());
        clip
    }

    /// The current clip, if its id matches.
    pub fn clip(&self, id: &uuid::Uuid) -> Option<Arc<RenderedClip>> {
        self.latest.read().as_ref().filter(|clip| clip.id == *id).cloned()
    }
}
