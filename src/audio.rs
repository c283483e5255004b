//! Fire-and-forget sound effects.
//!
//! Each [`Sfx::play`] runs on its own short-lived worker: the clip is loaded,
//! played, and dropped as soon as the backend reports that playback ended.
//! Failures are logged and never reach the caller.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use crate::config::AudioKind;
use crate::game::Sound;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("failed to load {sound:?} clip: {reason}")]
    Load { sound: Sound, reason: String },
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Produces playable clips for a sound.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn load(&self, sound: Sound) -> Result<Box<dyn Clip>, AudioError>;
}

/// A loaded clip. Dropping it releases whatever the backend holds for it.
pub trait Clip: Send {
    fn play(&mut self) -> Result<(), AudioError>;

    /// Blocks until the backend reports that playback finished.
    fn wait_finished(&mut self);
}

/// A clip that is alive until playback ends.
struct Playback {
    sound: Sound,
    clip: Box<dyn Clip>,
    live: Arc<AtomicUsize>,
}

impl Playback {
    fn new(sound: Sound, clip: Box<dyn Clip>, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self { sound, clip, live }
    }

    fn run(mut self) -> Result<(), AudioError> {
        self.clip.play()?;
        self.clip.wait_finished();
        Ok(())
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        trace!(sound = ?self.sound, "clip released");
    }
}

#[derive(Clone)]
pub struct Sfx {
    backend: Arc<dyn Backend>,
    live: Arc<AtomicUsize>,
}

impl Sfx {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn silent() -> Self {
        Self::new(Arc::new(Silent))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Starts playing `sound` and returns immediately. The handle is only
    /// useful to callers that want to wait; dropping it detaches the worker.
    pub fn play(&self, sound: Sound) -> Option<JoinHandle<()>> {
        let backend = Arc::clone(&self.backend);
        let live = Arc::clone(&self.live);

        let spawned = thread::Builder::new()
            .name(format!("sfx-{sound:?}").to_lowercase())
            .spawn(move || {
                let result = backend
                    .load(sound)
                    .and_then(|clip| Playback::new(sound, clip, live).run());
                if let Err(err) = result {
                    warn!(?sound, backend = backend.name(), "sound effect failed: {err}");
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(?sound, "could not start playback worker: {err}");
                None
            }
        }
    }

    /// Clips currently loaded and not yet released.
    pub fn live_clips(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Keeps an opened backend together with anything that has to outlive it.
pub struct Device {
    backend: Arc<dyn Backend>,
    #[cfg(feature = "tone")]
    _stream: Option<rodio::OutputStream>,
}

impl Device {
    pub fn open(kind: AudioKind) -> Result<Self, AudioError> {
        let device = match kind {
            AudioKind::Silent => Self::from_backend(Arc::new(Silent)),
            AudioKind::Bell => Self::from_backend(Arc::new(Bell)),
            AudioKind::Tone => Self::open_tone()?,
        };
        debug!(backend = device.backend.name(), "audio device opened");
        Ok(device)
    }

    fn from_backend(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            #[cfg(feature = "tone")]
            _stream: None,
        }
    }

    #[cfg(feature = "tone")]
    fn open_tone() -> Result<Self, AudioError> {
        let (stream, backend) = tone::open()?;
        Ok(Self {
            backend: Arc::new(backend),
            _stream: Some(stream),
        })
    }

    #[cfg(not(feature = "tone"))]
    fn open_tone() -> Result<Self, AudioError> {
        Err(AudioError::Unavailable(
            "built without the `tone` feature".to_string(),
        ))
    }

    pub fn sfx(&self) -> Sfx {
        Sfx::new(Arc::clone(&self.backend))
    }
}

pub struct Silent;

struct SilentClip;

impl Backend for Silent {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn load(&self, _sound: Sound) -> Result<Box<dyn Clip>, AudioError> {
        Ok(Box::new(SilentClip))
    }
}

impl Clip for SilentClip {
    fn play(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn wait_finished(&mut self) {}
}

/// Rings the terminal bell. Written to stderr so it never interleaves with
/// the frame being drawn on stdout.
pub struct Bell;

struct BellClip {
    rings: usize,
}

impl Backend for Bell {
    fn name(&self) -> &'static str {
        "bell"
    }

    fn load(&self, sound: Sound) -> Result<Box<dyn Clip>, AudioError> {
        let rings = match sound {
            Sound::Move => 1,
            Sound::Win => 2,
        };
        Ok(Box::new(BellClip { rings }))
    }
}

impl Clip for BellClip {
    fn play(&mut self) -> Result<(), AudioError> {
        let mut stderr = io::stderr().lock();
        for _ in 0..self.rings {
            stderr
                .write_all(b"\x07")
                .map_err(|err| AudioError::Playback(err.to_string()))?;
        }
        stderr
            .flush()
            .map_err(|err| AudioError::Playback(err.to_string()))
    }

    fn wait_finished(&mut self) {}
}

#[cfg(feature = "tone")]
mod tone {
    use std::time::Duration;

    use rodio::source::{SineWave, Source};
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{AudioError, Backend, Clip};
    use crate::game::Sound;

    const VOLUME: f32 = 0.2;

    pub fn open() -> Result<(OutputStream, ToneBackend), AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|err| AudioError::Unavailable(err.to_string()))?;
        Ok((stream, ToneBackend { handle }))
    }

    pub struct ToneBackend {
        handle: OutputStreamHandle,
    }

    struct ToneClip {
        sink: Sink,
    }

    fn notes(sound: Sound) -> &'static [(f32, u64)] {
        match sound {
            Sound::Move => &[(660.0, 60)],
            Sound::Win => &[(523.25, 120), (659.25, 120), (783.99, 120), (1046.5, 240)],
        }
    }

    impl Backend for ToneBackend {
        fn name(&self) -> &'static str {
            "tone"
        }

        fn load(&self, sound: Sound) -> Result<Box<dyn Clip>, AudioError> {
            let sink = Sink::try_new(&self.handle).map_err(|err| AudioError::Load {
                sound,
                reason: err.to_string(),
            })?;
            sink.pause();
            for &(freq, millis) in notes(sound) {
                sink.append(
                    SineWave::new(freq)
                        .take_duration(Duration::from_millis(millis))
                        .amplify(VOLUME),
                );
            }
            Ok(Box::new(ToneClip { sink }))
        }
    }

    impl Clip for ToneClip {
        fn play(&mut self) -> Result<(), AudioError> {
            self.sink.play();
            Ok(())
        }

        fn wait_finished(&mut self) {
            self.sink.sleep_until_end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Clips finish when the test says so.
    struct Gated {
        loaded: Mutex<Sender<Sound>>,
        finish: Arc<Mutex<Receiver<()>>>,
    }

    struct GatedClip {
        finish: Arc<Mutex<Receiver<()>>>,
    }

    impl Backend for Gated {
        fn name(&self) -> &'static str {
            "gated"
        }

        fn load(&self, sound: Sound) -> Result<Box<dyn Clip>, AudioError> {
            let _ = self.loaded.lock().unwrap().send(sound);
            Ok(Box::new(GatedClip {
                finish: Arc::clone(&self.finish),
            }))
        }
    }

    impl Clip for GatedClip {
        fn play(&mut self) -> Result<(), AudioError> {
            Ok(())
        }

        fn wait_finished(&mut self) {
            let _ = self.finish.lock().unwrap().recv();
        }
    }

    struct Broken;

    impl Backend for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn load(&self, sound: Sound) -> Result<Box<dyn Clip>, AudioError> {
            Err(AudioError::Load {
                sound,
                reason: "no such clip".to_string(),
            })
        }
    }

    struct FailsToPlay;

    struct FailingClip;

    impl Backend for FailsToPlay {
        fn name(&self) -> &'static str {
            "fails-to-play"
        }

        fn load(&self, _sound: Sound) -> Result<Box<dyn Clip>, AudioError> {
            Ok(Box::new(FailingClip))
        }
    }

    impl Clip for FailingClip {
        fn play(&mut self) -> Result<(), AudioError> {
            Err(AudioError::Playback("device busy".to_string()))
        }

        fn wait_finished(&mut self) {}
    }

    #[test]
    fn clip_is_released_when_playback_finishes() {
        let (loaded_tx, loaded_rx) = mpsc::channel();
        let (finish_tx, finish_rx) = mpsc::channel();
        let sfx = Sfx::new(Arc::new(Gated {
            loaded: Mutex::new(loaded_tx),
            finish: Arc::new(Mutex::new(finish_rx)),
        }));

        let handle = sfx.play(Sound::Win).unwrap();
        assert_eq!(
            loaded_rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            Sound::Win
        );

        let deadline = Instant::now() + Duration::from_secs(2);
        while sfx.live_clips() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(sfx.live_clips(), 1);

        finish_tx.send(()).unwrap();
        handle.join().unwrap();
        assert_eq!(sfx.live_clips(), 0);
    }

    #[test]
    fn load_failure_is_contained() {
        let sfx = Sfx::new(Arc::new(Broken));
        sfx.play(Sound::Move).unwrap().join().unwrap();
        assert_eq!(sfx.live_clips(), 0);
    }

    #[test]
    fn playback_failure_still_releases() {
        let sfx = Sfx::new(Arc::new(FailsToPlay));
        sfx.play(Sound::Move).unwrap().join().unwrap();
        assert_eq!(sfx.live_clips(), 0);
    }

    #[test]
    fn silent_device_opens() {
        let device = Device::open(AudioKind::Silent).unwrap();
        let sfx = device.sfx();
        assert_eq!(sfx.backend_name(), "silent");
        sfx.play(Sound::Move).unwrap().join().unwrap();
        assert_eq!(sfx.live_clips(), 0);
    }

    #[cfg(not(feature = "tone"))]
    #[test]
    fn tone_needs_the_feature() {
        assert!(matches!(
            Device::open(AudioKind::Tone),
            Err(AudioError::Unavailable(_))
        ));
    }
}
