use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use log::warn;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

struct AudioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

pub struct SoundPlayer {
    output: Option<AudioOutput>,
    data: Option<Arc<[u8]>>,
    sink: Option<Sink>,
}

impl SoundPlayer {
    // Every failure degrades to a silent player: the alarm still arms and
    // rings, just without sound.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read(path) {
            Ok(bytes) => Some(Arc::<[u8]>::from(bytes)),
            Err(err) => {
                warn!(
                    "could not read alarm sound {}: {err}; the alarm will ring silently",
                    path.display()
                );
                None
            }
        };

        let output = if data.is_some() {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Some(AudioOutput {
                    _stream: stream,
                    handle,
                }),
                Err(err) => {
                    warn!("no audio output available: {err}; the alarm will ring silently");
                    None
                }
            }
        } else {
            None
        };

        Self {
            output,
            data,
            sink: None,
        }
    }

    pub fn silent() -> Self {
        Self {
            output: None,
            data: None,
            sink: None,
        }
    }

    pub fn is_audible(&self) -> bool {
        self.output.is_some() && self.data.is_some()
    }

    pub fn play(&mut self) {
        self.stop();
        let (Some(output), Some(data)) = (&self.output, &self.data) else {
            return;
        };

        let source = match Decoder::new(Cursor::new(Arc::clone(data))) {
            Ok(source) => source,
            Err(err) => {
                warn!("could not decode alarm sound: {err}");
                return;
            }
        };
        match Sink::try_new(&output.handle) {
            Ok(sink) => {
                sink.append(source);
                self.sink = Some(sink);
            }
            Err(err) => warn!("could not start alarm playback: {err}"),
        }
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_asset_degrades_to_a_silent_player() {
        let player = SoundPlayer::load(&PathBuf::from("does-not-exist.mp3"));
        assert!(!player.is_audible());
    }

    #[test]
    fn silent_player_accepts_play_and_stop() {
        let mut player = SoundPlayer::silent();
        player.play();
        player.play();
        player.stop();
        player.stop();
        assert!(!player.is_audible());
    }
}
