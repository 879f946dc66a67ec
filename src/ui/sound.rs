/// Sound cues: procedural chiptune effects via rodio.
///
/// Buffers are synthesized once at startup and replayed fire-and-forget.
/// Any playback failure is swallowed.
///
/// Build without the "sound" feature for a silent stub with the same API.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    pub(super) const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_eat: Arc<Vec<u8>>,
        sfx_crash: Arc<Vec<u8>>,
        sfx_record: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// None when no output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::info!("audio disabled: {e}");
                    return None;
                }
            };
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_eat: Arc::new(make_wav(&gen_eat())),
                sfx_crash: Arc::new(make_wav(&gen_crash())),
                sfx_record: Arc::new(make_wav(&gen_record())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_eat(&self) { self.play(&self.sfx_eat); }
        pub fn play_crash(&self) { self.play(&self.sfx_crash); }
        pub fn play_record(&self) { self.play(&self.sfx_record); }
    }

    // ── Waveforms (mono f32) ──

    /// Render `notes` back to back; `shape` maps (phase time, freq) to a sample.
    fn sequence(notes: &[(f32, f32)], volume: f32, shape: impl Fn(f32, f32) -> f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                samples.push(shape(t, freq) * env * volume);
            }
        }
        samples
    }

    /// Eat: quick ascending arpeggio C6→E6→G6.
    pub(super) fn gen_eat() -> Vec<f32> {
        sequence(&[(1047.0, 0.04), (1319.0, 0.04), (1568.0, 0.05)], 0.25, |t, f| {
            (t * f * TAU).sin() * 0.7 + (t * f * 3.0 * TAU).sin() * 0.3
        })
    }

    /// Crash: descending A4→F#4→Eb4→C4 with a fade on the tail.
    pub(super) fn gen_crash() -> Vec<f32> {
        let mut samples = sequence(
            &[(440.0, 0.1), (370.0, 0.1), (311.0, 0.1), (261.0, 0.18)],
            0.3,
            |t, f| (t * f * TAU).sin(),
        );
        let total = samples.len();
        let fade_len = (total / 4).max(1);
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    /// New high score: two-note chime G5→C6.
    pub(super) fn gen_record() -> Vec<f32> {
        sequence(&[(784.0, 0.08), (1047.0, 0.2)], 0.3, |t, f| {
            (t * f * TAU).sin() * 0.7 + (t * f * 2.0 * TAU).sin() * 0.3
        })
    }

    // ── WAV encoder ──

    /// 16-bit PCM mono WAV.
    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
        buf.extend_from_slice(&2u16.to_le_bytes()); // block align
        buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_eat(&self) {}
    pub fn play_crash(&self) {}
    pub fn play_record(&self) {}
}
