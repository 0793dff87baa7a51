//! Audio decoding using Symphonia.
//!
//! Supports WAV, MP3, FLAC, and AAC. Files go through [`load_audio`];
//! bytes the host fetched itself go through [`decode_bytes`].

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioError, PlanarBuffer};

/// Interleaved samples straight out of the decoder.
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Interleaved audio samples (f32, normalized to -1.0..1.0)
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

impl AudioData {
    /// Duration of the audio in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Number of frames (samples per channel).
    pub fn num_frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels
    }

    pub fn into_planar(self) -> Result<PlanarBuffer, AudioError> {
        PlanarBuffer::try_from(&self)
    }
}

/// Decode an audio file.
///
/// # Example
///
/// ```no_run
/// use tilewave::audio::load_audio;
/// use std::path::Path;
///
/// let audio = load_audio(Path::new("song.mp3")).unwrap();
/// println!("{:.2}s at {}Hz", audio.duration(), audio.sample_rate);
/// ```
pub fn load_audio(path: &Path) -> Result<AudioData, AudioError> {
    let file = File::open(path)?;
    let extension = path.extension().and_then(|e| e.to_str());
    decode_source(Box::new(file), extension)
}

/// Decode an in-memory encoded asset. `extension` is a format hint only.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioData, AudioError> {
    decode_source(Box::new(Cursor::new(bytes)), extension)
}

fn decode_source(
    source: Box<dyn MediaSource>,
    extension: Option<&str>,
) -> Result<AudioData, AudioError> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioError::UnknownSampleRate)?;
    let mut channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            channels.get_or_insert(spec.channels.count());
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(buf) = &mut sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    let channels = channels.ok_or(AudioError::NoChannels)?;
    log::info!(
        "Decoded {} frames, {} channel(s) at {}Hz",
        samples.len() / channels.max(1),
        channels,
        sample_rate
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_data_duration() {
        let audio = AudioData {
            samples: vec![0.0; 44100 * 2],
            sample_rate: 44100,
            channels: 2,
        };
        assert!((audio.duration() - 1.0).abs() < 0.001);
        assert_eq!(audio.num_frames(), 44100);
    }

    #[test]
    fn test_audio_data_without_channels() {
        let audio = AudioData {
            samples: vec![0.0; 8],
            sample_rate: 44100,
            channels: 0,
        };
        assert_eq!(audio.duration(), 0.0);
        assert!(audio.into_planar().is_err());
    }

    #[test]
    fn test_decode_garbage_bytes_fails() {
        let result = decode_bytes(vec![0x42; 64], None);
        assert!(matches!(result, Err(AudioError::DecodeError(_))));
    }
}
