use super::{AudioData, AudioError};

/// A decoded, planar audio buffer.
///
/// Every channel holds exactly [`length`](DecodedAudio::length) samples.
pub trait DecodedAudio: Send + Sync {
    fn number_of_channels(&self) -> usize;

    /// Samples per channel.
    fn length(&self) -> usize;

    fn sample_rate(&self) -> u32;

    /// Duration in seconds.
    fn duration(&self) -> f64 {
        if self.sample_rate() == 0 {
            return 0.0;
        }
        self.length() as f64 / self.sample_rate() as f64
    }

    /// Samples of `channel`; empty when the channel does not exist.
    fn channel_data(&self, channel: usize) -> &[f32];
}

/// Owned planar samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl PlanarBuffer {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::UnknownSampleRate);
        }
        let expected = channels.first().ok_or(AudioError::NoChannels)?.len();
        if expected == 0 {
            return Err(AudioError::EmptyBuffer);
        }
        if let Some((channel, data)) = channels
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != expected)
        {
            return Err(AudioError::ChannelLengthMismatch {
                channel,
                expected,
                found: data.len(),
            });
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AudioError> {
        Self::new(vec![samples], sample_rate)
    }
}

impl DecodedAudio for PlanarBuffer {
    fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    fn length(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channel_data(&self, channel: usize) -> &[f32] {
        self.channels.get(channel).map_or(&[], Vec::as_slice)
    }
}

impl TryFrom<&AudioData> for PlanarBuffer {
    type Error = AudioError;

    /// De-interleave loader output. A trailing partial frame is dropped.
    fn try_from(audio: &AudioData) -> Result<Self, Self::Error> {
        if audio.channels == 0 {
            return Err(AudioError::NoChannels);
        }
        let frames = audio.num_frames();
        let mut channels = vec![Vec::with_capacity(frames); audio.channels];
        for frame in audio.samples.chunks_exact(audio.channels) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(channels, audio.sample_rate)
    }
}
