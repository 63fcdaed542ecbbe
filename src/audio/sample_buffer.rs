use std::path::Path;
use super::frame::StereoFrame;

#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    // Load a WAV file from disk into the sample buffer, resampled to the
    // device rate so playback position maps 1:1 onto output frames.
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let file_rate = spec.sample_rate;
        let file_channels = spec.channels as usize;
        if file_channels == 0 {
            anyhow::bail!("WAV has zero channels: {}", path.display());
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader // float, just pass it through
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => { // int, scale down to [-1, 1]
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let mut frames: Vec<StereoFrame> = if file_channels == 1 {
            samples
                .into_iter()
                .map(|x| StereoFrame { left: x, right: x }) // mono, duplicate
                .collect()
        } else {
            // stereo or more; keep the front pair and drop the rest
            samples
                .chunks_exact(file_channels)
                .map(|c| StereoFrame {
                    left: c[0],
                    right: c[1],
                })
                .collect()
        };

        if file_rate != target_rate {
            frames = resample_linear(&frames, file_rate, target_rate);
        }

        Ok(Self { data: frames })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    // plain linear resampler; fine for one-shot hits
    if source_rate == target_rate {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as f32;
        if idx >= frames.len().saturating_sub(1) {
            out.push(*frames.last().unwrap_or(&StereoFrame::zero()));
        } else {
            let a = frames[idx];
            let b = frames[idx + 1];
            out.push(StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_identity_rate() {
        let frames = vec![
            StereoFrame { left: 0.5, right: -0.5 },
            StereoFrame { left: 1.0, right: -1.0 },
        ];
        let out = resample_linear(&frames, 44100, 44100);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].left, 1.0);
    }

    #[test]
    fn test_resample_doubles_length_at_double_rate() {
        let frames = vec![
            StereoFrame { left: 0.0, right: 0.0 },
            StereoFrame { left: 1.0, right: 1.0 },
        ];
        let out = resample_linear(&frames, 22050, 44100);
        assert_eq!(out.len(), 4);
        // midpoint between the two source frames is interpolated
        assert!((out[1].left - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_resample_empty_input() {
        let out = resample_linear(&[], 22050, 44100);
        assert!(out.is_empty());
    }
}
