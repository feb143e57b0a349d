//! WAV helpers

use std::path::Path;

use crate::{Error, Result};

/// Duration of a WAV file in whole milliseconds, rounded to nearest
///
/// # Errors
///
/// Returns error if the file cannot be opened or is not a valid WAV
pub fn wav_duration_ms(path: &Path) -> Result<u64> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| Error::Audio(format!("failed to read {}: {e}", path.display())))?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return Err(Error::Audio(format!("{} has zero sample rate", path.display())));
    }

    // `duration()` counts frames (samples per channel)
    let frames = reader.duration();
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let millis = (f64::from(frames) / f64::from(sample_rate) * 1000.0).round() as u64;
    Ok(millis)
}

/// Convert f32 samples to mono 16-bit WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
