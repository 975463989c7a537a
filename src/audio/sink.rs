//! Opening audio files into paused `rodio` sinks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{Error, Result};

/// A paused `Sink` positioned at `start_at`, plus the decoder's idea of
/// the track length.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>)> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| Error::Audio(format!("cannot decode {}: {e}", path.display())))?;
    let total = decoder.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    // `skip_duration` is the seeking primitive; Duration::ZERO is a no-op.
    sink.append(decoder.skip_duration(start_at));
    Ok((sink, total))
}
