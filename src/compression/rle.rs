use super::*;
use crate::io::{take_1, take_n};

// modified run length encoding:
// runs are introduced by an escape byte, followed by the run length and the repeated value.
// the escape byte itself never appears literally, so a single zero becomes a run of length one.

/// Marks the start of a run in the compressed data.
pub const ESCAPE : u8 = 0;

const MIN_RUN_LENGTH : usize = 2;
const MAX_RUN_LENGTH : usize = u8::MAX as usize;


/// Expand all runs. `expected_byte_size` is only used to pre-allocate memory.
/// Returns `Error::TruncatedStream` if the data ends inside of a run.
pub fn decompress_bytes(mut remaining: Bytes<'_>, expected_byte_size: usize) -> Result<ByteVec> {
    let mut decompressed = Vec::with_capacity(expected_byte_size.min(8*2048));

    while !remaining.is_empty() {
        let byte = take_1(&mut remaining)?;

        if byte == ESCAPE {
            let run = take_n(&mut remaining, 2)
                .map_err(|_| Error::truncated("run length encoding ends inside of a run"))?;

            let (count, value) = (run[0] as usize, run[1]);
            decompressed.resize(decompressed.len() + count, value);
        }
        else {
            decompressed.push(byte);
        }
    }

    Ok(decompressed)
}

/// Replace repeated bytes and all escape bytes by runs.
/// Always takes the longest run starting at the current byte,
/// so the output only depends on the input.
pub fn compress_bytes(data: Bytes<'_>) -> ByteVec {
    let mut compressed = Vec::with_capacity(data.len());
    let mut run_start = 0;

    while run_start < data.len() {
        let value = data[run_start];
        let mut run_end = run_start + 1;

        while run_end < data.len() && data[run_end] == value && run_end - run_start < MAX_RUN_LENGTH {
            run_end += 1;
        }

        let run_length = run_end - run_start;

        if run_length >= MIN_RUN_LENGTH || value == ESCAPE {
            compressed.extend_from_slice(&[ESCAPE, run_length as u8, value]);
        }
        else {
            compressed.push(value);
        }

        run_start = run_end;
    }

    compressed
}
