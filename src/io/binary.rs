//! Fixed-width binary frame format: `num_traj` little-endian `f64` values
//! per frame, with an optional number of trailing bytes skipped after each
//! frame (some trajectory dumps interleave a velocity record of the same
//! width right after the position record; this lets a caller ignore it
//! without having to parse it).

use std::io::{Read, Write};

use super::{FrameReader, FrameWriter};

pub struct BinaryReader<R> {
    reader: R,
    num_traj: usize,
    skip_bytes: usize,
    scratch: Vec<u8>,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(reader: R, num_traj: usize, skip_bytes: usize) -> Self {
        BinaryReader { reader, num_traj, skip_bytes, scratch: vec![0u8; skip_bytes] }
    }
}

impl<R: Read> FrameReader for BinaryReader<R> {
    fn read_frame(&mut self, out: &mut [f64]) -> anyhow::Result<bool> {
        anyhow::ensure!(out.len() == self.num_traj, "frame buffer length does not match num_traj");

        let mut bytes = vec![0u8; self.num_traj * 8];
        let mut filled = 0;
        while filled < bytes.len() {
            let n = self.reader.read(&mut bytes[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(false);
                }
                anyhow::bail!("truncated frame: got {filled} of {} bytes", bytes.len());
            }
            filled += n;
        }
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            out[i] = f64::from_le_bytes(chunk.try_into().unwrap());
        }

        if self.skip_bytes > 0 {
            let _ = self.reader.read(&mut self.scratch);
        }
        Ok(true)
    }
}

pub struct BinaryWriter<W> {
    writer: W,
    num_traj: usize,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(writer: W, num_traj: usize) -> Self {
        BinaryWriter { writer, num_traj }
    }
}

impl<W: Write> FrameWriter for BinaryWriter<W> {
    fn write_frame(&mut self, values: &[f64]) -> anyhow::Result<()> {
        anyhow::ensure!(values.len() == self.num_traj, "frame length does not match num_traj");
        for &x in values {
            self.writer.write_all(&x.to_le_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_handful_of_frames() {
        let mut bytes = Vec::new();
        {
            let mut writer = BinaryWriter::new(&mut bytes, 3);
            writer.write_frame(&[1.0, -2.5, 3.25]).unwrap();
            writer.write_frame(&[0.0, 0.0, 0.0]).unwrap();
        }

        let mut reader = BinaryReader::new(bytes.as_slice(), 3, 0);
        let mut out = [0.0; 3];
        assert!(reader.read_frame(&mut out).unwrap());
        assert_eq!(out, [1.0, -2.5, 3.25]);
        assert!(reader.read_frame(&mut out).unwrap());
        assert_eq!(out, [0.0, 0.0, 0.0]);
        assert!(!reader.read_frame(&mut out).unwrap());
    }

    #[test]
    fn truncated_frame_is_an_error() {
        let bytes = vec![0u8; 10];
        let mut reader = BinaryReader::new(bytes.as_slice(), 3, 0);
        let mut out = [0.0; 3];
        assert!(reader.read_frame(&mut out).is_err());
    }
}
