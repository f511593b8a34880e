//! Tab-separated text frame format: one line per frame, `num_traj` fields.

use std::io::{BufRead, Write};

use super::{FrameReader, FrameWriter};

pub struct TsvReader<R> {
    reader: R,
    num_traj: usize,
    line: String,
}

impl<R: BufRead> TsvReader<R> {
    pub fn new(reader: R, num_traj: usize) -> Self {
        TsvReader { reader, num_traj, line: String::new() }
    }
}

impl<R: BufRead> FrameReader for TsvReader<R> {
    fn read_frame(&mut self, out: &mut [f64]) -> anyhow::Result<bool> {
        anyhow::ensure!(out.len() == self.num_traj, "frame buffer length does not match num_traj");

        self.line.clear();
        let n = self.reader.read_line(&mut self.line)?;
        if n == 0 {
            return Ok(false);
        }

        let mut fields = self.line.trim_end_matches(['\n', '\r']).split('\t');
        for (i, slot) in out.iter_mut().enumerate() {
            let field = fields
                .next()
                .ok_or_else(|| anyhow::anyhow!("line {i} short: expected {} fields", self.num_traj))?;
            *slot = field.parse::<f64>()?;
        }
        anyhow::ensure!(fields.next().is_none(), "line has more than {} fields", self.num_traj);
        Ok(true)
    }
}

pub struct TsvWriter<W> {
    writer: W,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(writer: W) -> Self {
        TsvWriter { writer }
    }
}

impl<W: Write> FrameWriter for TsvWriter<W> {
    fn write_frame(&mut self, values: &[f64]) -> anyhow::Result<()> {
        for (i, x) in values.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b"\t")?;
            }
            write!(self.writer, "{x}")?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_handful_of_frames() {
        let mut bytes = Vec::new();
        {
            let mut writer = TsvWriter::new(&mut bytes);
            writer.write_frame(&[1.0, -2.5, 3.25]).unwrap();
            writer.write_frame(&[0.0, 0.0, 0.0]).unwrap();
        }

        let mut reader = TsvReader::new(Cursor::new(bytes), 3);
        let mut out = [0.0; 3];
        assert!(reader.read_frame(&mut out).unwrap());
        assert_eq!(out, [1.0, -2.5, 3.25]);
        assert!(reader.read_frame(&mut out).unwrap());
        assert_eq!(out, [0.0, 0.0, 0.0]);
        assert!(!reader.read_frame(&mut out).unwrap());
    }

    #[test]
    fn rejects_a_short_line() {
        let mut reader = TsvReader::new(Cursor::new(b"1.0\t2.0\n".to_vec()), 3);
        let mut out = [0.0; 3];
        assert!(reader.read_frame(&mut out).is_err());
    }
}
