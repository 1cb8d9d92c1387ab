use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use ndarray::Array2;

use crate::error::{FolderError, Result};

use super::ser::SerHeader;

/// Streams planes into a new SER file. The trailer is optional and, when
/// written, must follow the last plane.
pub struct SerWriter {
    out: BufWriter<File>,
    header: SerHeader,
    planes_written: u32,
}

impl SerWriter {
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        header.write_to(&mut out)?;
        Ok(Self {
            out,
            header: header.clone(),
            planes_written: 0,
        })
    }

    /// Append already encoded plane bytes.
    pub fn write_raw_plane(&mut self, data: &[u8]) -> Result<()> {
        let expected = self.header.plane_byte_size();
        if data.len() != expected {
            return Err(FolderError::InvalidSer(format!(
                "plane has {} bytes, header geometry needs {expected}",
                data.len()
            )));
        }
        self.out.write_all(data)?;
        self.planes_written += 1;
        Ok(())
    }

    /// Encode a plane in the header's sample width and byte order.
    pub fn write_plane(&mut self, plane: &Array2<u16>) -> Result<()> {
        let (height, width) = plane.dim();
        if (height, width) != (self.header.height as usize, self.header.width as usize) {
            return Err(FolderError::PlaneShapeMismatch {
                expected: (self.header.height as usize, self.header.width as usize),
                actual: (height, width),
            });
        }

        let mut bytes = Vec::with_capacity(self.header.plane_byte_size());
        for &v in plane.iter() {
            match (self.header.bytes_per_sample(), self.header.little_endian) {
                (1, _) => bytes.push(v.min(u8::MAX as u16) as u8),
                (_, true) => bytes.write_u16::<LittleEndian>(v)?,
                (_, false) => bytes.write_u16::<BigEndian>(v)?,
            }
        }
        self.write_raw_plane(&bytes)
    }

    pub fn planes_written(&self) -> u32 {
        self.planes_written
    }

    /// One tick count per plane, 0 for unknown.
    pub fn write_timestamps(&mut self, ticks: &[u64]) -> Result<()> {
        for &t in ticks {
            self.out.write_u64::<LittleEndian>(t)?;
        }
        Ok(())
    }

    pub fn finalize(mut self) -> Result<()> {
        if self.planes_written != self.header.plane_count {
            return Err(FolderError::InvalidSer(format!(
                "wrote {} planes, header declares {}",
                self.planes_written, self.header.plane_count
            )));
        }
        self.out.flush()?;
        Ok(())
    }
}
