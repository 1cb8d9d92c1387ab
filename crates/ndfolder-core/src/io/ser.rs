//! SER plane container: a fixed 178-byte header, `plane_count` planes of
//! identical geometry, then an optional trailer of one u64 timestamp per
//! plane (100 ns ticks since 0001-01-01 UTC).

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{FolderError, Result};

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// Color id of monochrome data, the only layout acquisitions use.
pub const SER_COLOR_MONO: i32 = 0;

const TEXT_FIELD_LEN: usize = 40;

#[derive(Clone, Debug, PartialEq)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    /// Planes stored in the file (every channel of every frame).
    pub plane_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    pub fn mono(width: u32, height: u32, pixel_depth: u32, plane_count: u32) -> Self {
        Self {
            color_id: SER_COLOR_MONO,
            little_endian: true,
            width,
            height,
            pixel_depth,
            plane_count,
            observer: String::new(),
            instrument: String::new(),
            telescope: String::new(),
            date_time: 0,
            date_time_utc: 0,
        }
    }

    /// 1 for depths up to 8 bits, 2 otherwise.
    pub fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    pub fn plane_byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_sample()
    }

    /// Offset of the timestamp trailer.
    pub fn trailer_offset(&self) -> usize {
        SER_HEADER_SIZE + self.plane_byte_size() * self.plane_count as usize
    }

    fn checked_trailer_offset(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_sample())?
            .checked_mul(self.plane_count as usize)?
            .checked_add(SER_HEADER_SIZE)
    }

    /// Rejects non-positive frame sizes, depths outside 1..=16 and geometry
    /// whose byte size does not fit in `usize`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < SER_HEADER_SIZE {
            return Err(FolderError::InvalidSer(format!(
                "{} bytes is too short for a header",
                buf.len()
            )));
        }
        if &buf[..SER_MAGIC.len()] != SER_MAGIC {
            return Err(FolderError::InvalidSer("bad magic".into()));
        }

        let mut cursor = Cursor::new(&buf[SER_MAGIC.len()..SER_HEADER_SIZE]);
        let _lu_id = cursor.read_i32::<LittleEndian>()?;
        let color_id = cursor.read_i32::<LittleEndian>()?;
        // Siril convention: 0 means little-endian samples.
        let little_endian = cursor.read_i32::<LittleEndian>()? != 1;
        let raw_width = cursor.read_i32::<LittleEndian>()?;
        let raw_height = cursor.read_i32::<LittleEndian>()?;
        let raw_depth = cursor.read_i32::<LittleEndian>()?;
        let raw_count = cursor.read_i32::<LittleEndian>()?;
        let observer = read_text(&mut cursor)?;
        let instrument = read_text(&mut cursor)?;
        let telescope = read_text(&mut cursor)?;
        let date_time = cursor.read_u64::<LittleEndian>()?;
        let date_time_utc = cursor.read_u64::<LittleEndian>()?;

        let (width, height) = match (positive(raw_width), positive(raw_height)) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(FolderError::InvalidSer(format!(
                    "frame size {raw_width}x{raw_height}"
                )))
            }
        };
        if !(1..=16).contains(&raw_depth) {
            return Err(FolderError::InvalidSer(format!("pixel depth {raw_depth}")));
        }
        let plane_count = u32::try_from(raw_count)
            .map_err(|_| FolderError::InvalidSer(format!("plane count {raw_count}")))?;

        let header = Self {
            color_id,
            little_endian,
            width,
            height,
            pixel_depth: raw_depth as u32,
            plane_count,
            observer,
            instrument,
            telescope,
            date_time,
            date_time_utc,
        };
        if header.checked_trailer_offset().is_none() {
            return Err(FolderError::InvalidSer(format!(
                "{plane_count} planes of {width}x{height} overflow the address space"
            )));
        }
        Ok(header)
    }

    pub fn write_to(&self, w: &mut impl Write) -> Result<()> {
        w.write_all(SER_MAGIC)?;
        w.write_i32::<LittleEndian>(0)?;
        w.write_i32::<LittleEndian>(self.color_id)?;
        w.write_i32::<LittleEndian>(if self.little_endian { 0 } else { 1 })?;
        w.write_i32::<LittleEndian>(self.width as i32)?;
        w.write_i32::<LittleEndian>(self.height as i32)?;
        w.write_i32::<LittleEndian>(self.pixel_depth as i32)?;
        w.write_i32::<LittleEndian>(self.plane_count as i32)?;
        write_text(w, &self.observer)?;
        write_text(w, &self.instrument)?;
        write_text(w, &self.telescope)?;
        w.write_u64::<LittleEndian>(self.date_time)?;
        w.write_u64::<LittleEndian>(self.date_time_utc)?;
        Ok(())
    }
}

fn positive(value: i32) -> Option<u32> {
    u32::try_from(value).ok().filter(|&v| v > 0)
}

fn read_text(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let mut field = [0u8; TEXT_FIELD_LEN];
    cursor.read_exact(&mut field)?;
    Ok(String::from_utf8_lossy(&field)
        .trim_end_matches('\0')
        .trim()
        .to_string())
}

fn write_text(w: &mut impl Write, text: &str) -> Result<()> {
    let mut field = [0u8; TEXT_FIELD_LEN];
    let len = text.len().min(TEXT_FIELD_LEN);
    field[..len].copy_from_slice(&text.as_bytes()[..len]);
    w.write_all(&field)?;
    Ok(())
}

/// Memory-mapped monochrome SER file.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
}

impl SerReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let header = SerHeader::parse(&mmap)?;

        if header.color_id != SER_COLOR_MONO {
            return Err(FolderError::InvalidSer(format!(
                "color id {} is not monochrome",
                header.color_id
            )));
        }
        if mmap.len() < header.trailer_offset() {
            return Err(FolderError::InvalidSer(format!(
                "{} planes need {} bytes, file has {}",
                header.plane_count,
                header.trailer_offset(),
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    pub fn plane_count(&self) -> usize {
        self.header.plane_count as usize
    }

    /// Raw bytes of one plane, borrowed from the mapping.
    pub fn plane_bytes(&self, index: usize) -> Result<&[u8]> {
        let total = self.plane_count();
        if index >= total {
            return Err(FolderError::FrameIndexOutOfRange { index, total });
        }
        let size = self.header.plane_byte_size();
        let offset = SER_HEADER_SIZE + index * size;
        Ok(&self.mmap[offset..offset + size])
    }

    pub fn read_plane(&self, index: usize) -> Result<Array2<u16>> {
        let raw = self.plane_bytes(index)?;
        let shape = (self.header.height as usize, self.header.width as usize);
        let mut samples = vec![0u16; shape.0 * shape.1];

        if self.header.bytes_per_sample() == 1 {
            for (dst, &b) in samples.iter_mut().zip(raw) {
                *dst = b as u16;
            }
        } else if self.header.little_endian {
            Cursor::new(raw).read_u16_into::<LittleEndian>(&mut samples)?;
        } else {
            Cursor::new(raw).read_u16_into::<BigEndian>(&mut samples)?;
        }
        Ok(Array2::from_shape_vec(shape, samples)?)
    }

    /// Trailer timestamp of a plane in 100 ns ticks. `None` when the file has
    /// no trailer or the writer left the entry at zero.
    pub fn plane_ticks(&self, index: usize) -> Option<u64> {
        if index >= self.plane_count() {
            return None;
        }
        let offset = self.header.trailer_offset() + index * 8;
        let mut entry = self.mmap.get(offset..offset + 8)?;
        let ticks = entry.read_u64::<LittleEndian>().ok()?;
        (ticks != 0).then_some(ticks)
    }
}
