use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use ndarray::Array2;

use ndfolder_core::acquisition::{AcquisitionSource, AxisLengths, NativePlane, StagePosition};
use ndfolder_core::error::Result;
use ndfolder_core::experiment::julian::julian_day_to_ser_ticks;
use ndfolder_core::io::ser::SerHeader;
use ndfolder_core::io::ser_writer::SerWriter;
use ndfolder_core::io::LoopDescriptor;
use zip::write::SimpleFileOptions;

/// Distinct sample value for every native plane, so tests can tell which
/// plane a realized canonical plane came from.
pub fn plane_value(plane: NativePlane) -> u16 {
    (1 + plane.t * 1000 + plane.position * 100 + plane.z * 10 + plane.channel) as u16
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// In-memory acquisition filled with `plane_value` planes.
pub struct SyntheticAcquisition {
    pub name: String,
    pub channels: Vec<String>,
    pub lengths: AxisLengths,
    pub frames: usize,
    pub timestamps: Vec<Option<f64>>,
    pub positions: Vec<StagePosition>,
    pub period_ms: Option<f64>,
    pub height: usize,
    pub width: usize,
}

impl SyntheticAcquisition {
    pub fn new(name: &str, channels: &[&str], lengths: AxisLengths) -> Self {
        let frames = lengths.frame_total();
        Self {
            name: name.to_string(),
            channels: names(channels),
            lengths,
            frames,
            timestamps: vec![None; frames],
            positions: Vec::new(),
            period_ms: None,
            height: 4,
            width: 3,
        }
    }

    pub fn with_timestamps(mut self, f: impl Fn(usize) -> f64) -> Self {
        self.timestamps = (0..self.frames).map(|seq| Some(f(seq))).collect();
        self
    }

    pub fn with_positions(mut self, positions: Vec<StagePosition>) -> Self {
        self.positions = positions;
        self
    }

    pub fn with_period(mut self, period_ms: f64) -> Self {
        self.period_ms = Some(period_ms);
        self
    }

    /// Pretend the acquisition stopped after `frames` frames.
    pub fn truncated(mut self, frames: usize) -> Self {
        self.frames = frames;
        self.timestamps.truncate(frames);
        self
    }

    pub fn shared(self) -> Arc<dyn AcquisitionSource> {
        Arc::new(self)
    }
}

impl AcquisitionSource for SyntheticAcquisition {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel_names(&self) -> &[String] {
        &self.channels
    }

    fn axis_lengths(&self) -> AxisLengths {
        self.lengths
    }

    fn frame_count(&self) -> usize {
        self.frames
    }

    fn frame_timestamp(&self, seq: usize) -> Option<f64> {
        self.timestamps.get(seq).copied().flatten()
    }

    fn stage_positions(&self) -> &[StagePosition] {
        &self.positions
    }

    fn period_ms(&self) -> Option<f64> {
        self.period_ms
    }

    fn plane_shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn read_plane(&self, plane: NativePlane) -> Result<Array2<u16>> {
        Ok(Array2::from_elem(
            (self.height, self.width),
            plane_value(plane),
        ))
    }
}

/// Write `<dir>/<stem>.ser` and its loop descriptor. Planes are filled with
/// `plane_value`; `timestamp` gives the Julian day of each frame sequence
/// index.
pub fn write_ser_acquisition(
    dir: &Path,
    stem: &str,
    descriptor: &LoopDescriptor,
    height: u32,
    width: u32,
    timestamp: impl Fn(usize) -> f64,
) {
    let lengths = descriptor.loops;
    let n_channels = descriptor.channels.len();
    let planes = lengths.frame_total() * n_channels;
    let header = SerHeader::mono(width, height, 16, planes as u32);

    let path = dir.join(format!("{stem}.ser"));
    let mut writer = SerWriter::create(&path, &header).expect("create SER");
    let mut ticks = Vec::with_capacity(planes);
    for t in 0..lengths.time_extent() {
        for position in 0..lengths.position_extent() {
            for z in 0..lengths.z_extent() {
                let seq = lengths.seq_index(t, position, z);
                for channel in 0..n_channels {
                    let value = plane_value(NativePlane {
                        t,
                        position,
                        z,
                        channel,
                    });
                    let plane = Array2::from_elem((height as usize, width as usize), value);
                    writer.write_plane(&plane).expect("write plane");
                    ticks.push(julian_day_to_ser_ticks(timestamp(seq)));
                }
            }
        }
    }
    writer.write_timestamps(&ticks).expect("write timestamps");
    writer.finalize().expect("finalize");

    descriptor
        .save(&LoopDescriptor::path_for(&path))
        .expect("write descriptor");
}

/// Stage coordinates of a lanes x rows grid, listed lane by lane.
pub fn grid_positions(lanes: usize, rows: usize, pitch: f64, row_step: f64) -> Vec<StagePosition> {
    let mut positions = Vec::with_capacity(lanes * rows);
    for lane in 0..lanes {
        for row in 0..rows {
            positions.push(StagePosition::new(
                10_000.0 + lane as f64 * pitch,
                500.0 + row as f64 * row_step,
            ));
        }
    }
    positions
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Write a minimal one-sheet `.xlsx` workbook. Each row is a list of inline
/// string cells starting at column A; an empty row leaves a blank line.
pub fn write_workbook(path: &Path, rows: &[&[&str]]) {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let column = (b'A' + c as u8) as char;
            sheet.push_str(&format!(
                r#"<c r="{column}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                r + 1,
                xml_escape(value)
            ));
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let file = std::fs::File::create(path).expect("create workbook");
    let mut zip = zip::ZipWriter::new(file);
    for (name, body) in parts {
        zip.start_file(
            name,
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored),
        )
        .expect("start part");
        zip.write_all(body.as_bytes()).expect("write part");
    }
    zip.finish().expect("finish workbook");
}
