use std::io::Write;

use ndarray::Array2;
use tempfile::NamedTempFile;

use ndfolder_core::acquisition::{AcquisitionSource, AxisLengths, NativePlane, StagePosition};
use ndfolder_core::error::FolderError;
use ndfolder_core::io::ser::{SerHeader, SerReader, SER_HEADER_SIZE};
use ndfolder_core::io::ser_writer::SerWriter;
use ndfolder_core::io::{LoopDescriptor, SerAcquisition};

#[allow(dead_code)]
mod common;

/// Build a minimal synthetic SER file in memory.
fn build_synthetic_ser(
    color_id: i32,
    width: u32,
    height: u32,
    bit_depth: u32,
    frames: &[Vec<u8>],
) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(b"LUCAM-RECORDER");
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&color_id.to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(frames.len() as i32).to_le_bytes());
    let mut observer = [0u8; 40];
    observer[..3].copy_from_slice(b"Lab");
    buf.extend_from_slice(&observer);
    buf.extend_from_slice(&[0u8; 40]);
    buf.extend_from_slice(&[0u8; 40]);
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);

    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

fn temp_ser(bytes: &[u8]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(bytes).unwrap();
    tmp.flush().unwrap();
    tmp
}

#[test]
fn test_parse_16bit_mono() {
    let frame: Vec<u8> = [1u16, 2, 300, 65535]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let tmp = temp_ser(&build_synthetic_ser(0, 2, 2, 16, &[frame]));

    let reader = SerReader::open(tmp.path()).unwrap();
    assert_eq!(reader.plane_count(), 1);
    assert_eq!(reader.header.observer, "Lab");
    assert_eq!(reader.header.bytes_per_sample(), 2);

    let plane = reader.read_plane(0).unwrap();
    assert_eq!(plane.dim(), (2, 2));
    assert_eq!(plane[[0, 0]], 1);
    assert_eq!(plane[[0, 1]], 2);
    assert_eq!(plane[[1, 0]], 300);
    assert_eq!(plane[[1, 1]], 65535);
}

#[test]
fn test_parse_8bit_mono() {
    let tmp = temp_ser(&build_synthetic_ser(0, 3, 1, 8, &[vec![0, 128, 255]]));
    let reader = SerReader::open(tmp.path()).unwrap();
    let plane = reader.read_plane(0).unwrap();
    assert_eq!(plane.as_slice().unwrap(), &[0, 128, 255]);
}

#[test]
fn test_rejects_color_data() {
    let tmp = temp_ser(&build_synthetic_ser(100, 2, 2, 8, &[vec![0; 4]]));
    assert!(matches!(
        SerReader::open(tmp.path()),
        Err(FolderError::InvalidSer(_))
    ));
}

#[test]
fn test_rejects_truncated_file() {
    let mut bytes = build_synthetic_ser(0, 4, 4, 16, &[vec![0; 32], vec![0; 32]]);
    bytes.truncate(bytes.len() - 10);
    let tmp = temp_ser(&bytes);
    assert!(matches!(
        SerReader::open(tmp.path()),
        Err(FolderError::InvalidSer(_))
    ));
}

#[test]
fn test_rejects_bad_magic() {
    let mut bytes = build_synthetic_ser(0, 2, 2, 8, &[vec![0; 4]]);
    bytes[0] = b'X';
    let tmp = temp_ser(&bytes);
    assert!(SerReader::open(tmp.path()).is_err());
}

#[test]
fn test_frame_index_out_of_range() {
    let tmp = temp_ser(&build_synthetic_ser(0, 2, 2, 8, &[vec![0; 4]]));
    let reader = SerReader::open(tmp.path()).unwrap();
    assert!(matches!(
        reader.read_plane(1),
        Err(FolderError::FrameIndexOutOfRange { index: 1, total: 1 })
    ));
}

#[test]
fn test_missing_trailer_has_no_timestamps() {
    let tmp = temp_ser(&build_synthetic_ser(0, 2, 2, 8, &[vec![0; 4]]));
    let reader = SerReader::open(tmp.path()).unwrap();
    assert_eq!(reader.plane_ticks(0), None);
}

#[test]
fn test_writer_roundtrip_with_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ser");
    let header = SerHeader::mono(3, 2, 16, 2);

    let mut writer = SerWriter::create(&path, &header).unwrap();
    writer
        .write_plane(&Array2::from_shape_vec((2, 3), vec![1, 2, 3, 4, 5, 6]).unwrap())
        .unwrap();
    writer.write_plane(&Array2::from_elem((2, 3), 7)).unwrap();
    assert_eq!(writer.planes_written(), 2);
    writer.write_timestamps(&[42, 0]).unwrap();
    writer.finalize().unwrap();

    let reader = SerReader::open(&path).unwrap();
    assert_eq!(reader.plane_count(), 2);
    assert_eq!(reader.read_plane(0).unwrap()[[1, 2]], 6);
    assert_eq!(reader.read_plane(1).unwrap()[[0, 0]], 7);
    assert_eq!(reader.plane_ticks(0), Some(42));
    assert_eq!(reader.plane_ticks(1), None, "zero ticks mean unset");
}

#[test]
fn test_writer_rejects_wrong_plane_size() {
    let dir = tempfile::tempdir().unwrap();
    let header = SerHeader::mono(3, 2, 16, 1);
    let mut writer = SerWriter::create(&dir.path().join("bad.ser"), &header).unwrap();
    assert!(writer.write_plane(&Array2::zeros((3, 3))).is_err());
    assert!(writer.write_raw_plane(&[0u8; 5]).is_err());
}

#[test]
fn test_acquisition_reads_descriptor_layout() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = LoopDescriptor {
        channels: common::names(&["DAPI", "GFP"]),
        loops: AxisLengths::new(2, 3, 0),
        period_ms: Some(60_000.0),
        stage_positions: vec![
            StagePosition::new(0.0, 0.0),
            StagePosition::new(3000.0, 0.0),
            StagePosition::new(6000.0, 0.0),
        ],
    };
    common::write_ser_acquisition(dir.path(), "run", &descriptor, 4, 5, |seq| {
        2_460_371.0 + seq as f64 / 1440.0
    });

    let acq = SerAcquisition::open(&dir.path().join("run.ser")).unwrap();
    assert_eq!(acq.name(), "run.ser");
    assert_eq!(acq.channel_names(), &["DAPI".to_string(), "GFP".to_string()]);
    assert_eq!(acq.axis_lengths(), AxisLengths::new(2, 3, 0));
    assert_eq!(acq.frame_count(), 6);
    assert_eq!(acq.plane_shape(), (4, 5));
    assert_eq!(acq.period_ms(), Some(60_000.0));
    assert_eq!(acq.stage_positions().len(), 3);

    let plane = NativePlane {
        t: 1,
        position: 2,
        z: 0,
        channel: 1,
    };
    let data = acq.read_plane(plane).unwrap();
    assert!(data.iter().all(|&v| v == common::plane_value(plane)));

    let ts = acq.frame_timestamp(4).unwrap();
    approx::assert_abs_diff_eq!(ts, 2_460_371.0 + 4.0 / 1440.0, epsilon = 1e-6);
}

#[test]
fn test_acquisition_without_descriptor_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lonely.ser");
    std::fs::write(&path, build_synthetic_ser(0, 2, 2, 8, &[vec![0; 4]])).unwrap();
    assert!(SerAcquisition::open(&path).is_err());
}

#[test]
fn test_descriptor_requires_channels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.loops.toml");
    std::fs::write(&path, "channels = []\n").unwrap();
    assert!(matches!(
        LoopDescriptor::load(&path),
        Err(FolderError::InvalidDescriptor { .. })
    ));
}

#[test]
fn test_descriptor_path_for() {
    let path = LoopDescriptor::path_for(std::path::Path::new("/data/run_01.ser"));
    assert_eq!(path, std::path::Path::new("/data/run_01.loops.toml"));
}

#[test]
fn test_acquisition_unrecorded_planes_read_zero() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = LoopDescriptor {
        channels: common::names(&["GFP"]),
        loops: AxisLengths::new(3, 0, 0),
        period_ms: None,
        stage_positions: Vec::new(),
    };
    // Only the first timepoint was recorded.
    let path = dir.path().join("cut.ser");
    let header = SerHeader::mono(2, 2, 16, 1);
    let mut writer = SerWriter::create(&path, &header).unwrap();
    writer.write_plane(&Array2::from_elem((2, 2), 9)).unwrap();
    writer.finalize().unwrap();
    descriptor.save(&LoopDescriptor::path_for(&path)).unwrap();

    let acq = SerAcquisition::open(&path).unwrap();
    assert_eq!(acq.frame_count(), 1);
    let missing = acq
        .read_plane(NativePlane {
            t: 2,
            position: 0,
            z: 0,
            channel: 0,
        })
        .unwrap();
    assert!(missing.iter().all(|&v| v == 0));
}

#[test]
fn test_header_write_parse_roundtrip() {
    let mut header = SerHeader::mono(640, 480, 12, 30);
    header.observer = "scope-1".into();
    header.little_endian = false;
    header.date_time_utc = 638_000_000_000_000_000;

    let mut bytes = Vec::new();
    header.write_to(&mut bytes).unwrap();
    assert_eq!(bytes.len(), SER_HEADER_SIZE);
    assert_eq!(SerHeader::parse(&bytes).unwrap(), header);
    assert_eq!(header.plane_byte_size(), 640 * 480 * 2);
}

/// Overwrite the little-endian i32 header field at `offset`.
fn patch_i32(bytes: &mut [u8], offset: usize, value: i32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn test_rejects_negative_frame_size() {
    let mut bytes = build_synthetic_ser(0, 2, 2, 8, &[vec![0; 4]]);
    patch_i32(&mut bytes, 26, -1);
    patch_i32(&mut bytes, 30, -1);
    let tmp = temp_ser(&bytes);
    assert!(matches!(
        SerReader::open(tmp.path()),
        Err(FolderError::InvalidSer(_))
    ));
    assert!(SerHeader::parse(&bytes).is_err());
}

#[test]
fn test_rejects_bad_depth_and_plane_count() {
    let mut bytes = build_synthetic_ser(0, 2, 2, 8, &[vec![0; 4]]);
    patch_i32(&mut bytes, 34, 0);
    assert!(matches!(
        SerHeader::parse(&bytes),
        Err(FolderError::InvalidSer(_))
    ));

    let mut bytes = build_synthetic_ser(0, 2, 2, 8, &[vec![0; 4]]);
    patch_i32(&mut bytes, 38, -5);
    assert!(matches!(
        SerHeader::parse(&bytes),
        Err(FolderError::InvalidSer(_))
    ));
}

#[test]
fn test_rejects_geometry_overflowing_address_space() {
    let mut bytes = build_synthetic_ser(0, 2, 2, 16, &[vec![0; 8]]);
    patch_i32(&mut bytes, 26, i32::MAX);
    patch_i32(&mut bytes, 30, i32::MAX);
    patch_i32(&mut bytes, 38, i32::MAX);
    let tmp = temp_ser(&bytes);
    assert!(matches!(
        SerReader::open(tmp.path()),
        Err(FolderError::InvalidSer(_))
    ));
}
