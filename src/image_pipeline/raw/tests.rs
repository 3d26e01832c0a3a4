use crate::image_pipeline::common::error::{FormatError, IspError};
use crate::image_pipeline::raw::{
    decode, encode_packed10, encode_plain8, BayerGrid, CfaColor, CfaPattern, FrameGeometry,
    LowBitOrder, PixelFormat, RawFrameReader, SensorDumpReader,
};

fn ramp(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 37 % 256) as u8).collect()
}

#[test]
fn plain8_write_back_is_identity() {
    for (width, height) in [(1, 1), (4, 4), (7, 3), (64, 48)] {
        let bytes = ramp(width * height);
        let grid = decode(&bytes, width, height, PixelFormat::Plain8, None, CfaPattern::rggb()).unwrap();
        assert_eq!(grid.samples.len(), width * height);
        assert_eq!(grid.bit_depth, 8);
        assert_eq!(encode_plain8(&grid).unwrap(), bytes);
    }
}

#[test]
fn plain8_skips_row_padding() {
    let bytes = [1, 2, 0xFF, 3, 4, 0xFF];
    let grid = decode(&bytes, 2, 2, PixelFormat::Plain8, Some(3), CfaPattern::rggb()).unwrap();
    assert_eq!(grid.samples, vec![1, 2, 3, 4]);
}

#[test]
fn undersized_buffer_is_a_format_error() {
    let bytes = ramp(15);
    let err = decode(&bytes, 4, 4, PixelFormat::Plain8, None, CfaPattern::rggb()).unwrap_err();
    assert!(matches!(
        err,
        IspError::Format(FormatError::BufferTooSmall { expected: 16, actual: 15, .. })
    ));
}

#[test]
fn overflowing_stride_is_a_format_error() {
    let bytes = [0u8; 64];
    let err = decode(&bytes, 4, 2, PixelFormat::Plain8, Some(usize::MAX / 2 + 1), CfaPattern::rggb()).unwrap_err();
    assert!(matches!(
        err,
        IspError::Format(FormatError::InvalidGeometry { width: 4, height: 2 })
    ));
}

#[test]
fn plain8_write_back_refuses_ten_bit_grids() {
    let grid = BayerGrid {
        width: 2,
        height: 2,
        samples: vec![1023, 0, 512, 4],
        bit_depth: 10,
        cfa: CfaPattern::rggb(),
    };
    let err = encode_plain8(&grid).unwrap_err();
    assert!(matches!(
        err,
        IspError::Format(FormatError::BitDepthMismatch {
            format: PixelFormat::Plain8,
            expected: 8,
            actual: 10,
        })
    ));
}

#[test]
fn packed10_reassembles_high_and_low_bits() {
    // Samples 0x3FF, 0x000, 0x155, 0x2AA: low pairs 11, 00, 01, 10.
    let bytes = [0xFF, 0x00, 0x55, 0xAA, 0b10_01_00_11];
    let grid = decode(&bytes, 4, 1, PixelFormat::Packed10Csi2, None, CfaPattern::rggb()).unwrap();
    assert_eq!(grid.samples, vec![0x3FF, 0x000, 0x155, 0x2AA]);
    assert_eq!(grid.bit_depth, 10);
    assert_eq!(grid.max_value(), 1023);
}

#[test]
fn packed10_msb_first_low_bits() {
    let bytes = [0xFF, 0x00, 0x55, 0xAA, 0b11_00_01_10];
    let frame = crate::image_pipeline::raw::RawFrame::new(&bytes, 4, 1, PixelFormat::Packed10Csi2, None).unwrap();
    let grid = crate::image_pipeline::raw::RawDecoder::new(CfaPattern::rggb())
        .with_low_bit_order(LowBitOrder::MsbFirst)
        .decode(&frame)
        .unwrap();
    assert_eq!(grid.samples, vec![0x3FF, 0x000, 0x155, 0x2AA]);
}

#[test]
fn packed10_consumes_exactly_stride_bytes_per_row() {
    let stride = 8;
    let mut bytes = vec![
        0x10, 0x20, 0x30, 0x40, 0b00_00_00_00, 0xEE, 0xEE, 0xEE, // row 0 + 3 pad bytes
        0x01, 0x02, 0x03, 0x04, 0b11_11_11_11, 0xEE, 0xEE, 0xEE, // row 1 + 3 pad bytes
    ];
    let grid = decode(&bytes, 4, 2, PixelFormat::Packed10Csi2, Some(stride), CfaPattern::bggr()).unwrap();
    assert_eq!(grid.width, 4);
    assert_eq!(grid.samples[..4], [0x40, 0x80, 0xC0, 0x100]);
    assert_eq!(grid.samples[4..], [0x07, 0x0B, 0x0F, 0x13]);

    for pad in [0, 5, 6, 7, 13, 14, 15] {
        bytes[pad] ^= 0x5A;
    }
    let corrupted = decode(&bytes, 4, 2, PixelFormat::Packed10Csi2, Some(stride), CfaPattern::bggr()).unwrap();
    assert_eq!(corrupted.samples[4..], grid.samples[4..]);
    // Byte 0 is pixel data, so only that sample may move.
    assert_eq!(corrupted.samples[1..4], grid.samples[1..4]);
}

#[test]
fn packed10_padding_never_reaches_pixels() {
    let grid = BayerGrid {
        width: 6,
        height: 3,
        samples: (0..18).map(|i| (i * 61 % 1024) as u16).collect(),
        bit_depth: 10,
        cfa: CfaPattern::grbg(),
    };
    let stride = 16;
    let clean = encode_packed10(&grid, stride, LowBitOrder::LsbFirst, 0x00).unwrap();
    let noisy = encode_packed10(&grid, stride, LowBitOrder::LsbFirst, 0xA5).unwrap();
    assert_eq!(clean.len(), stride * 3);
    assert_ne!(clean, noisy);

    for bytes in [clean, noisy] {
        let decoded = decode(&bytes, 6, 3, PixelFormat::Packed10Csi2, Some(stride), CfaPattern::grbg()).unwrap();
        assert_eq!(decoded, grid);
    }
}

#[test]
fn decoded_grid_carries_cfa_phase() {
    let bytes = ramp(16);
    let grid = decode(&bytes, 4, 4, PixelFormat::Plain8, None, CfaPattern::from_indices([2, 1, 1, 0]).unwrap()).unwrap();
    assert_eq!(grid.color_at(0, 0), CfaColor::B);
    assert_eq!(grid.color_at(1, 1), CfaColor::R);
    assert_eq!(grid.color_at(2, 1), CfaColor::G2);
    assert_eq!(grid.color_at(3, 2), CfaColor::G1);
}

#[test]
fn sensor_reader_applies_geometry() {
    let geometry = FrameGeometry::new(4, 2, PixelFormat::Packed10Csi2, CfaPattern::rggb()).with_stride(6);
    let reader = SensorDumpReader::new(geometry);
    let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0];
    let grid = reader.read_raw(&bytes).unwrap();
    assert_eq!(grid.samples, vec![1023, 1023, 1023, 1023, 0, 0, 0, 0]);

    assert!(matches!(
        reader.read_raw(&bytes[..11]),
        Err(IspError::Format(FormatError::BufferTooSmall { .. }))
    ));
}
