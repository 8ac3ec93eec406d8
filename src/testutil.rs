//! Hand-built segment streams for tests.

pub const CANVAS_WIDTH: u16 = 1920;
pub const CANVAS_HEIGHT: u16 = 1080;
pub const PALETTE_ID: u8 = 0;
pub const OBJECT_ID: u16 = 1;
pub const WINDOW_ID: u8 = 0;

pub const EPOCH_START: u8 = 0x80;
pub const NORMAL: u8 = 0x00;

/// Wrap a payload in a segment header: magic, pts, dts, kind, length.
pub fn segment(pts: u32, kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(13 + payload.len());
    out.extend_from_slice(&0x5047u16.to_be_bytes());
    out.extend_from_slice(&pts.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // dts
    out.push(kind);
    out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Presentation composition segment placing `objects` (id, window) pairs
/// at (100, 50) without cropping.
pub fn pcs_segment(pts: u32, state: u8, objects: &[(u16, u8)]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&CANVAS_WIDTH.to_be_bytes());
    payload.extend_from_slice(&CANVAS_HEIGHT.to_be_bytes());
    payload.push(0x10); // frame rate
    payload.extend_from_slice(&(pts / 90_000).to_be_bytes()[2..]); // composition number
    payload.push(state);
    payload.push(0x00); // no palette update
    payload.push(PALETTE_ID);
    payload.push(objects.len() as u8);
    for &(object_id, window_id) in objects {
        payload.extend_from_slice(&object_id.to_be_bytes());
        payload.push(window_id);
        payload.push(0x00); // no cropping
        payload.extend_from_slice(&100u16.to_be_bytes());
        payload.extend_from_slice(&50u16.to_be_bytes());
    }
    segment(pts, 0x16, &payload)
}

/// Window definition segment from (id, x, y, width, height) tuples.
pub fn wds_segment(pts: u32, windows: &[(u8, u16, u16, u16, u16)]) -> Vec<u8> {
    let mut payload = vec![windows.len() as u8];
    for &(id, x, y, width, height) in windows {
        payload.push(id);
        payload.extend_from_slice(&x.to_be_bytes());
        payload.extend_from_slice(&y.to_be_bytes());
        payload.extend_from_slice(&width.to_be_bytes());
        payload.extend_from_slice(&height.to_be_bytes());
    }
    segment(pts, 0x17, &payload)
}

/// Palette definition segment from (entry, y, cr, cb, alpha) tuples.
pub fn pds_segment(pts: u32, id: u8, entries: &[(u8, u8, u8, u8, u8)]) -> Vec<u8> {
    let mut payload = vec![id, 0 /* version */];
    for &(entry, y, cr, cb, alpha) in entries {
        payload.extend_from_slice(&[entry, y, cr, cb, alpha]);
    }
    segment(pts, 0x14, &payload)
}

/// Single-fragment object definition segment.
pub fn ods_segment(pts: u32, id: u16, width: u16, height: u16, rle: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&id.to_be_bytes());
    payload.push(0x00); // version
    payload.push(0xC0); // first and last in sequence
    payload.extend_from_slice(&((rle.len() as u32 + 4).to_be_bytes())[1..]); // u24
    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(rle);
    segment(pts, 0x15, &payload)
}

/// One fragment of a multi-fragment object definition.
pub fn ods_fragment(
    pts: u32,
    id: u16,
    first: Option<(u16, u16, u32)>,
    data: &[u8],
) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&id.to_be_bytes());
    payload.push(0x00);
    match first {
        Some((width, height, total)) => {
            payload.push(0x80); // first in sequence
            payload.extend_from_slice(&(total.to_be_bytes())[1..]);
            payload.extend_from_slice(&width.to_be_bytes());
            payload.extend_from_slice(&height.to_be_bytes());
        }
        None => payload.push(0x40), // last in sequence
    }
    payload.extend_from_slice(data);
    segment(pts, 0x15, &payload)
}

pub fn end_segment(pts: u32) -> Vec<u8> {
    segment(pts, 0x80, &[])
}

/// RLE for the fixture object: a 4x2 image, top row palette entry 1,
/// bottom row a run of entry 2.
pub fn fixture_rle() -> Vec<u8> {
    vec![
        0x01, 0x01, 0x01, 0x01, 0x00, 0x00, // four literals, end of line
        0x00, 0x84, 0x02, 0x00, 0x00, // run of four of entry 2, end of line
    ]
}

/// The fixture object decoded to RGBA bytes: four white pixels over four
/// grey pixels.
pub fn fixture_rgba() -> Vec<u8> {
    let mut out = Vec::with_capacity(32);
    for _ in 0..4 {
        out.extend_from_slice(&[255, 255, 255, 255]);
    }
    for _ in 0..4 {
        out.extend_from_slice(&[100, 100, 100, 255]);
    }
    out
}

/// A stream of four display sets at 90000, 180000, 270000 and 360000 ticks.
///
/// The first opens an epoch and defines the palette, window and object; the
/// next two re-present the same object; the last presents nothing.
pub fn fixture_stream() -> Vec<u8> {
    let mut data = Vec::new();

    let pts = 90_000;
    data.extend_from_slice(&pcs_segment(pts, EPOCH_START, &[(OBJECT_ID, WINDOW_ID)]));
    data.extend_from_slice(&wds_segment(pts, &[(WINDOW_ID, 10, 20, 16, 4)]));
    data.extend_from_slice(&pds_segment(
        pts,
        PALETTE_ID,
        &[(1, 255, 128, 128, 255), (2, 100, 128, 128, 255)],
    ));
    data.extend_from_slice(&ods_segment(pts, OBJECT_ID, 4, 2, &fixture_rle()));
    data.extend_from_slice(&end_segment(pts));

    for pts in [180_000, 270_000] {
        data.extend_from_slice(&pcs_segment(pts, NORMAL, &[(OBJECT_ID, WINDOW_ID)]));
        data.extend_from_slice(&end_segment(pts));
    }

    let pts = 360_000;
    data.extend_from_slice(&pcs_segment(pts, NORMAL, &[]));
    data.extend_from_slice(&end_segment(pts));

    data
}
