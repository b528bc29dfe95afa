//! Image decoding and terminal rendering setup.
//!
//! Supports multiple terminal graphics protocols through `ratatui-image`:
//! - Kitty graphics protocol
//! - Sixel
//! - iTerm2
//! - Unicode half-blocks (fallback)

use std::time::Duration;

use image::{DynamicImage, GenericImageView, ImageError, Rgba, RgbaImage};
use ratatui_image::picker::{Picker, ProtocolType};
#[cfg(unix)]
use ratatui_image::picker::cap_parser::QueryStdioOptions;
use ratatui_image::protocol::StatefulProtocol;

const PICKER_QUERY_TIMEOUT_MS: u64 = 250;

/// Longest edge, in pixels, kept for grid thumbnails.
pub const THUMBNAIL_MAX_PX: u32 = 320;

/// Longest edge, in pixels, kept for the enlarged overlay image.
pub const LARGE_MAX_PX: u32 = 1600;

/// Create a picker for terminal image rendering.
///
/// The picker detects terminal capabilities and chooses the best protocol.
pub fn create_picker(force_half_cell: bool) -> Option<Picker> {
    if force_half_cell {
        tracing::debug!("forcing half-cell image protocol");
        return Some(Picker::halfblocks());
    }

    // On Windows, skip the stdio capability query. It can leave orphaned reader
    // threads on the console input buffer and lock up some terminals.
    #[cfg(not(unix))]
    {
        tracing::debug!("windows: using half-cell image protocol");
        return Some(Picker::halfblocks());
    }

    #[cfg(unix)]
    {
        let picker = match Picker::from_query_stdio_with_options(query_options()) {
            Ok(picker) => picker,
            Err(err) => {
                tracing::warn!(%err, "terminal image query failed; images disabled");
                return None;
            }
        };
        tracing::debug!(
            term_program = %std::env::var("TERM_PROGRAM").unwrap_or_else(|_| "<unset>".to_string()),
            term = %std::env::var("TERM").unwrap_or_else(|_| "<unset>".to_string()),
            protocol = ?picker.protocol_type(),
            "created image picker"
        );
        Some(picker)
    }
}

/// Decode downloaded bytes, shrinking so the longest edge is at most `max_px`.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image format.
pub fn decode_scaled(bytes: &[u8], max_px: u32) -> Result<DynamicImage, ImageError> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = image.dimensions();
    if width <= max_px && height <= max_px {
        return Ok(image);
    }
    Ok(image.thumbnail(max_px, max_px))
}

/// Build a render protocol for `image` using the picker's protocol.
///
/// Half-block output is quantized to the ANSI-256 palette on terminals
/// without truecolor support.
pub fn protocol_for(picker: &Picker, image: DynamicImage) -> StatefulProtocol {
    let halfblocks = matches!(picker.protocol_type(), ProtocolType::Halfblocks);
    let image = if halfblocks && !supports_truecolor_terminal() {
        quantize_to_ansi256(&image)
    } else {
        image
    };
    picker.new_resize_protocol(image)
}

/// Whether terminal output should be treated as truecolor-capable.
pub fn supports_truecolor_terminal() -> bool {
    if let Ok(force) = std::env::var("PHOTOGRID_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    if std::env::var("TERM_PROGRAM")
        .ok()
        .as_deref()
        .is_some_and(|v| v == "Apple_Terminal")
    {
        return false;
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

/// Quantize image RGB channels to the ANSI-256 palette while preserving alpha.
pub fn quantize_to_ansi256(image: &DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    let mut out = RgbaImage::new(width, height);
    let src = image.to_rgba8();

    for (x, y, px) in src.enumerate_pixels() {
        let idx = rgb_to_xterm_256(px[0], px[1], px[2]);
        let (r, g, b) = xterm_256_to_rgb(idx);
        out.put_pixel(x, y, Rgba([r, g, b, px[3]]));
    }

    DynamicImage::ImageRgba8(out)
}

#[cfg(unix)]
fn query_options() -> QueryStdioOptions {
    let mut options = QueryStdioOptions::default();
    options.timeout = Duration::from_millis(PICKER_QUERY_TIMEOUT_MS);
    options
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}

const fn xterm_256_to_rgb(i: u8) -> (u8, u8, u8) {
    match i {
        0 => (0, 0, 0),
        1 => (205, 0, 0),
        2 => (0, 205, 0),
        3 => (205, 205, 0),
        4 => (0, 0, 238),
        5 => (205, 0, 205),
        6 => (0, 205, 205),
        7 => (229, 229, 229),
        8 => (127, 127, 127),
        9 => (255, 0, 0),
        10 => (0, 255, 0),
        11 => (255, 255, 0),
        12 => (92, 92, 255),
        13 => (255, 0, 255),
        14 => (0, 255, 255),
        15 => (255, 255, 255),
        16..=231 => {
            let i = i - 16;
            let r = (i / 36) % 6;
            let g = (i / 6) % 6;
            let b = i % 6;
            (cube_value(r), cube_value(g), cube_value(b))
        }
        232..=255 => {
            let gray = 8 + (i - 232) * 10;
            (gray, gray, gray)
        }
    }
}

const fn cube_value(c: u8) -> u8 {
    if c == 0 { 0 } else { 55 + c * 40 }
}
