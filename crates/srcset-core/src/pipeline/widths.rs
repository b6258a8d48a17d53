//! Width ladder derivation.

/// Target widths used when the caller does not supply any.
pub const DEFAULT_WIDTHS: [u32; 4] = [480, 1024, 1920, 2560];

/// Width of the placeholder image, embedded or on disk.
pub const PLACEHOLDER_WIDTH: u32 = 64;

/// Target widths for a source that is `image_width` pixels wide.
///
/// Candidates wider than the source are dropped (no upscaling). The native
/// width is appended when nothing survives, or when it is strictly wider than
/// every survivor and the caller gave no explicit list. An explicit empty
/// list counts as "no explicit list" for that rule, so it yields `[image_width]`.
/// The result is never empty and keeps the candidates' order without repeats.
pub fn width_ladder(image_width: u32, widths: Option<&[u32]>) -> Vec<u32> {
    let explicit = widths.is_some_and(|w| !w.is_empty());
    let candidates = widths.unwrap_or(&DEFAULT_WIDTHS);

    let mut ladder: Vec<u32> = Vec::with_capacity(candidates.len() + 1);
    for &width in candidates {
        if width > 0 && width <= image_width && !ladder.contains(&width) {
            ladder.push(width);
        }
    }

    match ladder.iter().max() {
        None => ladder.push(image_width),
        Some(&max) if image_width > max && !explicit => ladder.push(image_width),
        _ => {}
    }

    ladder
}
