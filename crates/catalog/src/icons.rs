//! Deterministic decorative glyphs for favorites.

/// Glyph palette indexed by the title hash.
pub const ICON_PALETTE: [&str; 20] = [
    "📧", "🌐", "🧩", "📁", "🐙", "🗂️", "🖥️", "⚙️", "📝", "📎", "📚", "🧠", "🔧", "🚀", "🗒️",
    "💡", "🧭", "📊", "🔍", "🛠️",
];

/// Pick a glyph from the lowercased, trimmed title.
///
/// Hash is `h = h * 31 + unit` over UTF-16 code units, wrapping at 32 bits,
/// so the same title maps to the same glyph on every run and platform.
/// An empty title hashes as `"x"`.
pub fn seed_emoji(title: &str) -> &'static str {
    let source = if title.is_empty() { "x" } else { title };
    let normalized = source.to_lowercase();
    let hash = normalized
        .trim()
        .encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)));
    ICON_PALETTE[(hash % ICON_PALETTE.len() as u32) as usize]
}
