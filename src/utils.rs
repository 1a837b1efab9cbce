/// Converts a 1-based line and column (as reported by `serde_json`) into a
/// byte offset into `source`. Positions past the end clamp to `source.len()`.
pub fn byte_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let within = column.saturating_sub(1).min(text.len());
            return floor_char_boundary(source, offset + within);
        }
        offset += text.len();
    }
    source.len()
}

fn floor_char_boundary(source: &str, mut index: usize) -> usize {
    while index > 0 && !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}
