/// Number of maximal non-whitespace runs in `line`.
pub fn word_count(line: &str) -> usize {
    line.split_whitespace().count()
}

/// Raw length of `line` in chars, surrounding whitespace included.
pub fn char_count(line: &str) -> usize {
    line.chars().count()
}

/// Formats seconds as `MM:SS`; minutes are not wrapped into hours.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Largest char boundary in `text` that is `<= idx`, clamped to the text length.
pub fn floor_char_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

pub fn prev_char_boundary(text: &str, idx: usize) -> usize {
    text[..idx]
        .char_indices()
        .next_back()
        .map_or(0, |(i, _)| i)
}

pub fn next_char_boundary(text: &str, idx: usize) -> usize {
    text[idx..]
        .chars()
        .next()
        .map_or(idx, |c| idx + c.len_utf8())
}
