/// Split `text` into pieces of at most `max_len` characters.
///
/// Each cut lands on the last paragraph break inside the window, else the
/// last newline, else exactly at `max_len`. Whitespace at the cut is dropped
/// from both sides.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;
    while remaining.chars().count() > max_len {
        let limit = remaining
            .char_indices()
            .nth(max_len)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        let window = &remaining[..limit];
        let split = window
            .rfind("\n\n")
            .or_else(|| window.rfind('\n'))
            .filter(|&i| i > 0)
            .unwrap_or(limit);

        let piece = remaining[..split].trim_end();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }
        remaining = remaining[split..].trim_start();
    }
    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }
    chunks
}
