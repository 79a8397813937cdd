/// 1-based line number containing byte `offset`.
///
/// Counts newlines in the prefix, so an offset sitting on a `\n` still counts
/// as part of that line. Offsets past the end clamp to the last line.
pub fn line_of(source: &str, offset: usize) -> usize {
    let clamped = offset.min(source.len());
    newline_count(&source.as_bytes()[..clamped]) + 1
}

/// 1-based `(start_line, end_line)` span for a byte range, for revealing an
/// action in an editor.
///
/// The end offset is trimmed of trailing whitespace first: selecting a line
/// together with its terminating newline highlights that line, not the empty
/// start of the next one.
pub fn line_span(source: &str, start: usize, end: usize) -> (usize, usize) {
    let start_line = line_of(source, start);
    let mut prefix = &source.as_bytes()[..end.min(source.len())];
    while let Some((&last, rest)) = prefix.split_last() {
        if !last.is_ascii_whitespace() {
            break;
        }
        prefix = rest;
    }
    let end_line = newline_count(prefix) + 1;
    (start_line, end_line.max(start_line))
}

fn newline_count(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&byte| byte == b'\n').count()
}
