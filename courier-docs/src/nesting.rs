//! Bracket-depth check run before a buffer is handed to the PDF parser.
//!
//! The parser descends once per nested array or dictionary, so a small
//! body of `[[[[...` is enough to exhaust a worker thread's stack. The
//! scan below is iterative and skips strings, comments and stream data.
//! Object streams are inflated and scanned as well, since the parser
//! reads the objects inside them the same way.

use lopdf::{dictionary, Stream};

use crate::DocumentError;

/// Deepest array or dictionary nesting accepted in a single object.
pub(crate) const MAX_NESTING: usize = 64;

const ENDSTREAM: &[u8] = b"endstream";

/// Fails with [`DocumentError::Parse`] when any object in `buf` nests
/// arrays or dictionaries deeper than `limit`.
pub(crate) fn check_nesting(buf: &[u8], limit: usize) -> Result<(), DocumentError> {
    scan(buf, limit, true)
}

fn scan(buf: &[u8], limit: usize, top_level: bool) -> Result<(), DocumentError> {
    let mut depth = 0usize;
    let mut pos = 0usize;
    // Start of the object whose stream dictionary we may be inside.
    let mut object_start = 0usize;

    let open = |depth: &mut usize| {
        *depth += 1;
        if *depth > limit {
            Err(DocumentError::Parse(format!("objects nested deeper than {limit} levels")))
        } else {
            Ok(())
        }
    };

    while pos < buf.len() {
        match buf[pos] {
            b'%' => pos = skip_comment(buf, pos),
            b'(' => pos = skip_literal_string(buf, pos),
            b'/' => pos = token_end(buf, pos + 1),
            b'<' if buf.get(pos + 1) == Some(&b'<') => {
                open(&mut depth)?;
                pos += 2;
            }
            b'<' => pos = find(buf, pos, b">").map_or(buf.len(), |end| end + 1),
            b'>' if buf.get(pos + 1) == Some(&b'>') => {
                depth = depth.saturating_sub(1);
                pos += 2;
            }
            b'[' => {
                open(&mut depth)?;
                pos += 1;
            }
            b']' => {
                depth = depth.saturating_sub(1);
                pos += 1;
            }
            c if is_regular(c) => {
                let end = token_end(buf, pos);
                match &buf[pos..end] {
                    b"obj" | b"endobj" => {
                        depth = 0;
                        object_start = pos;
                        pos = end;
                    }
                    b"stream" if top_level => {
                        let data_start = skip_eol(buf, end);
                        let data_end = find(buf, data_start, ENDSTREAM).unwrap_or(buf.len());
                        let dict = &buf[object_start..pos];
                        if find(dict, 0, b"/ObjStm").is_some() {
                            check_object_stream(dict, &buf[data_start..data_end], limit)?;
                        }
                        pos = (data_end + ENDSTREAM.len()).min(buf.len());
                    }
                    _ => pos = end,
                }
            }
            _ => pos += 1,
        }
    }
    Ok(())
}

fn check_object_stream(dict: &[u8], data: &[u8], limit: usize) -> Result<(), DocumentError> {
    if find(dict, 0, b"/Filter").is_none() {
        return scan(data, limit, false);
    }
    if find(dict, 0, b"/FlateDecode").is_none() {
        return Err(DocumentError::Parse("unsupported object stream filter".to_string()));
    }

    let stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, data.to_vec());
    let inflated = stream
        .decompressed_content()
        .map_err(|e| DocumentError::Parse(format!("object stream: {e}")))?;
    scan(&inflated, limit, false)
}

fn is_regular(c: u8) -> bool {
    !c.is_ascii_whitespace() && c != 0 && !b"()<>[]{}/%".contains(&c)
}

fn token_end(buf: &[u8], from: usize) -> usize {
    buf[from..]
        .iter()
        .position(|c| !is_regular(*c))
        .map_or(buf.len(), |i| from + i)
}

fn skip_comment(buf: &[u8], from: usize) -> usize {
    buf[from..]
        .iter()
        .position(|c| *c == b'\n' || *c == b'\r')
        .map_or(buf.len(), |i| from + i + 1)
}

fn skip_literal_string(buf: &[u8], from: usize) -> usize {
    let mut parens = 0usize;
    let mut pos = from;
    while pos < buf.len() {
        match buf[pos] {
            b'\\' => pos += 1,
            b'(' => parens += 1,
            b')' => {
                parens -= 1;
                if parens == 0 {
                    return pos + 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    buf.len()
}

fn skip_eol(buf: &[u8], mut pos: usize) -> usize {
    if buf.get(pos) == Some(&b'\r') {
        pos += 1;
    }
    if buf.get(pos) == Some(&b'\n') {
        pos += 1;
    }
    pos
}

fn find(buf: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    buf.get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pdf_with_page_widths;

    fn nested(open: &str, levels: usize) -> Vec<u8> {
        let mut buf = b"%PDF-1.4\n1 0 obj\n".to_vec();
        buf.extend(open.repeat(levels).into_bytes());
        buf
    }

    #[test]
    fn accepts_ordinary_documents() {
        let input = pdf_with_page_widths(&[100, 200]);
        assert!(check_nesting(&input, MAX_NESTING).is_ok());
    }

    #[test]
    fn rejects_deep_arrays_and_dictionaries() {
        assert!(check_nesting(&nested("[", 5000), MAX_NESTING).is_err());
        assert!(check_nesting(&nested("<< /A ", 100), MAX_NESTING).is_err());
        assert!(check_nesting(&nested("[", MAX_NESTING), MAX_NESTING).is_ok());
    }

    #[test]
    fn depth_resets_between_objects() {
        let mut buf = Vec::new();
        for n in 1..=10 {
            buf.extend(format!("{n} 0 obj\n{}\nendobj\n", "[".repeat(40)).into_bytes());
        }
        assert!(check_nesting(&buf, MAX_NESTING).is_ok());
    }

    #[test]
    fn ignores_brackets_in_strings_comments_and_streams() {
        let deep = "[".repeat(200);
        let buf = format!(
            "%PDF-1.4\n% {deep}\n1 0 obj\n(a \\( {deep})\nendobj\n\
             2 0 obj\n<< /Length 200 >>\nstream\n{deep}\nendstream\nendobj\n"
        );
        assert!(check_nesting(buf.as_bytes(), MAX_NESTING).is_ok());
    }

    #[test]
    fn scans_inside_compressed_object_streams() {
        let mut stream = Stream::new(lopdf::Dictionary::new(), "[".repeat(5000).into_bytes());
        stream.compress().ok();
        assert!(stream.dict.has(b"Filter"));

        let mut buf = b"%PDF-1.5\n1 0 obj\n<< /Type /ObjStm /N 1 /First 4 /Filter /FlateDecode >>\nstream\n".to_vec();
        buf.extend(&stream.content);
        buf.extend(b"\nendstream\nendobj\n");

        assert!(check_nesting(&buf, MAX_NESTING).is_err());
    }

    #[test]
    fn plain_streams_are_not_inflated() {
        let buf = b"1 0 obj\n<< /Filter /FlateDecode >>\nstream\n\x00\x01garbage[[[[\nendstream\nendobj\n";
        assert!(check_nesting(buf, 2).is_ok());
    }
}
