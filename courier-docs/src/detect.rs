/// Leading bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8; 4] = b"%PDF";

/// True iff `buf` starts with `%PDF`.
///
/// A signature check only; the buffer may still fail to parse.
pub fn looks_like_pdf(buf: &[u8]) -> bool {
    buf.starts_with(PDF_SIGNATURE)
}
