/// Sentinel `take` value meaning "return every row" (no pagination window).
pub const TAKE_ALL: i64 = -1;

/// Key prefix under which uploaded claim PDFs are stored.
pub const UPLOADED_PDF_PREFIX: &str = "uploaded-pdfs";

/// Default page size for listings when the client sends none.
pub const DEFAULT_PAGE_SIZE: i64 = 25;
