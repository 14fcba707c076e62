//! Windowing for large documents and batches.
//!
//! A large document is cut into windows of `chunk_size` characters. Every
//! window after the first also carries the last `overlap` characters of the
//! previous one, so an entity sitting on a seam has a chance of being seen
//! whole. After redaction the first `overlap` characters of each such window
//! are dropped before concatenation.
//!
//! The seam handling is approximate: when a placeholder near a seam is
//! shorter or longer than the text it replaced, the strip removes the wrong
//! amount and the seam can be duplicated or clipped. Callers that need exact
//! output should redact the document in one piece.

use tracing::{error, info};

use crate::error::{InconnuError, Result};

/// Splits text into overlapping character windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamChunker {
    chunk_size: usize,
    overlap: usize,
}

impl StreamChunker {
    /// Create a chunker.
    ///
    /// # Errors
    ///
    /// Returns a config error if `chunk_size` is zero or `overlap` is not
    /// smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(InconnuError::config("chunk_size must be greater than zero"));
        }
        if overlap >= chunk_size {
            return Err(InconnuError::config(format!(
                "chunk_overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Get the window size in characters.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Get the overlap in characters.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into windows.
    ///
    /// Window `k > 0` covers characters
    /// `[k * chunk_size - overlap, (k + 1) * chunk_size)`.
    #[must_use]
    pub fn windows<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // Byte offset of every char boundary, including the end.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let chars = bounds.len() - 1;

        let mut windows = Vec::with_capacity(chars.div_ceil(self.chunk_size));
        let mut start = 0;
        while start < chars {
            let from = if start == 0 { 0 } else { start - self.overlap };
            let to = (start + self.chunk_size).min(chars);
            windows.push(&text[bounds[from]..bounds[to]]);
            start += self.chunk_size;
        }
        windows
    }

    /// Redact `text` window by window with `redact_window` and stitch the
    /// results back together.
    ///
    /// # Errors
    ///
    /// Returns the first error from `redact_window`; no partial output is
    /// returned.
    pub fn redact<F>(&self, text: &str, mut redact_window: F) -> Result<String>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let windows = self.windows(text);
        let mut out = String::with_capacity(text.len());

        for (k, window) in windows.iter().enumerate() {
            let redacted = redact_window(window)?;
            if k == 0 {
                out.push_str(&redacted);
            } else {
                out.push_str(skip_chars(&redacted, self.overlap));
            }
        }

        info!(
            windows = windows.len(),
            chunk_size = self.chunk_size,
            overlap = self.overlap,
            "Redacted document in windows"
        );
        Ok(out)
    }
}

fn skip_chars(text: &str, n: usize) -> &str {
    text.char_indices().nth(n).map_or("", |(i, _)| &text[i..])
}

/// Run `process` over `items` in groups of `batch_size`, keeping input order.
///
/// Progress is logged per group when the batch spans more than two groups.
///
/// # Errors
///
/// Returns the first error; the failing group is logged.
pub fn run_in_groups<T, R, F>(items: &[T], batch_size: usize, mut process: F) -> Result<Vec<R>>
where
    F: FnMut(&T) -> Result<R>,
{
    let batch_size = batch_size.max(1);
    let total = items.len();
    let mut results = Vec::with_capacity(total);

    for (group, chunk) in items.chunks(batch_size).enumerate() {
        for item in chunk {
            match process(item) {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(group, error = %e, "Batch group failed");
                    return Err(e);
                }
            }
        }
        log_progress(results.len(), total, batch_size);
    }

    Ok(results)
}

/// Log batch progress when the batch is large enough to warrant it.
pub(crate) fn log_progress(done: usize, total: usize, batch_size: usize) {
    if total > batch_size.saturating_mul(2) {
        info!(done, total, "Batch progress");
    }
}
