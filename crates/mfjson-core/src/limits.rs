//! Resource limits shared by the parser and the writer.
//!
//! Both directions recurse once per nested container, so the nesting limit is
//! what keeps hostile input (or a very deep object graph) from exhausting the
//! stack. Exceeding a limit is reported as an ordinary error.

/// Nesting depth used by [`Limits::default`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Depth and size limits for a single parse or serialize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of nested arrays, objects and records.
    pub max_depth: usize,
    /// Maximum input length in bytes (parser only). `None` means unbounded.
    pub max_input_len: Option<usize>,
}

impl Limits {
    /// Tight limits for untrusted input on small devices.
    pub const fn strict() -> Self {
        Self {
            max_depth: 32,
            max_input_len: Some(1024 * 1024),
        }
    }

    /// Same limits with a different nesting depth.
    pub const fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: None,
        }
    }
}
