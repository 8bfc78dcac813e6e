use super::terminal::{detect_capabilities, Stream, TerminalCapabilities};

/// How human-readable output should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub color: bool,
    pub unicode: bool,
    pub verbose: u8,
}

impl RenderContext {
    /// Context for output written to `stream`
    pub fn detect(stream: Stream, verbose: u8) -> Self {
        Self::from_caps(verbose, detect_capabilities(stream))
    }

    /// No color, unicode icons. Stable output for tests and logs.
    pub fn plain(verbose: u8) -> Self {
        Self {
            color: false,
            unicode: true,
            verbose,
        }
    }

    pub(crate) fn from_caps(verbose: u8, caps: TerminalCapabilities) -> Self {
        Self {
            color: caps.supports_color && !caps.is_ci,
            unicode: caps.supports_unicode,
            verbose,
        }
    }
}
