use std::fmt;

/// Acknowledgement shown for `:start`.
pub const START_MESSAGE: &str = "Starting monochromator sweep...";

const ERROR_PREFIX: &str = "ERROR: ";
const OK_PREFIX: &str = "OK: ";

/// Outcome of dispatching one command line.
///
/// `to_string()` gives the text for the output line: empty for `Silent` and
/// `Quit`, `"OK: "` or `"ERROR: "` prefixed for acknowledgements and errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Silent,
    /// `:q`. Nothing is shown; the application should quit.
    Quit,
    /// `:start`. The application starts the sweep itself.
    Started,
    Value(String),
    Error(String),
}

/// How a response should be styled on the output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Plain,
    Ok,
    Error,
}

impl ResponseKind {
    /// Classifies already rendered output by its prefix.
    pub fn classify(text: &str) -> Self {
        if text.starts_with(ERROR_PREFIX) {
            Self::Error
        } else if text.starts_with(OK_PREFIX) {
            Self::Ok
        } else {
            Self::Plain
        }
    }
}

impl Response {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Silent | Self::Quit => ResponseKind::Plain,
            Self::Started => ResponseKind::Ok,
            // Evaluated text is styled by what it says.
            Self::Value(text) => ResponseKind::classify(text),
            Self::Error(_) => ResponseKind::Error,
        }
    }

    pub fn is_quit(&self) -> bool {
        matches!(self, Self::Quit)
    }

    /// Text for the output line with the `OK: ` marker removed; the marker
    /// is conveyed by color instead.
    pub fn display_text(&self) -> String {
        let text = self.to_string();
        match text.strip_prefix(OK_PREFIX) {
            Some(rest) => rest.to_string(),
            None => text,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent | Self::Quit => Ok(()),
            Self::Started => write!(f, "{OK_PREFIX}{START_MESSAGE}"),
            Self::Value(text) => f.write_str(text),
            Self::Error(message) => write!(f, "{ERROR_PREFIX}{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering() {
        assert_eq!(Response::Silent.to_string(), "");
        assert_eq!(Response::Quit.to_string(), "");
        assert_eq!(Response::Started.to_string(), "OK: Starting monochromator sweep...");
        assert_eq!(Response::Value("2".to_string()).to_string(), "2");
        assert_eq!(
            Response::Error("Command not recognized".to_string()).to_string(),
            "ERROR: Command not recognized"
        );
    }

    #[test]
    fn display_text_strips_ok_marker() {
        assert_eq!(Response::Started.display_text(), START_MESSAGE);
        assert_eq!(Response::Error("x".to_string()).display_text(), "ERROR: x");
    }

    #[test]
    fn values_are_styled_by_their_prefix() {
        let error_text = Response::Value("ERROR: x".to_string());
        assert_eq!(error_text.kind(), ResponseKind::Error);
        assert_eq!(error_text.display_text(), "ERROR: x");

        let ok_text = Response::Value("OK: y".to_string());
        assert_eq!(ok_text.kind(), ResponseKind::Ok);
        assert_eq!(ok_text.display_text(), "y");

        assert_eq!(Response::Value("OKAY".to_string()).kind(), ResponseKind::Plain);
    }

    #[test]
    fn kinds_match_prefix_classification() {
        for response in [
            Response::Silent,
            Response::Quit,
            Response::Started,
            Response::Value("12".to_string()),
            Response::Value("ERROR: typed by hand".to_string()),
            Response::Value("OK: typed by hand".to_string()),
            Response::Error("bad".to_string()),
        ] {
            assert_eq!(response.kind(), ResponseKind::classify(&response.to_string()));
        }
    }
}
