use std::process::Command;
use std::time::Duration;

use crate::error::PipelineError;
use crate::proc;

const ZBARIMG: &str = "zbarimg";

// zbarimg prefixes every decoded symbol with its type tag.
const RESULT_TAG: &[u8] = b"QR-Code:";

// zbarimg exits 4 when it scanned the image fine but found no symbol.
const NO_SYMBOL_EXIT: i32 = 4;

pub const SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracts the payload of the QR symbol embedded in one frame image.
pub trait SymbolScanner {
    fn scan(&self, image: &[u8]) -> Result<Vec<u8>, PipelineError>;
}

/// The zbarimg process, fed the frame on stdin. Only the QR symbology is
/// enabled so stray barcodes in a frame cannot leak into the stream.
pub struct ZbarScanner {
    pub timeout: Duration,
}

impl Default for ZbarScanner {
    fn default() -> Self {
        ZbarScanner {
            timeout: SCAN_TIMEOUT,
        }
    }
}

impl SymbolScanner for ZbarScanner {
    fn scan(&self, image: &[u8]) -> Result<Vec<u8>, PipelineError> {
        let mut command = Command::new(ZBARIMG);
        command.args(["--quiet", "-Sdisable", "-Sqrcode.enable", "-"]);

        let output = proc::run(ZBARIMG, command, Some(image.to_vec()), self.timeout)?;

        if output.status.success() {
            return parse_scan_output(&output.stdout).ok_or(PipelineError::SymbolNotFound);
        }
        if output.status.code() == Some(NO_SYMBOL_EXIT) {
            return Err(PipelineError::SymbolNotFound);
        }
        Err(PipelineError::Process {
            program: ZBARIMG,
            detail: proc::failure_detail(output.status, &output.stderr),
        })
    }
}

/// Strips the scanner's type tag and the single newline it appends. Interior
/// payload bytes pass through untouched.
fn parse_scan_output(stdout: &[u8]) -> Option<Vec<u8>> {
    let tagged = stdout.strip_prefix(RESULT_TAG)?;
    let payload = tagged.strip_suffix(b"\n").unwrap_or(tagged);
    Some(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_tag_and_trailing_newline() {
        assert_eq!(
            parse_scan_output(b"QR-Code:some payload\n"),
            Some(b"some payload".to_vec())
        );
        assert_eq!(
            parse_scan_output(b"QR-Code:no newline"),
            Some(b"no newline".to_vec())
        );
    }

    #[test]
    fn test_parse_keeps_interior_newlines() {
        assert_eq!(
            parse_scan_output(b"QR-Code:line one\nline two\n"),
            Some(b"line one\nline two".to_vec())
        );
    }

    #[test]
    fn test_parse_accepts_empty_payload() {
        assert_eq!(parse_scan_output(b"QR-Code:\n"), Some(Vec::new()));
    }

    #[test]
    fn test_parse_rejects_untagged_output() {
        assert_eq!(parse_scan_output(b"EAN-13:123456\n"), None);
        assert_eq!(parse_scan_output(b""), None);
    }
}
