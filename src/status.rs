//! FTP reply codes (RFC 959) used by the control channel

// 1xx: Positive Preliminary Reply
pub const ALREADY_OPEN: u32 = 125;
pub const ABOUT_TO_SEND: u32 = 150;

// 2xx: Positive Completion Reply
pub const COMMAND_OK: u32 = 200;
pub const READY: u32 = 220;
pub const CLOSING: u32 = 221;
pub const CLOSING_DATA_CONNECTION: u32 = 226;
pub const PASSIVE_MODE: u32 = 227;
pub const LOGGED_IN: u32 = 230;
pub const AUTH_OK: u32 = 234;
pub const REQUESTED_FILE_ACTION_OK: u32 = 250;
pub const PATH_CREATED: u32 = 257;

// 3xx: Positive intermediate Reply
pub const NEED_PASSWORD: u32 = 331;
pub const REQUEST_FILE_PENDING: u32 = 350;

// 4xx: Transient Negative Completion Reply
pub const NOT_AVAILABLE: u32 = 421;
pub const CANNOT_OPEN_DATA_CONNECTION: u32 = 425;
pub const REQUEST_FILE_ACTION_IGNORED: u32 = 450;

// 5xx: Permanent Negative Completion Reply
pub const BAD_COMMAND: u32 = 500;
pub const NOT_LOGGED_IN: u32 = 530;
pub const FILE_UNAVAILABLE: u32 = 550;
pub const BAD_FILENAME: u32 = 553;

/// Whether `code` is a completion or preliminary reply (1xx-3xx).
pub fn is_positive(code: u32) -> bool {
    (100..400).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_ranges() {
        assert!(is_positive(ABOUT_TO_SEND));
        assert!(is_positive(REQUEST_FILE_PENDING));
        assert!(!is_positive(REQUEST_FILE_ACTION_IGNORED));
        assert!(!is_positive(FILE_UNAVAILABLE));
    }
}
