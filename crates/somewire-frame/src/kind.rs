//! Message type and return code vocabulary.
//!
//! The codec carries `message_type` and `return_code` as opaque bytes and
//! accepts any value. The constants here name the values defined by the
//! protocol so that callers and diagnostics don't deal in magic numbers.

/// Wire format version written by this implementation.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// A request expecting a response.
pub const REQUEST: u8 = 0x00;

/// A fire-and-forget request.
pub const REQUEST_NO_RETURN: u8 = 0x01;

/// An event or field notification.
pub const NOTIFICATION: u8 = 0x02;

/// A response carrying no error.
pub const RESPONSE: u8 = 0x80;

/// A response carrying an error.
pub const ERROR: u8 = 0x81;

pub const E_OK: u8 = 0x00;
pub const E_NOT_OK: u8 = 0x01;
pub const E_UNKNOWN_SERVICE: u8 = 0x02;
pub const E_UNKNOWN_METHOD: u8 = 0x03;
pub const E_NOT_READY: u8 = 0x04;
pub const E_NOT_REACHABLE: u8 = 0x05;
pub const E_TIMEOUT: u8 = 0x06;
pub const E_WRONG_PROTOCOL_VERSION: u8 = 0x07;
pub const E_WRONG_INTERFACE_VERSION: u8 = 0x08;
pub const E_MALFORMED_MESSAGE: u8 = 0x09;
pub const E_WRONG_MESSAGE_TYPE: u8 = 0x0A;

/// Returns a human-readable name for a message type.
pub fn message_type_name(value: u8) -> &'static str {
    match value {
        REQUEST => "REQUEST",
        REQUEST_NO_RETURN => "REQUEST_NO_RETURN",
        NOTIFICATION => "NOTIFICATION",
        RESPONSE => "RESPONSE",
        ERROR => "ERROR",
        _ => "UNKNOWN",
    }
}

/// Returns a human-readable name for a return code.
pub fn return_code_name(value: u8) -> &'static str {
    match value {
        E_OK => "E_OK",
        E_NOT_OK => "E_NOT_OK",
        E_UNKNOWN_SERVICE => "E_UNKNOWN_SERVICE",
        E_UNKNOWN_METHOD => "E_UNKNOWN_METHOD",
        E_NOT_READY => "E_NOT_READY",
        E_NOT_REACHABLE => "E_NOT_REACHABLE",
        E_TIMEOUT => "E_TIMEOUT",
        E_WRONG_PROTOCOL_VERSION => "E_WRONG_PROTOCOL_VERSION",
        E_WRONG_INTERFACE_VERSION => "E_WRONG_INTERFACE_VERSION",
        E_MALFORMED_MESSAGE => "E_MALFORMED_MESSAGE",
        E_WRONG_MESSAGE_TYPE => "E_WRONG_MESSAGE_TYPE",
        0x0B..=0x1F => "RESERVED",
        _ => "SERVICE_SPECIFIC",
    }
}

/// Returns true if a message of this type is answered by the receiver.
pub fn expects_response(message_type: u8) -> bool {
    message_type == REQUEST
}

/// Returns true if the message type is a response or error response.
pub fn is_response(message_type: u8) -> bool {
    matches!(message_type, RESPONSE | ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_known_message_types() {
        assert_eq!(message_type_name(REQUEST), "REQUEST");
        assert_eq!(message_type_name(NOTIFICATION), "NOTIFICATION");
        assert_eq!(message_type_name(ERROR), "ERROR");
        assert_eq!(message_type_name(0x42), "UNKNOWN");
    }

    #[test]
    fn names_return_code_ranges() {
        assert_eq!(return_code_name(E_OK), "E_OK");
        assert_eq!(return_code_name(E_WRONG_MESSAGE_TYPE), "E_WRONG_MESSAGE_TYPE");
        assert_eq!(return_code_name(0x10), "RESERVED");
        assert_eq!(return_code_name(0x20), "SERVICE_SPECIFIC");
    }

    #[test]
    fn only_requests_expect_responses() {
        assert!(expects_response(REQUEST));
        assert!(!expects_response(REQUEST_NO_RETURN));
        assert!(!expects_response(NOTIFICATION));
        assert!(is_response(RESPONSE));
        assert!(is_response(ERROR));
        assert!(!is_response(REQUEST));
    }
}
