use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use somewire_frame::{
    Field, Header, HeaderBuilder, ERROR, NOTIFICATION, REQUEST, REQUEST_NO_RETURN, RESPONSE,
};

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::{parse_hex, OutputFormat};

pub mod decode;
pub mod echo;
pub mod encode;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a frame and print its wire bytes.
    Encode(EncodeArgs),
    /// Decode one datagram and print its fields.
    Decode(DecodeArgs),
    /// Send a frame over UDP and print the reply.
    Send(SendArgs),
    /// Answer requests over UDP with their own payload.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Echo(args) => echo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Header fields. Values are checked against their wire width when the
/// frame is built, so `--service 0x10000` is reported rather than truncated.
#[derive(Args, Debug, Default)]
pub struct HeaderArgs {
    /// Service id (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_number)]
    pub service: Option<u64>,
    /// Method id.
    #[arg(long, value_parser = parse_number)]
    pub method: Option<u64>,
    /// Client id.
    #[arg(long, value_parser = parse_number)]
    pub client: Option<u64>,
    /// Session id.
    #[arg(long, value_parser = parse_number)]
    pub session: Option<u64>,
    /// Protocol version [default: 1].
    #[arg(long, value_parser = parse_number)]
    pub protocol_version: Option<u64>,
    /// Interface version [default: 0].
    #[arg(long, value_parser = parse_number)]
    pub interface_version: Option<u64>,
    /// Message type: request, request-no-return, notification, response,
    /// error, or a number [default: request].
    #[arg(long, value_parser = parse_message_type)]
    pub message_type: Option<u64>,
    /// Return code [default: 0].
    #[arg(long, value_parser = parse_number)]
    pub return_code: Option<u64>,
}

impl HeaderArgs {
    pub fn builder(&self) -> HeaderBuilder {
        [
            (Field::ServiceId, self.service),
            (Field::MethodId, self.method),
            (Field::ClientId, self.client),
            (Field::SessionId, self.session),
            (Field::ProtocolVersion, self.protocol_version),
            (Field::InterfaceVersion, self.interface_version),
            (Field::MessageType, self.message_type),
            (Field::ReturnCode, self.return_code),
        ]
        .into_iter()
        .fold(Header::builder(), |builder, (field, value)| match value {
            Some(value) => builder.set(field, value),
            None => builder,
        })
    }

    pub fn build(&self) -> CliResult<Header> {
        self.builder()
            .build()
            .map_err(|err| CliError::new(USAGE, format!("invalid header: {err}")))
    }
}

#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// Payload as a UTF-8 string.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Payload as hex bytes (e.g. "de ad be ef").
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read the payload from a file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    /// The payload bytes; empty when no source was given.
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(hex) = &self.hex {
            return parse_hex(hex).map_err(|err| CliError::new(USAGE, format!("--hex: {err}")));
        }
        if let Some(path) = &self.file {
            return fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
        }
        Ok(Vec::new())
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub header: HeaderArgs,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Datagram as hex bytes.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read the datagram from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Reject frames whose payload exceeds this many bytes.
    #[arg(long)]
    pub max_payload: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Remote address (e.g. 127.0.0.1:30490).
    pub addr: SocketAddr,
    #[command(flatten)]
    pub header: HeaderArgs,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Maximum time to wait for the reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", env = "SOMEWIRE_TIMEOUT")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Local address to bind (port 0 picks a free port).
    pub addr: SocketAddr,
    /// Exit after sending N replies.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a decimal or `0x`-prefixed hex integer.
pub fn parse_number(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid number: {input}"))
}

/// Parse a message type by name or number.
pub fn parse_message_type(input: &str) -> Result<u64, String> {
    let named = match input.trim().to_ascii_lowercase().as_str() {
        "request" => Some(REQUEST),
        "request-no-return" => Some(REQUEST_NO_RETURN),
        "notification" => Some(NOTIFICATION),
        "response" => Some(RESPONSE),
        "error" => Some(ERROR),
        _ => None,
    };
    match named {
        Some(value) => Ok(value.into()),
        None => parse_number(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_accepts_decimal_and_hex() {
        assert_eq!(parse_number("42").unwrap(), 42);
        assert_eq!(parse_number("0x002A").unwrap(), 42);
        assert_eq!(parse_number("0XFFFF").unwrap(), 0xFFFF);
        assert!(parse_number("0x").is_err());
        assert!(parse_number("-1").is_err());
    }

    #[test]
    fn parse_message_type_accepts_names() {
        assert_eq!(parse_message_type("notification").unwrap(), 0x02);
        assert_eq!(parse_message_type("RESPONSE").unwrap(), 0x80);
        assert_eq!(parse_message_type("0x81").unwrap(), 0x81);
        assert!(parse_message_type("event").is_err());
    }

    #[test]
    fn header_args_fill_only_given_fields() {
        let args = HeaderArgs {
            service: Some(0x1234),
            session: Some(7),
            ..HeaderArgs::default()
        };
        let header = args.build().unwrap();
        assert_eq!(header.service_id(), 0x1234);
        assert_eq!(header.session_id(), 7);
        assert_eq!(header.protocol_version(), 1);
        assert_eq!(header.message_type(), REQUEST);
    }

    #[test]
    fn oversized_header_field_is_a_usage_error() {
        let args = HeaderArgs {
            method: Some(0x1_0000),
            ..HeaderArgs::default()
        };
        let err = args.build().unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("method_id must be 2 bytes"));
    }

    #[test]
    fn payload_sources() {
        assert!(PayloadArgs::default().resolve().unwrap().is_empty());

        let args = PayloadArgs {
            data: Some("hi".into()),
            ..PayloadArgs::default()
        };
        assert_eq!(args.resolve().unwrap(), b"hi");

        let args = PayloadArgs {
            hex: Some("de ad".into()),
            ..PayloadArgs::default()
        };
        assert_eq!(args.resolve().unwrap(), vec![0xDE, 0xAD]);

        let args = PayloadArgs {
            hex: Some("xyz".into()),
            ..PayloadArgs::default()
        };
        assert_eq!(args.resolve().unwrap_err().code, USAGE);
    }
}
