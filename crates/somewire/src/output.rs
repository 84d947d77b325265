use std::io::{IsTerminal, Write};
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use somewire_frame::{message_type_name, return_code_name, Frame};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    message_id: String,
    request_id: String,
    service_id: u16,
    method_id: u16,
    length: u32,
    client_id: u16,
    session_id: u16,
    protocol_version: u8,
    interface_version: u8,
    message_type: u8,
    message_type_name: &'a str,
    return_code: u8,
    return_code_name: &'a str,
    payload_size: usize,
    payload: String,
    payload_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    peer: Option<String>,
    timestamp: String,
}

impl<'a> FrameOutput<'a> {
    fn new(frame: &'a Frame, peer: Option<SocketAddr>) -> Self {
        let header = frame.header();
        Self {
            message_id: frame.message_id().to_string(),
            request_id: frame.request_id().to_string(),
            service_id: header.service_id(),
            method_id: header.method_id(),
            length: frame.length(),
            client_id: header.client_id(),
            session_id: header.session_id(),
            protocol_version: header.protocol_version(),
            interface_version: header.interface_version(),
            message_type: header.message_type(),
            message_type_name: message_type_name(header.message_type()),
            return_code: header.return_code(),
            return_code_name: return_code_name(header.return_code()),
            payload_size: frame.payload().len(),
            payload: payload_preview(frame.payload()),
            payload_hex: to_hex(frame.payload(), ""),
            peer: peer.map(|addr| addr.to_string()),
            timestamp: now_unix_seconds(),
        }
    }
}

#[derive(Serialize)]
struct WireOutput {
    size: usize,
    hex: String,
}

pub fn print_frame(frame: &Frame, peer: Option<SocketAddr>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput::new(frame, peer);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            println!("{}", frame_table(frame, peer));
        }
        OutputFormat::Pretty => {
            let peer = peer.map(|addr| format!(" peer={addr}")).unwrap_or_default();
            println!(
                "{} size={}{} payload={}",
                frame.header(),
                frame.payload().len(),
                peer,
                payload_preview(frame.payload())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload());
        }
    }
}

/// Print encoded wire bytes.
pub fn print_wire(wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = WireOutput {
                size: wire.len(),
                hex: to_hex(wire, ""),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", to_hex(wire, " ")),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn frame_table(frame: &Frame, peer: Option<SocketAddr>) -> Table {
    let header = frame.header();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["FIELD", "VALUE"])
        .add_row(vec!["message_id".to_string(), frame.message_id().to_string()])
        .add_row(vec!["request_id".to_string(), frame.request_id().to_string()])
        .add_row(vec!["length".to_string(), frame.length().to_string()])
        .add_row(vec![
            "protocol_version".to_string(),
            header.protocol_version().to_string(),
        ])
        .add_row(vec![
            "interface_version".to_string(),
            header.interface_version().to_string(),
        ])
        .add_row(vec![
            "message_type".to_string(),
            format!(
                "0x{:02X} {}",
                header.message_type(),
                message_type_name(header.message_type())
            ),
        ])
        .add_row(vec![
            "return_code".to_string(),
            format!(
                "0x{:02X} {}",
                header.return_code(),
                return_code_name(header.return_code())
            ),
        ])
        .add_row(vec![
            "payload".to_string(),
            payload_preview(frame.payload()),
        ]);
    if let Some(peer) = peer {
        table.add_row(vec!["peer".to_string(), peer.to_string()]);
    }
    table
}

/// Lowercase hex, bytes joined by `sep`.
pub fn to_hex(data: &[u8], sep: &str) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Parse hex input. Whitespace, `:` separators and a leading `0x` are ignored.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = trimmed
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn hex_digit(b: u8) -> Result<u8, String> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(format!("invalid hex digit '{}'", b as char)),
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
