use std::io::IsTerminal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mavwire_decoder::Statistics;
use mavwire_frame::Frame;
use mavwire_message::{catalog, CatalogEntry, Message, Source};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
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
struct MessageOutput<'a> {
    kind: &'static str,
    system_id: u8,
    component_id: u8,
    message_id: u32,
    message: &'a Message,
}

#[derive(Serialize)]
struct StatisticsOutput {
    kind: &'static str,
    #[serde(flatten)]
    stats: Statistics,
    message_ids: Vec<u32>,
}

#[derive(Serialize)]
struct FrameOutput {
    kind: &'static str,
    version: String,
    sequence: u8,
    system_id: u8,
    component_id: u8,
    message_id: u32,
    name: Option<&'static str>,
    payload_len: usize,
    signed: bool,
}

#[derive(Serialize)]
struct CatalogOutput {
    id: u32,
    name: &'static str,
    payload_len: usize,
    crc_extra: u8,
}

/// Prints decoded messages as they arrive.
///
/// JSON and pretty output stream one line per message; table output is
/// buffered and printed by [`MessageSink::finish`]. With a limit set, messages
/// past the limit are dropped.
pub struct MessageSink {
    format: OutputFormat,
    limit: Option<usize>,
    rows: Mutex<Vec<Vec<String>>>,
    emitted: AtomicUsize,
}

impl MessageSink {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            limit: None,
            rows: Mutex::new(Vec::new()),
            emitted: AtomicUsize::new(0),
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn emit(&self, source: Source, message: &Message) {
        let admitted = self
            .emitted
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |emitted| match self.limit {
                Some(limit) if emitted >= limit => None,
                _ => Some(emitted + 1),
            })
            .is_ok();
        if !admitted {
            return;
        }
        match self.format {
            OutputFormat::Json => {
                let out = MessageOutput {
                    kind: "message",
                    system_id: source.system_id,
                    component_id: source.component_id,
                    message_id: message.id(),
                    message,
                };
                println!("{}", to_json(&out));
            }
            OutputFormat::Pretty => {
                println!(
                    "[{}:{}] {} {}",
                    source.system_id,
                    source.component_id,
                    message.name(),
                    fields_of(message)
                );
            }
            OutputFormat::Table => {
                let row = vec![
                    source.system_id.to_string(),
                    source.component_id.to_string(),
                    message.id().to_string(),
                    message.name().to_string(),
                    fields_of(message),
                ];
                if let Ok(mut rows) = self.rows.lock() {
                    rows.push(row);
                }
            }
        }
    }

    /// Messages emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::SeqCst)
    }

    /// True once the limit has been reached.
    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.emitted() >= limit)
    }

    pub fn finish(&self) {
        if !matches!(self.format, OutputFormat::Table) {
            return;
        }
        let rows = match self.rows.lock() {
            Ok(mut rows) => std::mem::take(&mut *rows),
            Err(_) => return,
        };
        if rows.is_empty() {
            return;
        }
        let mut table = new_table(vec!["SYS", "COMP", "ID", "MESSAGE", "FIELDS"]);
        for row in rows {
            table.add_row(row);
        }
        println!("{table}");
    }
}

pub fn print_statistics(stats: Statistics, message_ids: Vec<u32>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatisticsOutput {
                kind: "statistics",
                stats,
                message_ids,
            };
            println!("{}", to_json(&out));
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["RECEIVED", "DROPPED", "PARSE ERRORS", "BYTES", "IDS"]);
            table.add_row(vec![
                stats.received.to_string(),
                stats.dropped.to_string(),
                stats.parse_errors.to_string(),
                stats.bytes_received.to_string(),
                join_ids(&message_ids),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "received={} dropped={} parse_errors={} bytes={} ids=[{}]",
                stats.received,
                stats.dropped,
                stats.parse_errors,
                stats.bytes_received,
                join_ids(&message_ids)
            );
        }
    }
}

pub fn print_frames(frames: &[Frame], format: OutputFormat) {
    let outputs = frames.iter().map(|frame| FrameOutput {
        kind: "frame",
        version: frame.version().to_string(),
        sequence: frame.sequence(),
        system_id: frame.system_id(),
        component_id: frame.component_id(),
        message_id: frame.message_id(),
        name: catalog::lookup(frame.message_id()).map(|entry| entry.name),
        payload_len: frame.payload.len(),
        signed: frame.header.is_signed(),
    });

    match format {
        OutputFormat::Json => {
            for out in outputs {
                println!("{}", to_json(&out));
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["VER", "SEQ", "SYS", "COMP", "ID", "NAME", "LEN"]);
            for out in outputs {
                table.add_row(vec![
                    out.version,
                    out.sequence.to_string(),
                    out.system_id.to_string(),
                    out.component_id.to_string(),
                    out.message_id.to_string(),
                    out.name.unwrap_or("-").to_string(),
                    out.payload_len.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for out in outputs {
                println!(
                    "{} seq={} [{}:{}] id={} {} len={}{}",
                    out.version,
                    out.sequence,
                    out.system_id,
                    out.component_id,
                    out.message_id,
                    out.name.unwrap_or("-"),
                    out.payload_len,
                    if out.signed { " signed" } else { "" }
                );
            }
        }
    }
}

pub fn print_catalog(entries: &[CatalogEntry], format: OutputFormat) {
    let outputs: Vec<CatalogOutput> = entries
        .iter()
        .map(|entry| CatalogOutput {
            id: entry.id,
            name: entry.name,
            payload_len: entry.payload_len,
            crc_extra: entry.crc_extra,
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", to_json(&outputs)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "NAME", "LEN", "CRC_EXTRA"]);
            for out in outputs {
                table.add_row(vec![
                    out.id.to_string(),
                    out.name.to_string(),
                    out.payload_len.to_string(),
                    out.crc_extra.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for out in outputs {
                println!(
                    "{:>4} {:<22} len={:<3} crc_extra={}",
                    out.id, out.name, out.payload_len, out.crc_extra
                );
            }
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Record fields as compact JSON, without the type tag.
fn fields_of(message: &Message) -> String {
    match serde_json::to_value(message) {
        Ok(Value::Object(mut fields)) => {
            fields.remove("type");
            Value::Object(fields).to_string()
        }
        _ => "{}".to_string(),
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
