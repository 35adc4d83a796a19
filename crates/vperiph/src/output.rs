use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tracing::debug;
use vperiph_engine::{MessageKind, Screen, ScreenId, View};

/// Timestamp format of console entries.
const ENTRY_TIME_FORMAT: &str = "%H:%M:%S";

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

fn now() -> String {
    chrono::Local::now().format(ENTRY_TIME_FORMAT).to_string()
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    channel: &'a str,
    time: String,
    text: &'a str,
}

/// Prints the log and debug channels of the engine on stdout.
///
/// Debug entries are only shown when debugging is enabled; screen updates
/// only when `show_updates` is set, since test mode produces one per tick.
pub struct ConsoleView {
    format: OutputFormat,
    debug: bool,
    show_updates: bool,
}

impl ConsoleView {
    pub fn new(format: OutputFormat, debug: bool, show_updates: bool) -> Self {
        Self {
            format,
            debug,
            show_updates,
        }
    }

    fn entry(&self, channel: &str, text: &str) {
        match self.format {
            OutputFormat::Json => {
                let out = EntryOutput {
                    channel,
                    time: now(),
                    text,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table | OutputFormat::Pretty => {
                println!("{} {channel:<6} {text}", now());
            }
            OutputFormat::Raw => {
                print_raw(format!("{text}\n").as_bytes());
            }
        }
    }
}

impl View for ConsoleView {
    fn notify_log(&mut self, text: &str) {
        self.entry("log", text);
    }

    fn notify_debug(&mut self, text: &str) {
        if self.debug {
            self.entry("debug", text);
        }
    }

    fn activate_screen(&mut self, id: ScreenId, screen: &dyn Screen) {
        self.entry("screen", &format!("screen {id} ({}) active", screen.name()));
    }

    fn release_screen(&mut self, id: ScreenId) {
        debug!(screen = %id, "releasing screen");
    }

    fn screen_updated(&mut self, id: ScreenId, screen: &dyn Screen) {
        if self.show_updates {
            self.entry("screen", &format!("screen {id}: {}", screen.summary()));
        }
    }
}

#[derive(Serialize)]
struct LineOutput<'a> {
    direction: &'a str,
    kind: &'a str,
    line: &'a str,
    time: String,
}

fn kind_name(line: &str) -> &'static str {
    match MessageKind::classify(line) {
        MessageKind::Set => "set",
        MessageKind::Request => "request",
        MessageKind::Error => "error",
        MessageKind::Unknown => "unknown",
    }
}

/// Print lines received from the peer.
pub fn print_received(lines: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for line in lines {
                let out = LineOutput {
                    direction: "in",
                    kind: kind_name(line),
                    line,
                    time: now(),
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "KIND", "LINE"]);
            for (i, line) in lines.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    kind_name(line).to_string(),
                    line.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for line in lines {
                println!("> {line} ({})", kind_name(line));
            }
        }
        OutputFormat::Raw => {
            for line in lines {
                print_raw(format!("{line}\n").as_bytes());
            }
        }
    }
}

#[derive(Serialize)]
struct ScreenOutput<'a> {
    id: u8,
    name: &'a str,
}

/// Print the registered screens.
pub fn print_screens(screens: &[(ScreenId, &str)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<ScreenOutput<'_>> = screens
                .iter()
                .map(|(id, name)| ScreenOutput {
                    id: id.get(),
                    name: *name,
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME"]);
            for (id, name) in screens {
                table.add_row(vec![id.to_string(), name.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (id, name) in screens {
                println!("screen {id}: {name}");
            }
        }
        OutputFormat::Raw => {
            let ids: String = screens.iter().map(|(id, _)| id.as_char()).collect();
            print_raw(format!("{ids}\n").as_bytes());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_follow_classification() {
        assert_eq!(kind_name("dV03012"), "set");
        assert_eq!(kind_name("?S"), "request");
        assert_eq!(kind_name("e01?9"), "error");
        assert_eq!(kind_name("zz"), "unknown");
    }

    #[test]
    fn entry_json_shape() {
        let out = EntryOutput {
            channel: "log",
            time: "12:00:00".to_string(),
            text: "hello",
        };
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"channel":"log","time":"12:00:00","text":"hello"}"#
        );
    }
}
