use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;
use vperiph_frame::{FrameError, LineReader, LineWriter};
use vperiph_transport::{Link, TransportError};

use crate::cmd::SendArgs;
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_received, OutputFormat};

/// Pause between two polls while collecting replies.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = args.wait.as_deref().map(parse_duration).transpose()?;
    let mut link = args.link.open()?;

    LineWriter::new()
        .send(&mut link, &args.line)
        .map_err(|err| frame_error("send failed", err))?;

    if let Some(wait) = wait {
        let lines = collect_replies(&mut link, wait)
            .map_err(|err| frame_error("receive failed", err))?;
        print_received(&lines, format);
    }

    Ok(SUCCESS)
}

/// Read reply lines until `wait` has passed or the peer hangs up.
fn collect_replies<L: Link>(link: &mut L, wait: Duration) -> Result<Vec<String>, FrameError> {
    let mut reader = LineReader::new();
    let mut lines = Vec::new();
    let deadline = Instant::now() + wait;

    while Instant::now() < deadline {
        match reader.poll(link) {
            Ok(batch) => lines.extend(batch.into_iter().map(|line| line.into_string())),
            Err(FrameError::Transport(TransportError::Disconnected)) => {
                debug!("peer closed the link");
                break;
            }
            Err(err) => return Err(err),
        }
        thread::sleep(POLL_INTERVAL);
    }
    Ok(lines)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
