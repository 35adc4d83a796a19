use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info};
use vperiph_engine::Engine;

use crate::cmd::RunArgs;
use crate::exit::{engine_error, CliError, CliResult, SUCCESS};
use crate::output::{ConsoleView, OutputFormat};

/// `-v` level from which every screen update is printed.
const SHOW_UPDATES_VERBOSITY: u8 = 3;

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.engine_config();
    let link = args.link.open()?;
    let view = ConsoleView::new(
        format,
        config.debug,
        args.verbose >= SHOW_UPDATES_VERBOSITY,
    );

    let mut engine =
        Engine::new(link, view, config).map_err(|err| engine_error("startup failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    match engine.run(&running, args.ticks) {
        Ok(ticks) => {
            info!(ticks, screen = %engine.active_screen(), "stopped");
            Ok(SUCCESS)
        }
        Err(err) => {
            error!(tick = engine.ticks(), %err, "transport loop failed");
            Err(engine_error("transport loop failed", err))
        }
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
