use vperiph_engine::ScreenRegistry;

use crate::cmd::ScreensArgs;
use crate::exit::{engine_error, CliResult, SUCCESS};
use crate::output::{print_screens, OutputFormat};

pub fn run(_args: ScreensArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = ScreenRegistry::with_builtin_screens()
        .map_err(|err| engine_error("screen registry failed", err))?;
    print_screens(&registry.describe(), format);
    Ok(SUCCESS)
}
