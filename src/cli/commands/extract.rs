use anyhow::Result;

use super::super::args::ExtractCommand;
use super::{CommandResult, CommandSummary};
use crate::core::{ExtractContext, Pipeline};

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ctx = ExtractContext::new(&args.common)?;
    let generator = ctx.generator();

    let report = Pipeline::new(&ctx, generator.as_ref()).run(args.apply)?;
    let error_count = report.failed_locales().count();

    Ok(CommandResult {
        summary: CommandSummary::Extract(report),
        error_count,
    })
}
