use super::{report_failures, stage::print_staged, Context};
use anyhow::Result;
use colored::Colorize;
use gitf_core::expand_file_args;

pub fn run(ctx: &mut Context, name: String, files: Vec<String>) -> Result<()> {
    let files = expand_file_args(&ctx.cwd, &files)?;
    let batch = ctx.with_project(|ws, project| ws.create_commit(project, &name, &files))?;

    println!("{} {}", "✓ Created commit".green().bold(), name.cyan());
    print_staged(&batch.done);
    if report_failures(&batch.failed) > 0 {
        anyhow::bail!("{} file(s) could not be staged", batch.failed.len());
    }

    Ok(())
}
