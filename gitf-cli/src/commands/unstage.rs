use super::{report_failures, Context};
use anyhow::Result;
use colored::Colorize;
use gitf_core::expand_file_args;

pub fn run(ctx: &mut Context, name: String, files: Vec<String>) -> Result<()> {
    let files = expand_file_args(&ctx.cwd, &files)?;
    let batch = ctx.with_project(|ws, project| ws.unstage_files(project, &name, &files))?;

    for file in &batch.done {
        println!("  {} unstaged {}", "-".red(), file.display());
    }
    if report_failures(&batch.failed) > 0 {
        anyhow::bail!("{} file(s) could not be unstaged", batch.failed.len());
    }

    Ok(())
}
