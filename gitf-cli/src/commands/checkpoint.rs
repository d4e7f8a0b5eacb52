use super::{report_failures, Context};
use anyhow::Result;
use colored::Colorize;
use gitf_core::Popped;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn create(ctx: &mut Context) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.blue} {msg}")?);
    spinner.set_message("Capturing checkpoint...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let created = ctx.with_project(|ws, project| ws.create_checkpoint(project));
    spinner.finish_and_clear();
    let created = created?;

    println!(
        "{} {}",
        "✓ Created checkpoint".green().bold(),
        created.id.to_string().cyan()
    );
    println!("  {}: {}", "Files".bold(), created.files.len());
    if !created.skipped.is_empty() {
        println!(
            "  {}: {}",
            "Skipped".bold(),
            created.skipped.len().to_string().dimmed()
        );
    }

    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let project = ctx.project()?;
    let mut checkpoints = ctx.workspace.list_checkpoints(project).peekable();

    if checkpoints.peek().is_none() {
        println!("{}", "No checkpoints".yellow());
        return Ok(());
    }

    println!("{}", "Checkpoints".bold().cyan());
    for summary in checkpoints {
        println!(
            "  {} {}",
            summary.id.to_string().cyan(),
            format!("({} file(s))", summary.file_count).dimmed()
        );
    }

    Ok(())
}

pub fn restore(ctx: &mut Context, amount: usize) -> Result<()> {
    let results = ctx.with_project(|ws, project| Ok(ws.restore_checkpoints(project, amount)))?;

    if results.is_empty() {
        println!("{}", "No checkpoints to restore".yellow());
        return Ok(());
    }

    let mut errors = 0;
    for result in results {
        match result {
            Ok(Popped::Restored { id, files }) => {
                println!(
                    "{} {} {}",
                    "✓ Restored checkpoint".green().bold(),
                    id.to_string().cyan(),
                    format!("({} file(s))", files.done.len()).dimmed()
                );
                errors += report_failures(&files.failed);
            }
            Ok(Popped::Incomplete { id, files }) => {
                println!(
                    "{} checkpoint {} partly restored ({} file(s)), kept for retry",
                    "!".yellow(),
                    id,
                    files.done.len()
                );
                errors += report_failures(&files.failed);
            }
            Ok(Popped::Missing { id, dir }) => {
                println!(
                    "{} checkpoint {} had no snapshot at {}, dropped it",
                    "!".yellow(),
                    id,
                    dir.display()
                );
            }
            Err(e) => {
                eprintln!("{} {}", "✗".red(), e);
                errors += 1;
            }
        }
    }

    if errors > 0 {
        anyhow::bail!("{} error(s) while restoring checkpoints", errors);
    }

    Ok(())
}
