use super::Context;
use anyhow::Result;
use chrono::Local;
use colored::Colorize;

pub fn run(ctx: &Context) -> Result<()> {
    let project = ctx.project()?;

    println!("{} {}", "Project".bold().cyan(), project.name);
    println!("  {}: {}", "Root".bold(), project.file_path.display());
    println!(
        "  {}: {}",
        "Checkpoints".bold(),
        project.checkpoints.len()
    );
    println!();

    let mut commits = project.list_commits().peekable();
    if commits.peek().is_none() {
        println!("{}", "No commits".yellow());
        return Ok(());
    }

    for summary in commits {
        println!(
            "  {} {} {}",
            summary.name.cyan(),
            format!("({} file(s))", summary.file_count).dimmed(),
            summary
                .created
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed()
        );
    }

    Ok(())
}
