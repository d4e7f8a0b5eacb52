use super::Context;
use anyhow::Result;
use colored::Colorize;

pub fn run(ctx: &mut Context, name: String, git_args: Vec<String>) -> Result<()> {
    println!("{} {}", "Committing".bold(), name.cyan());

    let done = ctx.with_project(|ws, project| ws.finalize_commit(project, &name, &git_args))?;

    println!("{}", "✓ Commit merged successfully!".green().bold());
    println!("  {}: {}", "Branch".bold(), done.branch);
    println!("  {}: {}", "Files".bold(), done.files.len());
    if done.stashed {
        println!("  {}", "Local changes were stashed and restored".dimmed());
    }

    Ok(())
}
