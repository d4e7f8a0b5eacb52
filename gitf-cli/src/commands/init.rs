use super::Context;
use anyhow::{Context as _, Result};
use colored::Colorize;

pub fn run(ctx: &mut Context, name: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => ctx
            .cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Cannot derive a project name from the current directory")?,
    };

    let project = ctx
        .workspace
        .init_project(&mut ctx.db, &name, ctx.cwd.clone())?;
    let root = project.file_path.clone();
    ctx.save()?;

    println!("{}", "✓ Project initialized".green().bold());
    println!("  {}: {}", "Name".bold(), name);
    println!("  {}: {}", "Root".bold(), root.display());
    println!(
        "  {}: {}",
        "Storage".bold(),
        ctx.workspace.layout().root().join(&name).display()
    );

    Ok(())
}
