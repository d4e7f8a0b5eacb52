use super::{report_failures, Context};
use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use gitf_core::Error;

pub fn run(ctx: &mut Context, name: String, yes: bool) -> Result<()> {
    let project = ctx.project()?;
    let commit = project
        .commit(&name)
        .ok_or_else(|| Error::CommitNotFound(name.clone()))?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete commit '{}' and its {} staged file(s)?",
                name,
                commit.files().len()
            ))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    let batch = ctx.with_project(|ws, project| ws.delete_commit(project, &name))?;

    println!("{} {}", "✓ Deleted commit".green().bold(), name.cyan());
    if report_failures(&batch.failed) > 0 {
        println!(
            "{}",
            "Some staged copies could not be removed from storage".yellow()
        );
    }

    Ok(())
}
