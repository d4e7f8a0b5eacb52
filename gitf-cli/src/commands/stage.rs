use super::{report_failures, Context};
use anyhow::Result;
use colored::Colorize;
use gitf_core::{expand_file_args, Revert, StagedFile};

pub fn run(ctx: &mut Context, name: String, files: Vec<String>) -> Result<()> {
    let files = expand_file_args(&ctx.cwd, &files)?;
    let batch = ctx.with_project(|ws, project| ws.stage_files(project, &name, &files))?;

    print_staged(&batch.done);
    if report_failures(&batch.failed) > 0 {
        anyhow::bail!("{} file(s) could not be staged", batch.failed.len());
    }

    Ok(())
}

pub fn print_staged(staged: &[StagedFile]) {
    for file in staged {
        let verb = if file.newly_listed {
            "staged"
        } else {
            "refreshed"
        };
        println!("  {} {} {}", "+".green(), verb, file.source.display());

        match &file.revert {
            Revert::Checkpoint {
                id,
                restored,
                failed,
            } => {
                println!(
                    "    {}",
                    format!("checkpoint {} restored ({} file(s))", id, restored).dimmed()
                );
                if *failed > 0 {
                    println!(
                        "    {} {} file(s) not restored, checkpoint {} kept",
                        "!".yellow(),
                        failed,
                        id
                    );
                }
            }
            Revert::Discarded => {}
            Revert::Failed(reason) => println!(
                "    {} working copy not reverted: {}",
                "!".yellow(),
                reason
            ),
        }
    }
}
