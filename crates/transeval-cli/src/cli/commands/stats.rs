use super::super::args::{StatsArgs, StatsFormat};
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use transeval_core::report::markdown::{render_json, render_markdown};
use transeval_core::report::{aggregate, StoreSource};

pub fn run(args: StatsArgs) -> anyhow::Result<i32> {
    let mut sources = args.stores.clone();
    sources.extend(args.paths.iter().map(StoreSource::from_path));
    if sources.is_empty() {
        anyhow::bail!("no stores given: pass --store NAME=PATH or store paths");
    }

    let rows = aggregate(&sources)?;
    tracing::info!(requested = sources.len(), summarized = rows.len(), "stats");

    let rendered = match args.format {
        StatsFormat::Markdown => render_markdown(&rows),
        StatsFormat::Json => render_json(&rows)?,
    };

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create {}", parent.display()))?;
            }
            std::fs::write(path, &rendered)
                .with_context(|| format!("cannot write report {}", path.display()))?;
            eprintln!("Report saved to: {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(SUCCESS)
}
