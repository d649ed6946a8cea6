use anyhow::{Context as _, Result};
use clap::Args;
use enrol_core::config::{self, ProjectConfig};
use enrol_core::store::medium::{FileMedium, KvMedium};
use enrol_core::store::{Applications, Collection, LoadOutcome, Universities};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::project::open_store;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Reinitialize: restore the default collections. An existing
    /// config.toml (and its admin credentials) is kept.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "data/admin_session.json\ndata/session_secret.json\ndata/*.tmp\n";

#[derive(Debug, Serialize)]
struct InitReport {
    project_dir: String,
    data_dir: String,
    universities: &'static str,
    applications: &'static str,
}

/// Execute `enrol init`. Creates the project skeleton:
///
/// ```text
/// .enrol/
///   config.toml     (default project config template)
///   data/           (one JSON file per collection)
///   .gitignore      (session files)
/// ```
///
/// # Errors
///
/// Returns an error if `.enrol/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let enrol_dir = project_root.join(config::PROJECT_DIR);

    if enrol_dir.exists() && !args.force {
        anyhow::bail!(".enrol/ already exists. Use `enrol init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&enrol_dir)
        .with_context(|| format!("Failed to create {}", enrol_dir.display()))?;

    let config_path = enrol_dir.join("config.toml");
    if config_path.exists() {
        tracing::debug!(path = %config_path.display(), "keeping existing config");
    } else {
        std::fs::write(&config_path, ProjectConfig::template()?)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
    }

    let gitignore_path = enrol_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let project = config::load_project_config(project_root)?;
    let medium = FileMedium::new(project.data_dir(project_root))
        .with_max_value_bytes(project.storage.max_value_bytes);
    std::fs::create_dir_all(medium.root())
        .with_context(|| format!("Failed to create {}", medium.root().display()))?;

    if args.force {
        for key in [Universities::KEY, Applications::KEY] {
            medium
                .remove(key)
                .with_context(|| format!("Failed to reset '{key}'"))?;
        }
    }

    let (_, universities) = open_store::<Universities>(medium.clone());
    let (_, applications) = open_store::<Applications>(medium.clone());
    for outcome in [&universities, &applications] {
        if let LoadOutcome::Recovered(err) = outcome {
            anyhow::bail!("{err}");
        }
    }

    tracing::info!(root = %project_root.display(), "project initialized");

    let report = InitReport {
        project_dir: enrol_dir.display().to_string(),
        data_dir: medium.root().display().to_string(),
        universities: universities.as_str(),
        applications: applications.as_str(),
    };
    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "initialized\t{}", r.project_dir)?;
            writeln!(w, "universities\t{}", r.universities)?;
            writeln!(w, "applications\t{}", r.applications)
        },
        |r, w| {
            pretty_section(w, "✓ Initialized .enrol/ project")?;
            pretty_kv(w, "Config", format!("{}/config.toml", r.project_dir))?;
            pretty_kv(w, "Data", &r.data_dir)?;
            pretty_kv(w, "Catalog", r.universities)?;
            pretty_kv(w, "Intake", r.applications)?;
            writeln!(w)?;
            writeln!(w, "Next steps:")?;
            writeln!(w, "  enrol programs                 # browse the catalog")?;
            writeln!(w, "  enrol login --username admin   # unlock admin commands")
        },
    )
}
