//! `enrol check`: load every collection and report its health.

use clap::Args;
use enrol_core::store::medium::{FileMedium, KvMedium};
use enrol_core::store::{Applications, Collection, LoadOutcome, Phase, Universities};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::output::{OutputMode, Renderable, render_list, write_json};
use crate::project::{Project, open_store};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Reset collections that cannot be read to their defaults.
    #[arg(long)]
    pub repair: bool,
}

#[derive(Debug, Serialize)]
struct CheckEntry {
    key: &'static str,
    outcome: &'static str,
    phase: &'static str,
    records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    repaired: bool,
}

impl CheckEntry {
    fn ok(&self) -> bool {
        self.phase == Phase::Ready.as_str()
    }
}

impl Renderable for CheckEntry {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let mark = if self.ok() { "✓" } else { "✗" };
        writeln!(
            w,
            "{mark} {:<14} {:<10} {} records",
            self.key, self.outcome, self.records
        )?;
        if let Some(detail) = &self.detail {
            writeln!(w, "    {detail}")?;
        }
        if self.repaired {
            writeln!(w, "    reset to defaults")?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            self.key,
            self.outcome,
            self.phase,
            self.records,
            self.detail.as_deref().unwrap_or("")
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["KEY", "OUTCOME", "PHASE", "RECORDS", "DETAIL"]
    }
}

fn check_collection<C: Collection>(medium: &FileMedium, repair: bool) -> anyhow::Result<CheckEntry> {
    let (mut store, mut outcome) = open_store::<C>(medium.clone());
    let mut repaired = false;
    if repair && matches!(outcome, LoadOutcome::Recovered(_)) {
        medium.remove(C::KEY)?;
        outcome = store.refresh();
        repaired = matches!(outcome, LoadOutcome::Seeded);
        tracing::warn!(key = C::KEY, repaired, "collection reset to defaults");
    }

    let detail = match &outcome {
        LoadOutcome::Healed(reason) => Some(format!("malformed data replaced: {reason}")),
        LoadOutcome::Recovered(err) => Some(err.to_string()),
        LoadOutcome::Loaded | LoadOutcome::Seeded => None,
    };
    Ok(CheckEntry {
        key: C::KEY,
        outcome: outcome.as_str(),
        phase: store.phase().as_str(),
        records: store.records().len(),
        detail,
        repaired,
    })
}

/// Execute `enrol check`. Fails when any collection is left unreadable.
pub fn run_check(args: &CheckArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let entries = vec![
        check_collection::<Universities>(&project.medium, args.repair)?,
        check_collection::<Applications>(&project.medium, args.repair)?,
    ];
    render_list(&entries, output)?;

    let failed: Vec<&str> = entries.iter().filter(|e| !e.ok()).map(|e| e.key).collect();
    if !failed.is_empty() {
        anyhow::bail!(
            "unreadable collections: {}; run `enrol check --repair` to reset them",
            failed.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enrol_core::config::ProjectConfig;
    use tempfile::TempDir;

    fn medium(dir: &TempDir) -> FileMedium {
        let config = ProjectConfig::default();
        FileMedium::new(config.data_dir(dir.path()))
    }

    #[test]
    fn fresh_medium_is_seeded() {
        let dir = TempDir::new().expect("tempdir");
        let entry = check_collection::<Universities>(&medium(&dir), false).expect("check");
        assert_eq!(entry.outcome, "seeded");
        assert!(entry.ok());
        assert_eq!(entry.records, 4);
    }

    #[test]
    fn repair_resets_unparseable_collection() {
        let dir = TempDir::new().expect("tempdir");
        let medium = medium(&dir);
        medium.set(Applications::KEY, "{not json").expect("corrupt");

        let entry = check_collection::<Applications>(&medium, false).expect("check");
        assert_eq!(entry.outcome, "recovered");
        assert!(!entry.ok());
        assert_eq!(medium.get(Applications::KEY).expect("get").as_deref(), Some("{not json"));

        let entry = check_collection::<Applications>(&medium, true).expect("repair");
        assert!(entry.repaired);
        assert!(entry.ok());
        assert_eq!(entry.records, 2);
    }
}
