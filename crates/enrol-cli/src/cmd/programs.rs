//! `enrol programs`: browse and filter the public program listing.

use clap::Args;
use enrol_core::catalog::{self, ProgramFilter, ProgramListing};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::output::{OutputMode, Renderable, pretty_kv, render, render_list, write_json};
use crate::project::Project;

#[derive(Args, Debug, Default)]
pub struct ProgramsArgs {
    /// Case-insensitive text matched against program title and university name.
    #[arg(long, short)]
    pub search: Option<String>,

    /// Only programs in this country (exact match).
    #[arg(long)]
    pub country: Option<String>,

    /// Only programs taught in this language (exact match).
    #[arg(long)]
    pub language: Option<String>,

    /// List the available countries and languages instead of programs.
    #[arg(long, conflicts_with_all = ["search", "country", "language"])]
    pub facets: bool,
}

struct ProgramRow<'a>(&'a ProgramListing);

impl Renderable for ProgramRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let l = self.0;
        writeln!(w, "{}", l.program.title)?;
        writeln!(w, "  {} · {}", l.university_name, l.location)?;
        writeln!(
            w,
            "  {} · {} · {} · intake {}",
            l.program.duration, l.program.language, l.program.tuition, l.program.intake
        )?;
        writeln!(w, "  apply: enrol apply '{}'", l.id)?;
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self.0)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let l = self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            l.id,
            l.program.title,
            l.university_name,
            l.country,
            l.program.language,
            l.program.duration,
            l.program.tuition,
            l.program.intake
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &[
            "ID", "TITLE", "UNIVERSITY", "COUNTRY", "LANGUAGE", "DURATION", "TUITION", "INTAKE",
        ]
    }
}

#[derive(Debug, Serialize)]
struct Facets {
    countries: Vec<String>,
    languages: Vec<String>,
}

/// Execute `enrol programs`.
pub fn run_programs(args: &ProgramsArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let store = project.universities();

    if args.facets {
        let facets = Facets {
            countries: catalog::countries(store.records()),
            languages: catalog::languages(store.records()),
        };
        return render(output, &facets, |f, w| {
            pretty_kv(w, "Countries", f.countries.join(", "))?;
            pretty_kv(w, "Languages", f.languages.join(", "))
        });
    }

    let filter = ProgramFilter {
        search: args.search.clone().unwrap_or_default(),
        country: args.country.clone(),
        language: args.language.clone(),
    };
    let listings = filter.apply(catalog::list_programs(store.records()));
    tracing::debug!(matches = listings.len(), "program search");

    if listings.is_empty() && output == OutputMode::Pretty {
        println!("No programs found matching your criteria.");
        return Ok(());
    }

    let rows: Vec<ProgramRow<'_>> = listings.iter().map(ProgramRow).collect();
    render_list(&rows, output)?;
    Ok(())
}
