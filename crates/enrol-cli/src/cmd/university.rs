//! `enrol university ...`: admin catalog management.
//!
//! Every subcommand requires an admin session (`enrol login`). Mutations
//! are validated before anything is persisted and are refused while the
//! stored catalog is unreadable.

use anyhow::Context as _;
use clap::{Args, Subcommand};
use enrol_core::catalog::{self, CatalogError, CatalogStats, UniversityFilter};
use enrol_core::model::{Program, University};
use enrol_core::store::StoreError;
use serde::Serialize;
use std::io::{self, IsTerminal, Read as _, Write};
use std::path::{Path, PathBuf};

use crate::output::{
    CliError, OutputMode, Renderable, fail, pretty_kv, pretty_rule, pretty_section, render,
    render_list, render_mode, render_success, write_json,
};
use crate::project::{Project, ensure_writable};

#[derive(Subcommand, Debug)]
pub enum UniversityCommand {
    #[command(
        about = "List universities",
        after_help = "EXAMPLES:\n    # Everything in the catalog\n    enrol university list\n\n    # Filter by text and country\n    enrol university list --search tech --country Lithuania"
    )]
    List(ListArgs),

    #[command(
        about = "Show one university",
        after_help = "EXAMPLES:\n    # By stable id\n    enrol university show uni-ktu\n\n    # By exact name\n    enrol university show \"Kaunas University of Technology\""
    )]
    Show(KeyArg),

    #[command(
        about = "Add a university",
        long_about = "Add a university. At least one program is required; each --program takes five '|'-separated fields.",
        after_help = "EXAMPLES:\n    enrol university add --name \"Riga Technical University\" --logo https://example.com/rtu.png \\\n        --description \"Oldest technical university in the Baltics\" --location Riga --country Latvia \\\n        --program \"Computer Science|3 years|English|€4,000/year|September\" --feature \"Modern campus\""
    )]
    Add(UniversityFields),

    #[command(
        about = "Edit a university",
        long_about = "Edit a university in place. Only the given fields change. --program replaces the whole program list.",
        after_help = "EXAMPLES:\n    # Rename\n    enrol university edit uni-ktu --name \"KTU\"\n\n    # Add and drop programs\n    enrol university edit uni-ktu --add-program \"Robotics|2 years|English|€5,000/year|September\" --remove-program \"Civil Engineering\""
    )]
    Edit(EditArgs),

    #[command(
        about = "Delete a university",
        after_help = "EXAMPLES:\n    enrol university delete uni-ktu --force"
    )]
    Delete(DeleteArgs),

    #[command(
        about = "Replace the catalog from a JSON file",
        long_about = "Replace the whole catalog with a JSON array of universities. The file is checked before anything is written.",
        after_help = "EXAMPLES:\n    enrol university import catalog.json\n\n    # From stdin\n    enrol university export | enrol university import -"
    )]
    Import(ImportArgs),

    #[command(
        about = "Write the catalog as JSON",
        after_help = "EXAMPLES:\n    enrol university export --output catalog.json"
    )]
    Export(ExportArgs),

    #[command(about = "Catalog counters", after_help = "EXAMPLES:\n    enrol university stats --json")]
    Stats,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive text matched against name, description and program titles.
    #[arg(long, short)]
    pub search: Option<String>,

    #[arg(long)]
    pub country: Option<String>,
}

#[derive(Args, Debug)]
pub struct KeyArg {
    /// University id, or exact name for records without one.
    pub university: String,
}

#[derive(Args, Debug, Default)]
pub struct UniversityFields {
    #[arg(long)]
    pub name: Option<String>,

    /// Logo URL.
    #[arg(long)]
    pub logo: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// City.
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    /// Selling point (repeatable). Replaces all features when given.
    #[arg(long = "feature", value_name = "TEXT")]
    pub features: Vec<String>,

    /// Program as "title|duration|language|tuition|intake" (repeatable).
    #[arg(long = "program", value_name = "PROGRAM", value_parser = parse_program)]
    pub programs: Vec<Program>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// University id, or exact name for records without one.
    pub university: String,

    #[command(flatten)]
    pub fields: UniversityFields,

    /// Append a program (repeatable).
    #[arg(long = "add-program", value_name = "PROGRAM", value_parser = parse_program)]
    pub add_programs: Vec<Program>,

    /// Remove the program with this exact title (repeatable).
    #[arg(long = "remove-program", value_name = "TITLE")]
    pub remove_programs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// University id, or exact name for records without one.
    pub university: String,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file to read, or `-` for stdin.
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output path (defaults to stdout).
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Parse `title|duration|language|tuition|intake`.
fn parse_program(raw: &str) -> Result<Program, String> {
    let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [title, duration, language, tuition, intake] => {
            Ok(Program::new(*title, *duration, *language, *tuition, *intake))
        }
        _ => Err(format!(
            "expected 5 '|'-separated fields (title|duration|language|tuition|intake), got {}",
            parts.len()
        )),
    }
}

impl UniversityFields {
    /// Overwrite the fields that were given on the command line.
    fn apply_to(&self, university: &mut University) {
        let set = |target: &mut String, value: Option<&String>| {
            if let Some(value) = value {
                target.clone_from(value);
            }
        };
        set(&mut university.name, self.name.as_ref());
        set(&mut university.logo, self.logo.as_ref());
        set(&mut university.description, self.description.as_ref());
        set(&mut university.location, self.location.as_ref());
        set(&mut university.country, self.country.as_ref());
        if !self.features.is_empty() {
            university.features.clone_from(&self.features);
        }
        if !self.programs.is_empty() {
            university.programs.clone_from(&self.programs);
        }
    }
}

fn catalog_failure(output: OutputMode, err: &CatalogError) -> anyhow::Error {
    let error = match err {
        CatalogError::Invalid(fields) => {
            CliError::coded("invalid university", err.code()).with_fields(fields)
        }
        other => CliError::coded(other.to_string(), other.code()),
    };
    fail(output, error)
}

fn confirm_delete(name: &str) -> anyhow::Result<bool> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("Delete '{name}' and all its programs? [y/N] ");
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

struct UniversityRow<'a>(&'a University);

impl Renderable for UniversityRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let u = self.0;
        writeln!(w, "{}  [{}]", u.name, u.key())?;
        writeln!(w, "  {} · {} programs", u.location, u.programs.len())?;
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self.0)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let u = self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            u.id,
            u.name,
            u.country,
            u.location,
            u.programs.len()
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "NAME", "COUNTRY", "LOCATION", "PROGRAMS"]
    }
}

fn write_university(u: &University, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &u.name)?;
    pretty_kv(w, "Id", if u.id.is_empty() { "(none)" } else { u.id.as_str() })?;
    pretty_kv(w, "Location", &u.location)?;
    pretty_kv(w, "Country", &u.country)?;
    pretty_kv(w, "Logo", &u.logo)?;
    writeln!(w)?;
    writeln!(w, "{}", u.description)?;
    if !u.features.is_empty() {
        writeln!(w)?;
        for feature in &u.features {
            writeln!(w, "  • {feature}")?;
        }
    }
    writeln!(w)?;
    writeln!(w, "Programs ({})", u.programs.len())?;
    pretty_rule(w)?;
    for p in &u.programs {
        writeln!(w, "{}", p.title)?;
        writeln!(w, "  {} · {} · {} · intake {}", p.duration, p.language, p.tuition, p.intake)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Stats {
    #[serde(flatten)]
    counts: CatalogStats,
    country_names: Vec<String>,
    languages: Vec<String>,
}

/// Execute `enrol university <command>`.
pub fn run_university(
    command: &UniversityCommand,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let session = project.require_admin(output)?;
    tracing::debug!(user = %session.username, "admin catalog command");

    let mut store = project.universities();

    match command {
        UniversityCommand::List(args) => {
            let filter = UniversityFilter {
                search: args.search.clone().unwrap_or_default(),
                country: args.country.clone(),
            };
            let rows: Vec<UniversityRow<'_>> = filter
                .apply(store.records())
                .into_iter()
                .map(UniversityRow)
                .collect();
            render_list(&rows, output)?;
            Ok(())
        }
        UniversityCommand::Show(args) => {
            let university = catalog::find_university(store.records(), &args.university)
                .map_err(|err| catalog_failure(output, &err))?;
            render_mode(
                output,
                university,
                |u, w| writeln!(w, "{}\t{}\t{}", u.id, u.name, u.programs.len()),
                |u, w| write_university(u, w),
            )
        }
        UniversityCommand::Add(fields) => {
            ensure_writable(&store, output)?;
            let mut university = catalog::draft_university();
            fields.apply_to(&mut university);
            let key = catalog::add_university(&mut store, university)
                .map_err(|err| catalog_failure(output, &err))?;
            render_success(output, &format!("Added university {key}"))
        }
        UniversityCommand::Edit(args) => {
            ensure_writable(&store, output)?;
            let original = catalog::find_university(store.records(), &args.university)
                .map_err(|err| catalog_failure(output, &err))?;
            let key = original.key();
            let mut edited = original.clone();
            args.fields.apply_to(&mut edited);
            edited
                .programs
                .retain(|p| !args.remove_programs.contains(&p.title));
            edited.programs.extend(args.add_programs.iter().cloned());

            catalog::update_university(&mut store, &key, edited)
                .map_err(|err| catalog_failure(output, &err))?;
            render_success(output, &format!("Updated university {key}"))
        }
        UniversityCommand::Delete(args) => {
            ensure_writable(&store, output)?;
            let target = catalog::find_university(store.records(), &args.university)
                .map_err(|err| catalog_failure(output, &err))?;
            let (key, name) = (target.key(), target.name.clone());
            if !args.force && !confirm_delete(&name)? {
                return render_success(output, "Delete cancelled");
            }
            catalog::delete_university(&mut store, &key)
                .map_err(|err| catalog_failure(output, &err))?;
            render_success(output, &format!("Deleted '{name}'"))
        }
        UniversityCommand::Import(args) => {
            ensure_writable(&store, output)?;
            let raw = read_input(&args.file)?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", args.file.display()))?;
            store.replace_json(value).map_err(|err| {
                let message = match &err {
                    StoreError::Validation { source, .. } => format!("import rejected: {source}"),
                    other => other.to_string(),
                };
                fail(output, CliError::coded(message, err.code()))
            })?;
            render_success(
                output,
                &format!("Imported {} universities", store.records().len()),
            )
        }
        UniversityCommand::Export(args) => {
            let json = serde_json::to_string_pretty(store.records())?;
            match &args.output {
                Some(path) => {
                    std::fs::write(path, format!("{json}\n"))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    render_success(output, &format!("Exported to {}", path.display()))
                }
                None => {
                    println!("{json}");
                    Ok(())
                }
            }
        }
        UniversityCommand::Stats => {
            let stats = Stats {
                counts: catalog::stats(store.records()),
                country_names: catalog::countries(store.records()),
                languages: catalog::languages(store.records()),
            };
            render(output, &stats, |s, w| {
                pretty_kv(w, "Universities", s.counts.universities.to_string())?;
                pretty_kv(w, "Programs", s.counts.programs.to_string())?;
                pretty_kv(w, "Countries", s.country_names.join(", "))?;
                pretty_kv(w, "Languages", s.languages.join(", "))
            })
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: UniversityCommand,
    }

    #[test]
    fn program_spec_parses_five_fields() {
        let program = parse_program("Data Science | 2 years | English | €4,000/year | September")
            .expect("parse");
        assert_eq!(program.title, "Data Science");
        assert_eq!(program.tuition, "€4,000/year");
        assert!(parse_program("Data Science|2 years").is_err());
    }

    #[test]
    fn empty_program_fields_are_left_to_validation() {
        let program = parse_program("||||").expect("parse");
        assert_eq!(program, Program::default());
    }

    #[test]
    fn apply_to_only_overwrites_given_fields() {
        let mut uni = enrol_core::seed::universities().remove(0);
        let before = uni.clone();
        let fields = UniversityFields {
            name: Some("Renamed".into()),
            ..UniversityFields::default()
        };
        fields.apply_to(&mut uni);
        assert_eq!(uni.name, "Renamed");
        assert_eq!(uni.description, before.description);
        assert_eq!(uni.programs, before.programs);
        assert_eq!(uni.features, before.features);
    }

    #[test]
    fn edit_args_parse() {
        let w = Wrapper::parse_from([
            "university",
            "edit",
            "uni-ktu",
            "--name",
            "KTU",
            "--add-program",
            "Robotics|2 years|English|€5,000/year|September",
            "--remove-program",
            "Civil Engineering",
        ]);
        let UniversityCommand::Edit(args) = w.command else {
            panic!("expected edit");
        };
        assert_eq!(args.university, "uni-ktu");
        assert_eq!(args.fields.name.as_deref(), Some("KTU"));
        assert_eq!(args.add_programs[0].title, "Robotics");
        assert_eq!(args.remove_programs, ["Civil Engineering"]);
    }

    #[test]
    fn bad_program_spec_is_a_parse_error() {
        assert!(Wrapper::try_parse_from(["university", "add", "--program", "only-title"]).is_err());
    }
}
