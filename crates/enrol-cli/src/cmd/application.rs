//! `enrol application ...`: admin review of submitted applications.

use clap::{Args, Subcommand};
use enrol_core::intake::{self, ApplicationFilter, Orphan, OrphanReason};
use enrol_core::model::{Application, ApplicationStatus};
use std::io::{self, Write};
use std::path::Path;

use crate::cmd::apply::intake_failure;
use crate::output::{
    OutputMode, Renderable, pretty_kv, pretty_section, render_list, render_mode, write_json,
};
use crate::project::{Project, ensure_writable};

#[derive(Subcommand, Debug)]
pub enum ApplicationCommand {
    #[command(
        about = "List applications",
        after_help = "EXAMPLES:\n    # All applications\n    enrol application list\n\n    # Pending ones mentioning computer\n    enrol application list --status pending --search computer"
    )]
    List(ListArgs),

    #[command(
        about = "Show one application",
        after_help = "EXAMPLES:\n    enrol application show 1"
    )]
    Show(IdArg),

    #[command(
        about = "Change an application's status",
        long_about = "Move an application to pending, reviewing, accepted or rejected.",
        after_help = "EXAMPLES:\n    enrol application status 1 accepted"
    )]
    Status(StatusArgs),

    #[command(
        about = "Append a reviewer note",
        after_help = "EXAMPLES:\n    enrol application note 1 \"Transcript verified\""
    )]
    Note(NoteArgs),

    #[command(
        about = "Applications whose university or program no longer exists",
        long_about = "List applications whose recorded university or program name no longer matches the catalog, usually after a rename or delete.",
        after_help = "EXAMPLES:\n    enrol application orphans --json"
    )]
    Orphans,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive text matched against student name, email and program.
    #[arg(long, short)]
    pub search: Option<String>,

    /// Only applications in this status.
    #[arg(long)]
    pub status: Option<ApplicationStatus>,
}

#[derive(Args, Debug)]
pub struct IdArg {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    pub id: String,

    /// pending, reviewing, accepted or rejected.
    pub status: ApplicationStatus,
}

#[derive(Args, Debug)]
pub struct NoteArgs {
    pub id: String,

    pub note: String,
}

struct ApplicationRow<'a>(&'a Application);

impl Renderable for ApplicationRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let a = self.0;
        writeln!(w, "{}  {}  [{}]", a.id, a.student_name, a.status)?;
        writeln!(w, "  {} · {}", a.program, a.university)?;
        writeln!(w, "  {} · {} · {}", a.email, a.phone, a.submitted_at)?;
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self.0)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let a = self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            a.id, a.status, a.student_name, a.email, a.university, a.program
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "STATUS", "STUDENT", "EMAIL", "UNIVERSITY", "PROGRAM"]
    }
}

struct OrphanRow<'a>(&'a Orphan);

const fn reason_str(reason: OrphanReason) -> &'static str {
    match reason {
        OrphanReason::UniversityMissing => "university_missing",
        OrphanReason::ProgramMissing => "program_missing",
    }
}

impl Renderable for OrphanRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let o = self.0;
        writeln!(w, "{}  {}  ({})", o.id, o.student_name, reason_str(o.reason))?;
        writeln!(w, "  {} · {}", o.program, o.university)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self.0)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let o = self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            o.id,
            reason_str(o.reason),
            o.university,
            o.program
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "REASON", "UNIVERSITY", "PROGRAM"]
    }
}

fn write_application(a: &Application, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Application {}", a.id))?;
    pretty_kv(w, "Student", &a.student_name)?;
    pretty_kv(w, "Email", &a.email)?;
    pretty_kv(w, "Phone", &a.phone)?;
    pretty_kv(w, "University", &a.university)?;
    pretty_kv(w, "Program", &a.program)?;
    pretty_kv(w, "Status", a.status.as_str())?;
    pretty_kv(w, "Submitted", &a.submitted_at)?;
    if !a.documents.is_empty() {
        writeln!(w)?;
        writeln!(w, "Documents:")?;
        for doc in &a.documents {
            writeln!(w, "  • {}", doc.name)?;
        }
    }
    if !a.notes.is_empty() {
        writeln!(w)?;
        writeln!(w, "Notes:")?;
        for line in a.notes.lines() {
            writeln!(w, "  {line}")?;
        }
    }
    Ok(())
}

fn render_application(output: OutputMode, application: &Application) -> anyhow::Result<()> {
    render_mode(
        output,
        application,
        |a, w| writeln!(w, "{}\t{}\t{}", a.id, a.status, a.student_name),
        |a, w| write_application(a, w),
    )
}

/// Execute `enrol application <command>`.
pub fn run_application(
    command: &ApplicationCommand,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let session = project.require_admin(output)?;
    tracing::debug!(user = %session.username, "admin review command");

    let mut store = project.applications();

    match command {
        ApplicationCommand::List(args) => {
            let filter = ApplicationFilter {
                search: args.search.clone().unwrap_or_default(),
                status: args.status,
            };
            let rows: Vec<ApplicationRow<'_>> = filter
                .apply(store.records())
                .into_iter()
                .map(ApplicationRow)
                .collect();
            render_list(&rows, output)?;
            Ok(())
        }
        ApplicationCommand::Show(args) => {
            let application = intake::find_application(store.records(), &args.id)
                .map_err(|err| intake_failure(output, &err))?;
            render_application(output, application)
        }
        ApplicationCommand::Status(args) => {
            ensure_writable(&store, output)?;
            let updated = intake::set_status(&mut store, &args.id, args.status)
                .map_err(|err| intake_failure(output, &err))?;
            render_application(output, &updated)
        }
        ApplicationCommand::Note(args) => {
            ensure_writable(&store, output)?;
            let updated = intake::add_note(&mut store, &args.id, &args.note)
                .map_err(|err| intake_failure(output, &err))?;
            render_application(output, &updated)
        }
        ApplicationCommand::Orphans => {
            let universities = project.universities();
            let orphans = intake::orphans(store.records(), universities.records());
            let rows: Vec<OrphanRow<'_>> = orphans.iter().map(OrphanRow).collect();
            render_list(&rows, output)?;
            Ok(())
        }
    }
}
