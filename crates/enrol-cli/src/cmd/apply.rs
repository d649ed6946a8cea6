//! `enrol apply`: submit an application for a listed program.

use clap::Args;
use enrol_core::intake::{self, ApplicationDraft, IntakeError};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::output::{CliError, OutputMode, fail, pretty_kv, pretty_section, render_mode};
use crate::project::{Project, ensure_writable};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Program id as shown by `enrol programs`.
    pub program_id: String,

    /// Student full name.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    /// Supporting document (repeatable). Only the filename is recorded.
    #[arg(long = "document", short = 'd', value_name = "PATH")]
    pub documents: Vec<PathBuf>,
}

fn document_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Map an intake failure to a rendered CLI error.
pub fn intake_failure(output: OutputMode, err: &IntakeError) -> anyhow::Error {
    let error = match err {
        IntakeError::Invalid(fields) => {
            CliError::coded("invalid application", err.code()).with_fields(fields)
        }
        other => CliError::coded(other.to_string(), other.code()),
    };
    fail(output, error)
}

/// Execute `enrol apply`.
pub fn run_apply(args: &ApplyArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let universities = project.universities();
    let mut applications = project.applications();
    ensure_writable(&applications, output)?;

    let draft = ApplicationDraft {
        student_name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        documents: args.documents.iter().map(|p| document_name(p)).collect(),
    };

    let submitted = intake::submit(
        universities.records(),
        &mut applications,
        &args.program_id,
        draft,
    )
    .map_err(|err| intake_failure(output, &err))?;

    render_mode(
        output,
        &submitted,
        |a, w| writeln!(w, "{}\t{}", a.id, a.status),
        |a, w| {
            pretty_section(w, "✓ Application submitted")?;
            pretty_kv(w, "Reference", &a.id)?;
            pretty_kv(w, "Program", &a.program)?;
            pretty_kv(w, "University", &a.university)?;
            pretty_kv(w, "Status", a.status.as_str())?;
            writeln!(w)?;
            writeln!(w, "We will review your application and contact you at {}.", a.email)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_name_keeps_basename_only() {
        assert_eq!(document_name(Path::new("/tmp/scans/passport.pdf")), "passport.pdf");
        assert_eq!(document_name(Path::new("diploma.png")), "diploma.png");
    }

    #[test]
    fn document_name_falls_back_to_raw_path() {
        assert_eq!(document_name(Path::new("..")), "..");
    }
}
