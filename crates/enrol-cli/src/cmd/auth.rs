//! `enrol login`, `enrol logout` and `enrol whoami`.

use clap::Args;
use enrol_core::session::Session;
use std::io::Write;
use std::path::Path;

use crate::output::{CliError, OutputMode, fail, pretty_kv, pretty_section, render_mode, render_success};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long, short)]
    pub username: String,

    #[arg(long, short)]
    pub password: String,
}

fn write_session(heading: &str, s: &Session, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, heading)?;
    pretty_kv(w, "User", &s.username)?;
    pretty_kv(w, "Since", s.issued_at.to_rfc3339())?;
    pretty_kv(w, "Expires", s.expires_at.to_rfc3339())
}

fn render_session(output: OutputMode, heading: &str, session: &Session) -> anyhow::Result<()> {
    render_mode(
        output,
        session,
        |s, w| writeln!(w, "{}\t{}", s.username, s.expires_at.to_rfc3339()),
        |s, w| write_session(heading, s, w),
    )
}

/// Execute `enrol login`.
pub fn run_login(args: &LoginArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let session = project
        .sessions()
        .login(&args.username, &args.password)
        .map_err(|err| fail(output, CliError::coded(err.to_string(), err.code())))?;
    render_session(output, "✓ Logged in", &session)
}

/// Execute `enrol logout`.
pub fn run_logout(output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let existed = project
        .sessions()
        .logout()
        .map_err(|err| fail(output, CliError::coded(err.to_string(), err.code())))?;
    render_success(
        output,
        if existed { "Logged out" } else { "No active session" },
    )
}

/// Execute `enrol whoami`.
pub fn run_whoami(output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let session = project.require_admin(output)?;
    render_session(output, "Admin session", &session)
}
