//! `enrol contact`: build the live-support chat link.

use clap::Args;
use enrol_core::contact::{self, ContactError, ContactRequest};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::output::{CliError, OutputMode, fail, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct ContactArgs {
    /// Your full name.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,
}

#[derive(Debug, Serialize)]
struct ContactLink {
    link: String,
}

/// Execute `enrol contact`.
pub fn run_contact(args: &ContactArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let request = ContactRequest {
        full_name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
    };

    let link = contact::contact_link(
        &project.config.contact.whatsapp_number,
        &project.config.contact.greeting,
        &request,
    )
    .map_err(|err| {
        let error = match &err {
            ContactError::Invalid(fields) => {
                CliError::coded("invalid contact details", err.code()).with_fields(fields)
            }
            ContactError::BadNumber(_) => CliError::coded(err.to_string(), err.code()),
        };
        fail(output, error)
    })?;

    render_mode(
        output,
        &ContactLink { link },
        |c, w| writeln!(w, "{}", c.link),
        |c, w| {
            writeln!(w, "Open this link to chat with an advisor:")?;
            writeln!(w, "  {}", c.link)
        },
    )
}
