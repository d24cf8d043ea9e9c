//! `jobtrack register` command - Create an account

use anyhow::Context;
use clap::Parser;

use crate::cli::{client, print_notifications};
use crate::notify::NotificationLog;
use crate::session::{self, RegistrationForm};

#[derive(Parser, Debug)]
pub struct RegisterArgs {
    /// Account email
    #[arg(long, env = "JOBTRACK_EMAIL")]
    email: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Account password
    #[arg(long, env = "JOBTRACK_PASSWORD", hide_env_values = true)]
    password: String,

    /// Password confirmation
    #[arg(long)]
    confirm: String,
}

pub async fn execute(args: RegisterArgs, api_url: Option<String>) -> anyhow::Result<()> {
    let api = client(api_url)?;
    let mut notifications = NotificationLog::new();

    let form = RegistrationForm {
        email: args.email,
        name: args.name,
        password: args.password,
        confirm: args.confirm,
    };

    let result = session::register(&api, &form, &mut notifications).await;
    print_notifications(&mut notifications);
    result.context("Registration failed")
}
