// SPDX-License-Identifier: GPL-3.0-or-later
// src/main.rs
//
// Application entry point.

mod app;
mod cli;
mod config;
mod constant;
mod domain;
mod i18n;
mod records;
mod services;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,lectern=info"))
        .init();
    i18n::init(&i18n_embed::DesktopLanguageRequester::requested_languages());

    cli::run(cli::Cli::parse()).await
}
