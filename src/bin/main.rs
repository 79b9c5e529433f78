// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: main.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

use colored::Colorize;
use rustkeymac::rkm::app;

fn main() {
	env_logger::Builder::from_env(
		env_logger::Env::default().default_filter_or("warn"),
	)
	.init();

	if let Err(err) = app::run() {
		eprintln!("{} {}", "error:".red(), err);
		std::process::exit(1);
	}
}
