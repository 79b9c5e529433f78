// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: app.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

use crate::rkm::commands::{self, MacInput, MacOptions};
use crate::rkm::key::KeySource;
use crate::rkm::types::{DigestAlgorithm, KeyPurpose};
use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(
	name = "rkm",
	version,
	about = "Sign and verify data with truncated HMAC-SHA2 tags."
)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Compute an HMAC tag over the input
	Sign {
		#[command(flatten)]
		operation: OperationArgs,
		/// Print only the hex tag
		#[arg(long)]
		hash_only: bool,
	},
	/// Check a hex tag against the input
	Verify {
		#[command(flatten)]
		operation: OperationArgs,
		/// Expected tag, hex encoded
		#[arg(long)]
		tag: String,
	},
	/// List the digests HMAC operations accept
	Digests {
		#[arg(long)]
		json: bool,
	},
}

#[derive(Args, Debug)]
pub struct OperationArgs {
	/// Digest algorithm (sha224, sha256, sha384, sha512)
	#[arg(short, long, default_value = "sha256", value_parser = parse_digest)]
	pub digest: DigestAlgorithm,
	/// Tag length in bytes; defaults to the digest's output size
	#[arg(short = 'l', long)]
	pub tag_length: Option<usize>,
	#[command(flatten)]
	pub key: KeyArgs,
	#[command(flatten)]
	pub input: InputArgs,
	/// Emit JSON instead of plain text
	#[arg(long)]
	pub json: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct KeyArgs {
	/// Key bytes, hex encoded
	#[arg(long)]
	pub key_hex: Option<String>,
	/// Read raw key bytes from a file
	#[arg(long)]
	pub key_file: Option<PathBuf>,
	/// Read raw key bytes from stdin
	#[arg(long)]
	pub key_stdin: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
	/// Inline message
	pub text: Option<String>,
	/// Read the message from a file
	#[arg(long)]
	pub file: Option<PathBuf>,
	/// Read the message from stdin
	#[arg(long)]
	pub stdin: bool,
}

fn parse_digest(value: &str) -> Result<DigestAlgorithm, String> {
	DigestAlgorithm::from_identifier(value)
		.ok_or_else(|| format!("unknown digest `{}`", value))
}

impl KeyArgs {
	fn into_source(self) -> KeySource {
		if let Some(hex) = self.key_hex {
			KeySource::InlineHex(Zeroizing::new(hex))
		} else if let Some(path) = self.key_file {
			KeySource::File(path)
		} else {
			KeySource::Stdin
		}
	}
}

impl InputArgs {
	fn into_input(self) -> MacInput {
		if let Some(text) = self.text {
			MacInput::Inline(text)
		} else if let Some(path) = self.file {
			MacInput::File(path)
		} else {
			MacInput::Stdin
		}
	}
}

fn mac_options(
	purpose: KeyPurpose,
	operation: OperationArgs,
	expected_tag: Option<String>,
	hash_only: bool,
) -> MacOptions {
	MacOptions {
		purpose,
		digest: operation.digest,
		tag_length: operation.tag_length,
		key_source: operation.key.into_source(),
		input: operation.input.into_input(),
		expected_tag,
		hash_only,
		json: operation.json,
	}
}

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
	match cli.command {
		Command::Sign {
			operation,
			hash_only,
		} => commands::run_mac(mac_options(
			KeyPurpose::Sign,
			operation,
			None,
			hash_only,
		)),
		Command::Verify { operation, tag } => commands::run_mac(
			mac_options(KeyPurpose::Verify, operation, Some(tag), false),
		),
		Command::Digests { json } => {
			commands::list_digests(json);
			Ok(())
		}
	}
}

pub fn run() -> Result<(), Box<dyn Error>> {
	dispatch(Cli::parse())
}
