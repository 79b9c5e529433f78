// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: commands.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! CLI dispatch for `rkm sign`, `rkm verify` and `rkm digests`.

use crate::rkm::authorization::{AuthorizationSet, KeyParam};
use crate::rkm::buffer::Buffer;
use crate::rkm::error::{ErrorCode, KeymasterError};
use crate::rkm::executor::{drive_bytes, drive_reader, tag_to_hex};
use crate::rkm::key::{load_key, KeySource, SymmetricKey};
use crate::rkm::operation::registry;
use crate::rkm::types::{Algorithm, DigestAlgorithm, KeyPurpose};
use colored::Colorize;
use serde_json::json;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;

/// RFC 2104 section 5: truncated tags should keep at least 80 bits and
/// at least half of the hash output.
const MIN_RECOMMENDED_TAG_BYTES: usize = 10;

#[derive(Debug)]
pub struct MacOptions {
	pub purpose: KeyPurpose,
	pub digest: DigestAlgorithm,
	pub tag_length: Option<usize>,
	pub key_source: KeySource,
	pub input: MacInput,
	pub expected_tag: Option<String>,
	pub hash_only: bool,
	pub json: bool,
}

#[derive(Debug)]
pub enum MacInput {
	Inline(String),
	File(PathBuf),
	Stdin,
}

impl MacInput {
	fn description(&self) -> String {
		match self {
			MacInput::Inline(text) => text.clone(),
			MacInput::File(path) => path.display().to_string(),
			MacInput::Stdin => "-".to_string(),
		}
	}

	fn kind(&self) -> &'static str {
		match self {
			MacInput::Inline(_) => "inline",
			MacInput::File(_) => "file",
			MacInput::Stdin => "stdin",
		}
	}
}

pub fn run_mac(options: MacOptions) -> Result<(), Box<dyn Error>> {
	if matches!(options.key_source, KeySource::Stdin)
		&& matches!(options.input, MacInput::Stdin)
	{
		return Err(Box::new(io::Error::new(
			io::ErrorKind::InvalidInput,
			"key and input cannot both be read from stdin",
		)));
	}

	let material = load_key(&options.key_source)?;
	let key = SymmetricKey::hmac(&material, options.digest);
	drop(material);

	let begin_params = begin_params(&options)?;
	let signature = match &options.expected_tag {
		Some(hex_tag) => {
			let bytes = hex::decode(hex_tag.trim()).map_err(|err| {
				Box::new(io::Error::new(
					io::ErrorKind::InvalidInput,
					format!("tag is not valid hex: {}", err),
				)) as Box<dyn Error>
			})?;
			Buffer::from_slice(&bytes)
		}
		None => Buffer::new(),
	};

	let tag_length = options
		.tag_length
		.unwrap_or_else(|| options.digest.native_size());
	if let Some(warning) =
		short_tag_warning_message(options.digest, tag_length)
	{
		eprintln!("{}", warning.yellow());
	}

	let mut operation =
		registry::create_operation(&key, options.purpose, &begin_params)?;
	let outcome = match &options.input {
		MacInput::Inline(text) => {
			drive_bytes(text.as_bytes(), operation.as_mut(), &signature)
		}
		MacInput::File(path) => {
			let file = File::open(path).map_err(|err| {
				Box::new(io::Error::other(format!(
					"failed to open `{}`: {}",
					path.display(),
					err
				))) as Box<dyn Error>
			})?;
			drive_reader(file, operation.as_mut(), &signature)
		}
		MacInput::Stdin => {
			drive_reader(io::stdin().lock(), operation.as_mut(), &signature)
		}
	};

	match options.purpose {
		KeyPurpose::Verify => emit_verification(&options, outcome),
		_ => {
			let tag = outcome?;
			emit_tag(&options, tag.peek_read());
			Ok(())
		}
	}
}

fn begin_params(
	options: &MacOptions,
) -> Result<AuthorizationSet, KeymasterError> {
	let mut params = AuthorizationSet::new()
		.with(KeyParam::Digest(options.digest));
	if let Some(bytes) = options.tag_length {
		let bits = bytes
			.checked_mul(8)
			.and_then(|bits| u32::try_from(bits).ok())
			.ok_or_else(|| {
				KeymasterError::new(
					ErrorCode::UnsupportedMacLength,
					format!("tag length of {} bytes is out of range", bytes),
				)
			})?;
		params.push(KeyParam::MacLength(bits));
	}
	Ok(params)
}

pub fn short_tag_warning_message(
	digest: DigestAlgorithm,
	tag_length: usize,
) -> Option<String> {
	let native = digest.native_size();
	if tag_length > native {
		return None;
	}
	if tag_length < MIN_RECOMMENDED_TAG_BYTES || tag_length * 2 < native
	{
		Some(format!(
			"warning: {}-byte tag truncates HMAC-{} below the recommended minimum of max({}, {}) bytes",
			tag_length,
			digest,
			MIN_RECOMMENDED_TAG_BYTES,
			native / 2
		))
	} else {
		None
	}
}

fn emit_tag(options: &MacOptions, tag: &[u8]) {
	let hex = tag_to_hex(tag);

	if options.hash_only {
		println!("{}", hex);
		return;
	}

	if options.json {
		let payload = json!({
			"operation": "sign",
			"digest": options.digest.identifier(),
			"tag_length": tag.len(),
			"tag": hex,
			"input": {
				"type": options.input.kind(),
				"value": options.input.description(),
			},
			"key_source": options.key_source.description(),
		});
		println!("{}", payload);
	} else {
		println!("{} {}", hex, options.input.description());
	}
}

fn emit_verification(
	options: &MacOptions,
	outcome: Result<Buffer, KeymasterError>,
) -> Result<(), Box<dyn Error>> {
	let failure = outcome.err();

	if options.json {
		let payload = json!({
			"operation": "verify",
			"digest": options.digest.identifier(),
			"verified": failure.is_none(),
			"error": failure.as_ref().map(|err| err.code().name()),
			"input": {
				"type": options.input.kind(),
				"value": options.input.description(),
			},
			"key_source": options.key_source.description(),
		});
		println!("{}", payload);
	} else if failure.is_none() {
		println!("{} {}", "OK".green(), options.input.description());
	}

	match failure {
		Some(err) => Err(Box::new(err)),
		None => Ok(()),
	}
}

pub fn list_digests(json: bool) {
	let digests = registry::find_factory(Algorithm::Hmac, KeyPurpose::Sign)
		.map(|factory| factory.supported_digests())
		.unwrap_or(&[]);

	if json {
		let entries: Vec<_> = digests
			.iter()
			.map(|digest| {
				json!({
					"digest": digest.identifier(),
					"native_size": digest.native_size(),
				})
			})
			.collect();
		println!("{}", serde_json::Value::Array(entries));
		return;
	}

	for digest in digests {
		println!(
			"{:<8} {:>3} bytes",
			digest.identifier(),
			digest.native_size()
		);
	}
}
