// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: key.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Symmetric key container plus helpers for loading raw key material
//! from files, stdin, or inline hex.

use std::fs;
use std::io::{self, Read};

use zeroize::Zeroizing;

use super::authorization::{AuthorizationSet, KeyParam};
use super::error::{ErrorCode, KeymasterError, KmResult};
use super::types::{Algorithm, DigestAlgorithm, KeyFormat, KeyPurpose};

/// Raw key material together with the characteristics it was created
/// with. Material is wiped when the key is dropped.
pub struct SymmetricKey {
	material: Zeroizing<Vec<u8>>,
	authorizations: AuthorizationSet,
}

impl SymmetricKey {
	/// Hardware- and software-enforced characteristics are merged into a
	/// single authorization list.
	pub fn new(
		material: Zeroizing<Vec<u8>>,
		hw_enforced: &AuthorizationSet,
		sw_enforced: &AuthorizationSet,
	) -> Self {
		let mut authorizations = AuthorizationSet::new();
		authorizations.extend(hw_enforced);
		authorizations.extend(sw_enforced);
		Self {
			material,
			authorizations,
		}
	}

	/// HMAC key usable for signing and verifying with `digest`.
	pub fn hmac(material: &[u8], digest: DigestAlgorithm) -> Self {
		let sw_enforced = AuthorizationSet::new()
			.with(KeyParam::Algorithm(Algorithm::Hmac))
			.with(KeyParam::KeySize(key_size_bits(material.len())))
			.with(KeyParam::Digest(digest))
			.with(KeyParam::Purpose(KeyPurpose::Sign))
			.with(KeyParam::Purpose(KeyPurpose::Verify));
		Self::new(
			Zeroizing::new(material.to_vec()),
			&AuthorizationSet::new(),
			&sw_enforced,
		)
	}

	pub fn authorizations(&self) -> &AuthorizationSet {
		&self.authorizations
	}

	pub fn key_material(&self) -> &[u8] {
		self.material.as_slice()
	}

	/// Copy of the key material in `format`. Symmetric keys only
	/// export raw bytes.
	pub fn formatted_key_material(
		&self,
		format: KeyFormat,
	) -> KmResult<Zeroizing<Vec<u8>>> {
		match format {
			KeyFormat::Raw => {
				Ok(Zeroizing::new(self.material.as_slice().to_vec()))
			}
			other => Err(KeymasterError::new(
				ErrorCode::UnsupportedKeyFormat,
				format!(
					"symmetric keys cannot be exported as {:?}",
					other
				),
			)),
		}
	}
}

/// Key size tag in bits, saturating for material too long to describe.
fn key_size_bits(len: usize) -> u32 {
	len.checked_mul(8)
		.and_then(|bits| u32::try_from(bits).ok())
		.unwrap_or(u32::MAX)
}

impl std::fmt::Debug for SymmetricKey {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("SymmetricKey")
			.field("material_len", &self.material.len())
			.field("authorizations", &self.authorizations)
			.finish()
	}
}

#[derive(Debug)]
pub enum KeySource {
	File(std::path::PathBuf),
	Stdin,
	InlineHex(Zeroizing<String>),
}

impl KeySource {
	pub fn description(&self) -> &'static str {
		match self {
			KeySource::File(_) => "file",
			KeySource::Stdin => "stdin",
			KeySource::InlineHex(_) => "inline",
		}
	}
}

/// Zero-length keys are accepted from files and stdin; HMAC pads them
/// like any other short key.
pub fn load_key(source: &KeySource) -> KmResult<Zeroizing<Vec<u8>>> {
	match source {
		KeySource::File(path) => fs::read(path)
			.map(Zeroizing::new)
			.map_err(|err| {
				KeymasterError::new(
					ErrorCode::InvalidKeyBlob,
					format!(
						"failed to read key file `{}`: {}",
						path.display(),
						err
					),
				)
			}),
		KeySource::Stdin => {
			let mut buf = Zeroizing::new(Vec::new());
			io::stdin().read_to_end(&mut buf).map_err(|err| {
				KeymasterError::new(
					ErrorCode::InvalidKeyBlob,
					format!("failed to read key from stdin: {}", err),
				)
			})?;
			Ok(buf)
		}
		KeySource::InlineHex(text) => hex::decode(text.trim())
			.map(Zeroizing::new)
			.map_err(|err| {
				KeymasterError::new(
					ErrorCode::InvalidKeyBlob,
					format!("inline key is not valid hex: {}", err),
				)
			}),
	}
}
