// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: types.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Closed enumerations shared with the surrounding key-management
//! framework: algorithms, purposes, digests and key formats.

use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[repr(u32)]
pub enum Algorithm {
	Rsa = 1,
	Ec = 3,
	Aes = 32,
	Hmac = 128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[repr(u32)]
pub enum KeyPurpose {
	Encrypt = 0,
	Decrypt = 1,
	Sign = 2,
	Verify = 3,
}

impl std::fmt::Display for KeyPurpose {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		let name = match self {
			KeyPurpose::Encrypt => "encrypt",
			KeyPurpose::Decrypt => "decrypt",
			KeyPurpose::Sign => "sign",
			KeyPurpose::Verify => "verify",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[repr(u32)]
pub enum DigestAlgorithm {
	None = 0,
	Md5 = 1,
	Sha1 = 2,
	Sha2_224 = 3,
	Sha2_256 = 4,
	Sha2_384 = 5,
	Sha2_512 = 6,
}

impl DigestAlgorithm {
	/// Output size in bytes of the underlying hash function.
	pub const fn native_size(self) -> usize {
		match self {
			DigestAlgorithm::None => 0,
			DigestAlgorithm::Md5 => 16,
			DigestAlgorithm::Sha1 => 20,
			DigestAlgorithm::Sha2_224 => 28,
			DigestAlgorithm::Sha2_256 => 32,
			DigestAlgorithm::Sha2_384 => 48,
			DigestAlgorithm::Sha2_512 => 64,
		}
	}

	pub const fn identifier(self) -> &'static str {
		match self {
			DigestAlgorithm::None => "none",
			DigestAlgorithm::Md5 => "md5",
			DigestAlgorithm::Sha1 => "sha1",
			DigestAlgorithm::Sha2_224 => "sha224",
			DigestAlgorithm::Sha2_256 => "sha256",
			DigestAlgorithm::Sha2_384 => "sha384",
			DigestAlgorithm::Sha2_512 => "sha512",
		}
	}

	/// Accepts `sha256`, `sha-256` and `sha2-256` style spellings,
	/// case-insensitively.
	pub fn from_identifier(identifier: &str) -> Option<Self> {
		let normalized = identifier
			.to_ascii_lowercase()
			.replace("sha2-", "sha")
			.replace("sha-", "sha")
			.replace('_', "");
		match normalized.as_str() {
			"none" => Some(DigestAlgorithm::None),
			"md5" => Some(DigestAlgorithm::Md5),
			"sha1" => Some(DigestAlgorithm::Sha1),
			"sha224" => Some(DigestAlgorithm::Sha2_224),
			"sha256" => Some(DigestAlgorithm::Sha2_256),
			"sha384" => Some(DigestAlgorithm::Sha2_384),
			"sha512" => Some(DigestAlgorithm::Sha2_512),
			_ => None,
		}
	}
}

impl std::fmt::Display for DigestAlgorithm {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.write_str(self.identifier())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
	X509,
	Pkcs8,
	Raw,
}
