// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: authorization.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Tagged key characteristics and begin parameters.

use super::types::{Algorithm, DigestAlgorithm, KeyPurpose};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyParam {
	Algorithm(Algorithm),
	Purpose(KeyPurpose),
	Digest(DigestAlgorithm),
	/// Requested tag length in bits.
	MacLength(u32),
	KeySize(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationSet {
	params: Vec<KeyParam>,
}

impl AuthorizationSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, param: KeyParam) {
		self.params.push(param);
	}

	pub fn extend(&mut self, other: &AuthorizationSet) {
		self.params.extend_from_slice(&other.params);
	}

	pub fn with(mut self, param: KeyParam) -> Self {
		self.push(param);
		self
	}

	pub fn contains(&self, param: &KeyParam) -> bool {
		self.params.contains(param)
	}

	/// First algorithm tag, if any.
	pub fn algorithm(&self) -> Option<Algorithm> {
		self.params.iter().find_map(|param| match param {
			KeyParam::Algorithm(algorithm) => Some(*algorithm),
			_ => None,
		})
	}

	pub fn digests(&self) -> impl Iterator<Item = DigestAlgorithm> + '_ {
		self.params.iter().filter_map(|param| match param {
			KeyParam::Digest(digest) => Some(*digest),
			_ => None,
		})
	}

	pub fn mac_length_bits(&self) -> Option<u32> {
		self.params.iter().find_map(|param| match param {
			KeyParam::MacLength(bits) => Some(*bits),
			_ => None,
		})
	}
}

impl FromIterator<KeyParam> for AuthorizationSet {
	fn from_iter<I: IntoIterator<Item = KeyParam>>(iter: I) -> Self {
		Self {
			params: iter.into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accessors_pick_matching_tags() {
		let set: AuthorizationSet = [
			KeyParam::Algorithm(Algorithm::Hmac),
			KeyParam::Digest(DigestAlgorithm::Sha2_256),
			KeyParam::Purpose(KeyPurpose::Sign),
			KeyParam::Digest(DigestAlgorithm::Sha2_512),
			KeyParam::MacLength(128),
		]
		.into_iter()
		.collect();

		assert_eq!(set.algorithm(), Some(Algorithm::Hmac));
		assert_eq!(
			set.digests().collect::<Vec<_>>(),
			vec![DigestAlgorithm::Sha2_256, DigestAlgorithm::Sha2_512]
		);
		assert!(set.contains(&KeyParam::Purpose(KeyPurpose::Sign)));
		assert_eq!(set.mac_length_bits(), Some(128));
		assert!(set.contains(&KeyParam::Digest(DigestAlgorithm::Sha2_512)));
	}

	#[test]
	fn empty_set_has_no_values() {
		let set = AuthorizationSet::new();
		assert!(!set.contains(&KeyParam::Algorithm(Algorithm::Hmac)));
		assert_eq!(set.algorithm(), None);
		assert_eq!(set.mac_length_bits(), None);
	}
}
