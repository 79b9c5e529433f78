// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: hmac.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! HMAC sign/verify operation over the SHA-2 family, and the factory
//! that builds it from a key and begin parameters.

use hmac::{Hmac, Mac};
use log::{debug, warn};
use sha2::{Sha224, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use super::{Operation, OperationFactory};
use crate::rkm::authorization::{AuthorizationSet, KeyParam};
use crate::rkm::buffer::Buffer;
use crate::rkm::error::{ErrorCode, KeymasterError, KmResult};
use crate::rkm::key::SymmetricKey;
use crate::rkm::types::{Algorithm, DigestAlgorithm, KeyPurpose};

type HmacSha224 = Hmac<Sha224>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

pub const SUPPORTED_DIGESTS: &[DigestAlgorithm] = &[
	DigestAlgorithm::Sha2_224,
	DigestAlgorithm::Sha2_256,
	DigestAlgorithm::Sha2_384,
	DigestAlgorithm::Sha2_512,
];

enum HmacEngine {
	Sha224(HmacSha224),
	Sha256(HmacSha256),
	Sha384(HmacSha384),
	Sha512(HmacSha512),
}

impl HmacEngine {
	fn keyed(digest: DigestAlgorithm, key: &[u8]) -> KmResult<Self> {
		let engine = match digest {
			DigestAlgorithm::Sha2_224 => {
				HmacSha224::new_from_slice(key).map(HmacEngine::Sha224)
			}
			DigestAlgorithm::Sha2_256 => {
				HmacSha256::new_from_slice(key).map(HmacEngine::Sha256)
			}
			DigestAlgorithm::Sha2_384 => {
				HmacSha384::new_from_slice(key).map(HmacEngine::Sha384)
			}
			DigestAlgorithm::Sha2_512 => {
				HmacSha512::new_from_slice(key).map(HmacEngine::Sha512)
			}
			other => {
				return Err(unsupported_digest(other));
			}
		};
		engine.map_err(|_| {
			KeymasterError::new(
				ErrorCode::UnknownError,
				"HMAC engine rejected the key",
			)
		})
	}

	fn update(&mut self, data: &[u8]) {
		match self {
			HmacEngine::Sha224(mac) => mac.update(data),
			HmacEngine::Sha256(mac) => mac.update(data),
			HmacEngine::Sha384(mac) => mac.update(data),
			HmacEngine::Sha512(mac) => mac.update(data),
		}
	}

	fn finalize(self) -> Zeroizing<Vec<u8>> {
		match self {
			HmacEngine::Sha224(mac) => {
				copy_and_wipe(mac.finalize().into_bytes().as_mut_slice())
			}
			HmacEngine::Sha256(mac) => {
				copy_and_wipe(mac.finalize().into_bytes().as_mut_slice())
			}
			HmacEngine::Sha384(mac) => {
				copy_and_wipe(mac.finalize().into_bytes().as_mut_slice())
			}
			HmacEngine::Sha512(mac) => {
				copy_and_wipe(mac.finalize().into_bytes().as_mut_slice())
			}
		}
	}
}

/// Moves a finalized digest into zeroizing storage and clears the
/// stack copy it came from.
fn copy_and_wipe(bytes: &mut [u8]) -> Zeroizing<Vec<u8>> {
	let copy = Zeroizing::new(bytes.to_vec());
	bytes.zeroize();
	copy
}

/// Owns the keyed engine. Empty until a key is bound and again after
/// finalization; dropping the context releases whatever it holds.
///
/// hmac 0.12 and sha2 0.10 do not implement `Zeroize`, so the keyed
/// inner/outer pad state is freed without being wiped. Only the
/// finalized digest is cleared, by `copy_and_wipe`.
// TODO: move to hmac 0.13 / digest 0.11 and enable their `zeroize`
// feature so the engine state is wiped when the context drops.
#[derive(Default)]
struct HmacContext {
	engine: Option<HmacEngine>,
}

impl HmacContext {
	fn bind(&mut self, engine: HmacEngine) {
		self.engine = Some(engine);
	}

	fn update(&mut self, data: &[u8]) -> KmResult<()> {
		match self.engine.as_mut() {
			Some(engine) => {
				engine.update(data);
				Ok(())
			}
			None => Err(engine_unavailable()),
		}
	}

	fn finalize(&mut self) -> KmResult<Zeroizing<Vec<u8>>> {
		self.engine
			.take()
			.map(HmacEngine::finalize)
			.ok_or_else(engine_unavailable)
	}
}

fn engine_unavailable() -> KeymasterError {
	KeymasterError::new(
		ErrorCode::UnknownError,
		"HMAC engine is not initialized or was already finalized",
	)
}

fn unsupported_digest(digest: DigestAlgorithm) -> KeymasterError {
	KeymasterError::new(
		ErrorCode::UnsupportedDigest,
		format!("HMAC does not support digest `{}`", digest),
	)
}

pub struct HmacOperation {
	purpose: KeyPurpose,
	context: HmacContext,
	error: Option<KeymasterError>,
	tag_length: usize,
}

impl HmacOperation {
	/// Never fails outright: problems with `digest` or `tag_length` are
	/// recorded and reported by [`Operation::begin`]. `key` is handed
	/// to the engine and not retained.
	pub fn new(
		purpose: KeyPurpose,
		key: &[u8],
		digest: DigestAlgorithm,
		tag_length: usize,
	) -> Self {
		let mut operation = Self {
			purpose,
			context: HmacContext::default(),
			error: None,
			tag_length,
		};
		if let Err(err) = operation.initialize(key, digest) {
			warn!("HMAC {} operation not initialized: {}", purpose, err);
			operation.error = Some(err);
		}
		operation
	}

	fn initialize(
		&mut self,
		key: &[u8],
		digest: DigestAlgorithm,
	) -> KmResult<()> {
		if !SUPPORTED_DIGESTS.contains(&digest) {
			return Err(unsupported_digest(digest));
		}
		if self.tag_length > digest.native_size() {
			return Err(KeymasterError::new(
				ErrorCode::UnsupportedMacLength,
				format!(
					"tag length {} exceeds {} output size of {} bytes",
					self.tag_length,
					digest,
					digest.native_size()
				),
			));
		}
		self.context.bind(HmacEngine::keyed(digest, key)?);
		Ok(())
	}
}

impl Operation for HmacOperation {
	fn purpose(&self) -> KeyPurpose {
		self.purpose
	}

	fn begin(&mut self) -> KmResult<()> {
		match &self.error {
			Some(err) => Err(err.clone()),
			None => Ok(()),
		}
	}

	fn update(
		&mut self,
		input: &Buffer,
		_output: &mut Buffer,
	) -> KmResult<usize> {
		self.context.update(input.peek_read())?;
		Ok(input.available_read())
	}

	fn finish(
		&mut self,
		signature: &Buffer,
		output: &mut Buffer,
	) -> KmResult<()> {
		let digest = self.context.finalize()?;
		let tag = &digest[..self.tag_length];

		match self.purpose {
			KeyPurpose::Sign => {
				output.reserve(self.tag_length);
				output.write(tag)
			}
			KeyPurpose::Verify => {
				if signature.available_read() != self.tag_length {
					return Err(KeymasterError::new(
						ErrorCode::InvalidInputLength,
						format!(
							"expected a {}-byte tag but received {} bytes",
							self.tag_length,
							signature.available_read()
						),
					));
				}
				// Constant time with respect to the computed tag.
				if bool::from(signature.peek_read().ct_eq(tag)) {
					Ok(())
				} else {
					warn!("HMAC tag verification failed");
					Err(KeymasterError::new(
						ErrorCode::VerificationFailed,
						"supplied tag does not match",
					))
				}
			}
			other => Err(KeymasterError::new(
				ErrorCode::UnsupportedPurpose,
				format!("HMAC cannot finish a {} operation", other),
			)),
		}
	}

	fn abort(&mut self) -> KmResult<()> {
		Ok(())
	}
}

impl std::fmt::Debug for HmacOperation {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("HmacOperation")
			.field("purpose", &self.purpose)
			.field("tag_length", &self.tag_length)
			.field("engine_bound", &self.context.engine.is_some())
			.field("error", &self.error)
			.finish()
	}
}

pub struct HmacOperationFactory {
	purpose: KeyPurpose,
}

impl HmacOperationFactory {
	pub const fn new(purpose: KeyPurpose) -> Self {
		Self { purpose }
	}
}

pub static HMAC_SIGN_FACTORY: HmacOperationFactory =
	HmacOperationFactory::new(KeyPurpose::Sign);
pub static HMAC_VERIFY_FACTORY: HmacOperationFactory =
	HmacOperationFactory::new(KeyPurpose::Verify);

impl OperationFactory for HmacOperationFactory {
	fn registry_key(&self) -> (Algorithm, KeyPurpose) {
		(Algorithm::Hmac, self.purpose)
	}

	fn create_operation(
		&self,
		key: &SymmetricKey,
		begin_params: &AuthorizationSet,
	) -> KmResult<Box<dyn Operation>> {
		let authorizations = key.authorizations();
		if authorizations.algorithm() != Some(Algorithm::Hmac) {
			return Err(KeymasterError::new(
				ErrorCode::IncompatibleAlgorithm,
				"key is not an HMAC key",
			));
		}

		let digest = resolve_digest(authorizations, begin_params)?;
		let tag_length = match begin_params.mac_length_bits() {
			Some(bits) if bits % 8 != 0 => {
				return Err(KeymasterError::new(
					ErrorCode::UnsupportedMacLength,
					format!(
						"MAC length of {} bits is not a whole number of bytes",
						bits
					),
				));
			}
			Some(bits) => (bits / 8) as usize,
			None => digest.native_size(),
		};

		debug!(
			"creating HMAC {} operation: digest={}, tag_length={}",
			self.purpose, digest, tag_length
		);
		Ok(Box::new(HmacOperation::new(
			self.purpose,
			key.key_material(),
			digest,
			tag_length,
		)))
	}

	fn supported_digests(&self) -> &'static [DigestAlgorithm] {
		SUPPORTED_DIGESTS
	}
}

/// Digest named in the begin parameters, which the key must authorize,
/// or else the key's only authorized digest.
fn resolve_digest(
	key_authorizations: &AuthorizationSet,
	begin_params: &AuthorizationSet,
) -> KmResult<DigestAlgorithm> {
	if let Some(requested) = begin_params.digests().next() {
		if key_authorizations.contains(&KeyParam::Digest(requested)) {
			return Ok(requested);
		}
		return Err(KeymasterError::new(
			ErrorCode::IncompatibleDigest,
			format!("key is not authorized for digest `{}`", requested),
		));
	}

	let mut authorized = key_authorizations.digests();
	match (authorized.next(), authorized.next()) {
		(Some(digest), None) => Ok(digest),
		(None, _) => Err(KeymasterError::new(
			ErrorCode::UnsupportedDigest,
			"no digest specified for HMAC operation",
		)),
		(Some(_), Some(_)) => Err(KeymasterError::new(
			ErrorCode::UnsupportedDigest,
			"key authorizes several digests; begin parameters must name one",
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sign(op: &mut HmacOperation, message: &[u8]) -> Vec<u8> {
		op.begin().unwrap();
		let mut output = Buffer::new();
		op.update(&Buffer::from_slice(message), &mut output)
			.unwrap();
		op.finish(&Buffer::new(), &mut output).unwrap();
		output.peek_read().to_vec()
	}

	#[test]
	fn native_sizes_match_hash_output() {
		use digest::OutputSizeUser;

		assert_eq!(
			DigestAlgorithm::Sha2_224.native_size(),
			Sha224::output_size()
		);
		assert_eq!(
			DigestAlgorithm::Sha2_256.native_size(),
			Sha256::output_size()
		);
		assert_eq!(
			DigestAlgorithm::Sha2_384.native_size(),
			Sha384::output_size()
		);
		assert_eq!(
			DigestAlgorithm::Sha2_512.native_size(),
			Sha512::output_size()
		);
	}

	#[test]
	fn finalized_digest_source_is_wiped() {
		let mut source = [0xa5u8; 48];
		let copy = copy_and_wipe(&mut source);
		assert_eq!(copy.as_slice(), &[0xa5u8; 48][..]);
		assert_eq!(source, [0u8; 48]);
	}

	#[test]
	fn update_reports_whole_input_consumed() {
		let mut op = HmacOperation::new(
			KeyPurpose::Sign,
			b"key",
			DigestAlgorithm::Sha2_256,
			32,
		);
		op.begin().unwrap();
		let mut input = Buffer::from_slice(b"abcdef");
		input.advance_read(2).unwrap();
		let consumed = op.update(&input, &mut Buffer::new()).unwrap();
		assert_eq!(consumed, 4);
	}

	#[test]
	fn unsupported_digest_is_latched_and_never_panics() {
		let mut op = HmacOperation::new(
			KeyPurpose::Sign,
			b"key",
			DigestAlgorithm::Md5,
			16,
		);
		assert_eq!(
			op.begin().unwrap_err().code(),
			ErrorCode::UnsupportedDigest
		);
		let err = op
			.update(&Buffer::from_slice(b"data"), &mut Buffer::new())
			.unwrap_err();
		assert_eq!(err.code(), ErrorCode::UnknownError);
		let err =
			op.finish(&Buffer::new(), &mut Buffer::new()).unwrap_err();
		assert_eq!(err.code(), ErrorCode::UnknownError);
		assert!(op.abort().is_ok());
	}

	#[test]
	fn second_finish_reports_unknown_error() {
		let mut op = HmacOperation::new(
			KeyPurpose::Sign,
			b"key",
			DigestAlgorithm::Sha2_224,
			28,
		);
		let tag = sign(&mut op, b"message");
		assert_eq!(tag.len(), 28);
		let err =
			op.finish(&Buffer::new(), &mut Buffer::new()).unwrap_err();
		assert_eq!(err.code(), ErrorCode::UnknownError);
	}

	#[test]
	fn non_mac_purpose_fails_at_finish() {
		let mut op = HmacOperation::new(
			KeyPurpose::Encrypt,
			b"key",
			DigestAlgorithm::Sha2_256,
			32,
		);
		op.begin().unwrap();
		let err =
			op.finish(&Buffer::new(), &mut Buffer::new()).unwrap_err();
		assert_eq!(err.code(), ErrorCode::UnsupportedPurpose);
	}

	#[test]
	fn zero_length_key_and_tag_are_accepted() {
		let mut op = HmacOperation::new(
			KeyPurpose::Sign,
			&[],
			DigestAlgorithm::Sha2_512,
			0,
		);
		assert!(sign(&mut op, b"").is_empty());
	}

	#[test]
	fn factory_requires_hmac_key() {
		let key = SymmetricKey::new(
			Zeroizing::new(vec![1u8; 16]),
			&AuthorizationSet::new(),
			&AuthorizationSet::new()
				.with(KeyParam::Algorithm(Algorithm::Aes))
				.with(KeyParam::Digest(DigestAlgorithm::Sha2_256)),
		);
		let err = HMAC_SIGN_FACTORY
			.create_operation(&key, &AuthorizationSet::new())
			.unwrap_err();
		assert_eq!(err.code(), ErrorCode::IncompatibleAlgorithm);
	}

	#[test]
	fn factory_resolves_digest_and_mac_length() {
		let key = SymmetricKey::new(
			Zeroizing::new(vec![1u8; 16]),
			&AuthorizationSet::new(),
			&AuthorizationSet::new()
				.with(KeyParam::Algorithm(Algorithm::Hmac))
				.with(KeyParam::Digest(DigestAlgorithm::Sha2_256))
				.with(KeyParam::Digest(DigestAlgorithm::Sha2_512)),
		);

		let err = HMAC_SIGN_FACTORY
			.create_operation(&key, &AuthorizationSet::new())
			.unwrap_err();
		assert_eq!(err.code(), ErrorCode::UnsupportedDigest);

		let err = HMAC_SIGN_FACTORY
			.create_operation(
				&key,
				&AuthorizationSet::new()
					.with(KeyParam::Digest(DigestAlgorithm::Sha2_384)),
			)
			.unwrap_err();
		assert_eq!(err.code(), ErrorCode::IncompatibleDigest);

		let err = HMAC_SIGN_FACTORY
			.create_operation(
				&key,
				&AuthorizationSet::new()
					.with(KeyParam::Digest(DigestAlgorithm::Sha2_512))
					.with(KeyParam::MacLength(100)),
			)
			.unwrap_err();
		assert_eq!(err.code(), ErrorCode::UnsupportedMacLength);

		let mut op = HMAC_SIGN_FACTORY
			.create_operation(
				&key,
				&AuthorizationSet::new()
					.with(KeyParam::Digest(DigestAlgorithm::Sha2_512))
					.with(KeyParam::MacLength(160)),
			)
			.unwrap();
		op.begin().unwrap();
		let mut output = Buffer::new();
		op.finish(&Buffer::new(), &mut output).unwrap();
		assert_eq!(output.available_read(), 20);
	}
}
