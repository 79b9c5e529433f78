// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// Module: operation (streaming cryptographic operations)
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Lifecycle contract shared by every operation kind, plus the factory
//! trait the registry uses to build them.
//!
//! A dispatcher drives any operation the same way: `begin` once, then
//! `update` zero or more times, then exactly one of `finish` or
//! `abort`. Implementations assume calls on one instance are
//! serialized by the caller.

pub mod hmac;
pub mod registry;

use super::authorization::AuthorizationSet;
use super::buffer::Buffer;
use super::error::KmResult;
use super::key::SymmetricKey;
use super::types::{Algorithm, DigestAlgorithm, KeyPurpose};

pub trait Operation: Send + std::fmt::Debug {
	fn purpose(&self) -> KeyPurpose;

	/// Reports any failure recorded while the operation was built.
	fn begin(&mut self) -> KmResult<()>;

	/// Consumes input from `input` and returns how many bytes were
	/// taken. May append to `output`.
	fn update(
		&mut self,
		input: &Buffer,
		output: &mut Buffer,
	) -> KmResult<usize>;

	/// `signature` is only read by verifying operations.
	fn finish(
		&mut self,
		signature: &Buffer,
		output: &mut Buffer,
	) -> KmResult<()>;

	fn abort(&mut self) -> KmResult<()>;
}

pub trait OperationFactory: Sync {
	fn registry_key(&self) -> (Algorithm, KeyPurpose);

	fn create_operation(
		&self,
		key: &SymmetricKey,
		begin_params: &AuthorizationSet,
	) -> KmResult<Box<dyn Operation>>;

	fn supported_digests(&self) -> &'static [DigestAlgorithm] {
		&[]
	}
}
