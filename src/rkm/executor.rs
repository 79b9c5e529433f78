// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: executor.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Drives an operation through its full lifecycle over a byte stream.

use std::io::Read;

use hex::encode;
use log::warn;

use super::buffer::Buffer;
use super::error::{ErrorCode, KeymasterError, KmResult};
use super::operation::Operation;

const UPDATE_CHUNK_SIZE: usize = 8192;

/// Runs begin, chunked updates and finish. Any failure aborts the
/// operation before the error is returned. The returned buffer holds
/// the tag for signing operations and is empty when verifying.
pub fn drive_reader<R: Read>(
	mut reader: R,
	operation: &mut dyn Operation,
	signature: &Buffer,
) -> KmResult<Buffer> {
	let result = run(&mut reader, operation, signature);
	if result.is_err() {
		if let Err(err) = operation.abort() {
			warn!("abort after failed operation also failed: {}", err);
		}
	}
	result
}

pub fn drive_bytes(
	data: &[u8],
	operation: &mut dyn Operation,
	signature: &Buffer,
) -> KmResult<Buffer> {
	drive_reader(data, operation, signature)
}

fn run<R: Read>(
	reader: &mut R,
	operation: &mut dyn Operation,
	signature: &Buffer,
) -> KmResult<Buffer> {
	operation.begin()?;

	let mut output = Buffer::new();
	let mut chunk = [0u8; UPDATE_CHUNK_SIZE];
	loop {
		let n = reader.read(&mut chunk).map_err(|err| {
			KeymasterError::new(
				ErrorCode::UnknownError,
				format!("failed to read operation input: {}", err),
			)
		})?;
		if n == 0 {
			break;
		}
		let mut input = Buffer::from_slice(&chunk[..n]);
		while input.available_read() > 0 {
			let consumed = operation.update(&input, &mut output)?;
			if consumed == 0 {
				return Err(KeymasterError::new(
					ErrorCode::UnknownError,
					"operation made no progress on pending input",
				));
			}
			input.advance_read(consumed)?;
		}
	}

	operation.finish(signature, &mut output)?;
	Ok(output)
}

pub fn tag_to_hex(bytes: &[u8]) -> String {
	encode(bytes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rkm::operation::hmac::HmacOperation;
	use crate::rkm::types::{DigestAlgorithm, KeyPurpose};

	#[derive(Debug, Default)]
	struct RefusingOperation {
		aborted: bool,
	}

	impl Operation for RefusingOperation {
		fn purpose(&self) -> KeyPurpose {
			KeyPurpose::Sign
		}

		fn begin(&mut self) -> KmResult<()> {
			Err(KeymasterError::new(
				ErrorCode::UnsupportedDigest,
				"digest not available",
			))
		}

		fn update(
			&mut self,
			_input: &Buffer,
			_output: &mut Buffer,
		) -> KmResult<usize> {
			Ok(0)
		}

		fn finish(
			&mut self,
			_signature: &Buffer,
			_output: &mut Buffer,
		) -> KmResult<()> {
			Ok(())
		}

		fn abort(&mut self) -> KmResult<()> {
			self.aborted = true;
			Err(KeymasterError::new(
				ErrorCode::UnknownError,
				"abort refused",
			))
		}
	}

	#[test]
	fn failed_abort_keeps_original_error() {
		let mut op = RefusingOperation::default();
		let err = drive_bytes(b"abc", &mut op, &Buffer::new())
			.unwrap_err();
		assert!(op.aborted);
		assert_eq!(err.code(), ErrorCode::UnsupportedDigest);
		assert_eq!(err.message(), "digest not available");
	}

	#[test]
	fn reader_and_bytes_produce_same_tag() {
		let message = vec![0x5au8; UPDATE_CHUNK_SIZE * 3 + 17];
		let mut from_reader = HmacOperation::new(
			KeyPurpose::Sign,
			b"key",
			DigestAlgorithm::Sha2_256,
			32,
		);
		let mut from_bytes = HmacOperation::new(
			KeyPurpose::Sign,
			b"key",
			DigestAlgorithm::Sha2_256,
			32,
		);
		let a = drive_reader(
			std::io::Cursor::new(&message),
			&mut from_reader,
			&Buffer::new(),
		)
		.unwrap();
		let b =
			drive_bytes(&message, &mut from_bytes, &Buffer::new())
				.unwrap();
		assert_eq!(a.peek_read(), b.peek_read());
		assert_eq!(tag_to_hex(a.peek_read()).len(), 64);
	}

	#[test]
	fn latched_error_surfaces_from_begin() {
		let mut op = HmacOperation::new(
			KeyPurpose::Sign,
			b"key",
			DigestAlgorithm::Sha2_256,
			33,
		);
		let err = drive_bytes(b"abc", &mut op, &Buffer::new())
			.unwrap_err();
		assert_eq!(err.code(), ErrorCode::UnsupportedMacLength);
	}
}
