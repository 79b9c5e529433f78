// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: error.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Framework error codes and the error type returned by every fallible
//! operation call.

use std::borrow::Cow;

/// Closed set of framework error codes. Discriminants match the
/// numeric values the calling service expects on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
	UnsupportedPurpose = -2,
	UnsupportedAlgorithm = -4,
	IncompatibleAlgorithm = -5,
	UnsupportedMacLength = -9,
	UnsupportedDigest = -12,
	IncompatibleDigest = -13,
	UnsupportedKeyFormat = -17,
	InvalidInputLength = -21,
	InsufficientBufferSpace = -29,
	VerificationFailed = -30,
	InvalidKeyBlob = -33,
	UnknownError = -1000,
}

impl ErrorCode {
	pub fn code(self) -> i32 {
		self as i32
	}

	pub fn name(self) -> &'static str {
		match self {
			ErrorCode::UnsupportedPurpose => "UNSUPPORTED_PURPOSE",
			ErrorCode::UnsupportedAlgorithm => {
				"UNSUPPORTED_ALGORITHM"
			}
			ErrorCode::IncompatibleAlgorithm => {
				"INCOMPATIBLE_ALGORITHM"
			}
			ErrorCode::UnsupportedMacLength => {
				"UNSUPPORTED_MAC_LENGTH"
			}
			ErrorCode::UnsupportedDigest => "UNSUPPORTED_DIGEST",
			ErrorCode::IncompatibleDigest => "INCOMPATIBLE_DIGEST",
			ErrorCode::UnsupportedKeyFormat => {
				"UNSUPPORTED_KEY_FORMAT"
			}
			ErrorCode::InvalidInputLength => "INVALID_INPUT_LENGTH",
			ErrorCode::InsufficientBufferSpace => {
				"INSUFFICIENT_BUFFER_SPACE"
			}
			ErrorCode::VerificationFailed => "VERIFICATION_FAILED",
			ErrorCode::InvalidKeyBlob => "INVALID_KEY_BLOB",
			ErrorCode::UnknownError => "UNKNOWN_ERROR",
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		write!(f, "{} ({})", self.name(), self.code())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymasterError {
	code: ErrorCode,
	message: Cow<'static, str>,
}

impl KeymasterError {
	pub fn new(
		code: ErrorCode,
		message: impl Into<Cow<'static, str>>,
	) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	pub fn code(&self) -> ErrorCode {
		self.code
	}

	pub fn message(&self) -> &str {
		self.message.as_ref()
	}
}

impl std::fmt::Display for KeymasterError {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		write!(f, "{}: {}", self.code.name(), self.message)
	}
}

impl std::error::Error for KeymasterError {}

pub type KmResult<T> = Result<T, KeymasterError>;
