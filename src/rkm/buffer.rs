// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: buffer.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Byte container with a read cursor and a bounded write sink, used
//! for operation input, output and supplied signatures.

use zeroize::Zeroizing;

use super::error::{ErrorCode, KeymasterError, KmResult};

/// Bytes between the read and write positions are pending input.
/// Capacity beyond the write position is the space `write` may fill;
/// `reserve` grows it. Storage is wiped when the buffer is dropped.
#[derive(Default)]
pub struct Buffer {
	data: Zeroizing<Vec<u8>>,
	read_position: usize,
	write_position: usize,
}

impl Buffer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_slice(bytes: &[u8]) -> Self {
		Self {
			data: Zeroizing::new(bytes.to_vec()),
			read_position: 0,
			write_position: bytes.len(),
		}
	}

	/// Unread bytes.
	pub fn peek_read(&self) -> &[u8] {
		&self.data[self.read_position..self.write_position]
	}

	pub fn available_read(&self) -> usize {
		self.write_position - self.read_position
	}

	pub fn available_write(&self) -> usize {
		self.data.len() - self.write_position
	}

	pub fn advance_read(&mut self, count: usize) -> KmResult<()> {
		if count > self.available_read() {
			return Err(KeymasterError::new(
				ErrorCode::InvalidInputLength,
				format!(
					"cannot advance read cursor by {} bytes, only {} unread",
					count,
					self.available_read()
				),
			));
		}
		self.read_position += count;
		Ok(())
	}

	/// Ensures at least `size` bytes can be written without failing.
	/// Already-consumed bytes are discarded before growing.
	pub fn reserve(&mut self, size: usize) {
		if self.available_write() >= size {
			return;
		}
		if self.read_position > 0 {
			self.data.copy_within(
				self.read_position..self.write_position,
				0,
			);
			self.write_position -= self.read_position;
			self.read_position = 0;
		}
		let required = self.write_position + size;
		if self.data.len() < required {
			self.data.resize(required, 0);
		}
	}

	pub fn write(&mut self, src: &[u8]) -> KmResult<()> {
		if src.len() > self.available_write() {
			return Err(KeymasterError::new(
				ErrorCode::InsufficientBufferSpace,
				format!(
					"write of {} bytes exceeds {} bytes of free space",
					src.len(),
					self.available_write()
				),
			));
		}
		let end = self.write_position + src.len();
		self.data[self.write_position..end].copy_from_slice(src);
		self.write_position = end;
		Ok(())
	}
}

impl std::fmt::Debug for Buffer {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("Buffer")
			.field("available_read", &self.available_read())
			.field("available_write", &self.available_write())
			.finish()
	}
}
