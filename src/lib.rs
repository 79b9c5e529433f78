// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: lib.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

pub mod rkm {
	pub mod app;
	pub mod authorization;
	pub mod buffer;
	pub mod commands;
	pub mod error;
	pub mod executor;
	pub mod key;
	pub mod operation;
	pub mod types;
}
