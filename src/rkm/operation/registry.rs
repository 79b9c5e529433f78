// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustkeymac
// File: registry.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Registry of operation factories keyed by algorithm and purpose,
//! with the lookup used by the dispatcher and the CLI.

use log::debug;

use super::hmac::{HMAC_SIGN_FACTORY, HMAC_VERIFY_FACTORY};
use super::{Operation, OperationFactory};
use crate::rkm::authorization::AuthorizationSet;
use crate::rkm::error::{ErrorCode, KeymasterError, KmResult};
use crate::rkm::key::SymmetricKey;
use crate::rkm::types::{Algorithm, KeyPurpose};

static FACTORIES: &[&dyn OperationFactory] =
	&[&HMAC_SIGN_FACTORY, &HMAC_VERIFY_FACTORY];

pub fn factories() -> impl Iterator<Item = &'static dyn OperationFactory>
{
	FACTORIES.iter().copied()
}

pub fn find_factory(
	algorithm: Algorithm,
	purpose: KeyPurpose,
) -> Option<&'static dyn OperationFactory> {
	factories().find(|factory| {
		factory.registry_key() == (algorithm, purpose)
	})
}

/// Builds the operation for `key`'s algorithm and `purpose`. The
/// returned operation still has to be begun.
pub fn create_operation(
	key: &SymmetricKey,
	purpose: KeyPurpose,
	begin_params: &AuthorizationSet,
) -> KmResult<Box<dyn Operation>> {
	let algorithm = key.authorizations().algorithm().ok_or_else(|| {
		KeymasterError::new(
			ErrorCode::InvalidKeyBlob,
			"key characteristics do not name an algorithm",
		)
	})?;

	match find_factory(algorithm, purpose) {
		Some(factory) => {
			debug!(
				"dispatching {:?}/{} to registered factory",
				algorithm, purpose
			);
			factory.create_operation(key, begin_params)
		}
		None if factories()
			.any(|factory| factory.registry_key().0 == algorithm) =>
		{
			Err(KeymasterError::new(
				ErrorCode::UnsupportedPurpose,
				format!(
					"{:?} keys do not support {} operations",
					algorithm, purpose
				),
			))
		}
		None => Err(KeymasterError::new(
			ErrorCode::UnsupportedAlgorithm,
			format!("no operations registered for {:?}", algorithm),
		)),
	}
}
