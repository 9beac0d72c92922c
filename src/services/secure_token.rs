// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random state tokens for the OAuth CSRF check.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};

/// Number of random bytes per state token (256 bits).
const STATE_TOKEN_BYTES: usize = 32;

/// The OS random source could not be read.
#[derive(Debug, thiserror::Error)]
#[error("secure random source unavailable")]
pub struct EntropySourceUnavailable;

/// Generate an unguessable, URL-safe state token.
///
/// Reads from the OS CSPRNG only. The output is base64url without padding,
/// so it can be embedded in a query string as-is.
pub fn generate_state_token() -> Result<String, EntropySourceUnavailable> {
    let mut bytes = [0u8; STATE_TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| EntropySourceUnavailable)?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
