// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `gen-secret` command.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use crate::cli::{Cli, GenSecretArgs};
use crate::error::{BinError, BinResult};

const MIN_SECRET_BYTES: usize = 32;

/// Executes the `gen-secret` command.
pub fn gen_secret(cli: &Cli, args: GenSecretArgs) -> BinResult<()> {
    let secret = generate_secret(args.bytes)?;

    if cli.quiet {
        println!("{}", secret);
    } else {
        println!("Generated token signing secret ({} bytes):", args.bytes);
        println!();
        println!("  {}", secret);
        println!();
        println!("Set it before starting the server:");
        println!("  export WARDEN_JWT_SECRET='{}'", secret);
    }

    Ok(())
}

/// Returns `bytes` random bytes from the OS RNG, base64 encoded.
pub fn generate_secret(bytes: usize) -> BinResult<String> {
    if bytes < MIN_SECRET_BYTES {
        return Err(BinError::config(format!(
            "Secret must be at least {} bytes, got {}",
            MIN_SECRET_BYTES, bytes
        )));
    }

    let mut buf = vec![0u8; bytes];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| BinError::runtime(format!("OS random number generator failed: {}", e)))?;
    Ok(STANDARD.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_length() {
        let secret = generate_secret(48).unwrap();
        assert_eq!(STANDARD.decode(&secret).unwrap().len(), 48);
    }

    #[test]
    fn test_generate_secret_is_random() {
        assert_ne!(generate_secret(32).unwrap(), generate_secret(32).unwrap());
    }

    #[test]
    fn test_generate_secret_too_short() {
        assert!(generate_secret(16).is_err());
    }
}
