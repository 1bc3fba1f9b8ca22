// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use warden_core::PasswordHasher;

use crate::cli::{Cli, HashPasswordArgs};
use crate::config::load_config;
use crate::error::{BinError, BinResult};

/// Executes the `hash-password` command.
///
/// Cost parameters come from the loaded configuration.
pub fn hash_password(cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = if args.stdin {
        read_password(std::io::stdin().lock())?
    } else {
        args.password
            .ok_or_else(|| BinError::config("No password given; pass it as an argument or use --stdin"))?
    };

    let config = load_config(cli.config.as_deref())?;
    let hasher = PasswordHasher::new(&config.password)?;
    println!("{}", hasher.hash(&password)?);

    Ok(())
}

fn read_password(mut reader: impl BufRead) -> BinResult<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(BinError::config("Password read from stdin is empty"));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_password_strips_newline() {
        let password = read_password("pw123\r\n".as_bytes()).unwrap();
        assert_eq!(password, "pw123");
    }

    #[test]
    fn test_read_password_keeps_inner_spaces() {
        let password = read_password(" two words \n".as_bytes()).unwrap();
        assert_eq!(password, " two words ");
    }

    #[test]
    fn test_read_password_rejects_empty() {
        assert!(read_password("\n".as_bytes()).is_err());
    }
}
