//! Command handlers for the `stk` binary.

pub mod seeds;
pub mod validators;

use std::path::PathBuf;

use anyhow::Result;
use stk_derive::Address;

/// `--program` when given, else `accounts.program_id` from the layered
/// config (which defaults to the stake program).
pub fn resolve_program(program: Option<Address>, config_paths: &[PathBuf]) -> Result<Address> {
    if let Some(p) = program {
        return Ok(p);
    }
    let cfg = stk_config::load_layered_yaml(config_paths)?.stake()?;
    cfg.accounts.program_address()
}
