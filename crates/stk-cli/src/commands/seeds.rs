use std::path::PathBuf;

use anyhow::{Context, Result};
use stk_derive::{derive_with_seed, find_first_unused_seed, Address};

use super::resolve_program;

pub fn derive(
    owner: &Address,
    seed: &str,
    program: Option<Address>,
    config_paths: &[PathBuf],
) -> Result<()> {
    let program = resolve_program(program, config_paths)?;
    let address = derive_with_seed(owner, seed, &program)
        .with_context(|| format!("cannot derive address for seed '{seed}'"))?;
    println!("address={address}");
    Ok(())
}

pub fn next_seed(
    owner: &Address,
    existing: &[Address],
    program: Option<Address>,
    config_paths: &[PathBuf],
) -> Result<()> {
    let program = resolve_program(program, config_paths)?;
    let seed = find_first_unused_seed(owner, &program, existing)
        .context("seed search failed")?;
    let address = derive_with_seed(owner, &seed, &program)?;
    println!("seed={seed}");
    println!("address={address}");
    Ok(())
}
