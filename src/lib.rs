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

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod file_reader;
pub mod format;
pub mod keyword_table;
pub mod object;
pub mod reference_parser;

use std::path::Path;

use anyhow::{Context, Result};

use assembler::pass1::resolve_addresses;
use assembler::{pass2, DEFAULT_SECTION_BASE};
use file_reader::FileReader;
use reference_parser::{LineParser, SourceParser};

/// Knobs the CLI exposes instead of hardcoding (spec.md leaves both
/// unconstrained; §9 notes section alignment/layout as the only other
/// open choices, resolved elsewhere).
#[derive(Debug, Clone, Copy)]
pub struct AssembleOptions {
    /// Base address used when the program opens no `.ORG` at all.
    pub default_section_base: u32,
    /// If set, any ROM section ending past this address fails
    /// assembly — the bound a boot ROM or fixed memory map imposes.
    pub final_address: Option<u32>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        AssembleOptions {
            default_section_base: DEFAULT_SECTION_BASE,
            final_address: None,
        }
    }
}

/// Runs the full pipeline with the default options: read source,
/// parse, resolve addresses (Pass 1), emit code and relocations
/// (Pass 2), serialize the result as a `.g10obj` file (spec §1, §4,
/// §6.1).
pub fn assemble<F: FileReader>(source_path: &Path, reader: &F) -> Result<Vec<u8>> {
    assemble_with_options(source_path, reader, &AssembleOptions::default())
}

/// Same pipeline as [`assemble`], with the base address and final
/// address bound overridable (spec §4.3 default base; no bound check
/// exists in spec.md itself, this is the CLI's own sanity check).
pub fn assemble_with_options<F: FileReader>(
    source_path: &Path,
    reader: &F,
    options: &AssembleOptions,
) -> Result<Vec<u8>> {
    let source = reader
        .read_to_string(source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;

    let filename = source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_path.display().to_string());

    let program = LineParser
        .parse(&source, &filename)
        .with_context(|| format!("failed to parse {filename}"))?;

    let pass1_output = resolve_addresses(&program, options.default_section_base)
        .context("failed during address resolution (pass 1)")?;

    let object = pass2::emit(&program, &pass1_output, &filename, options.default_section_base)
        .context("failed during code emission (pass 2)")?;

    if let Some(final_address) = options.final_address {
        for section in &object.sections {
            if !section.flags.is_ram() && section.end() > final_address {
                anyhow::bail!(
                    "section at 0x{:08x} ends at 0x{:08x}, past final address 0x{:08x}",
                    section.base_address,
                    section.end(),
                    final_address
                );
            }
        }
    }

    format::write_object(&object).context("failed to serialize object file")
}
