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

//! `ObjectFile -> Vec<u8>` (spec §4.6).

use tracing::debug;

use crate::errors::ObjectFormatError;
use crate::object::{ObjectFile, Symbol};

use super::{MAGIC, VERSION};

/// Only section bytes that are physically present in the file (ROM)
/// advance the code-data cursor; a RAM section's `reserved` size is
/// recorded in its section entry but contributes no bytes here — the
/// loader zero-fills it from the segment size alone.
pub fn write_object(object: &ObjectFile) -> Result<Vec<u8>, ObjectFormatError> {
    let mut strings = crate::object::StringTable::new();
    let source_filename_offset = strings.add(&object.source_filename);

    let name_offsets: Vec<u32> = object
        .symbols
        .iter()
        .map(|s| strings.add(&s.name))
        .collect();

    let mut code_data = Vec::new();
    let mut section_offsets = Vec::with_capacity(object.sections.len());
    for section in &object.sections {
        section_offsets.push(code_data.len() as u32);
        if !section.flags.is_ram() {
            code_data.extend_from_slice(&section.bytes);
        }
    }
    let total_code_size = code_data.len() as u32;

    let mut relocation_symbol_indices = Vec::with_capacity(object.relocations.len());
    for reloc in &object.relocations {
        let index = symbol_index(&object.symbols, &reloc.symbol_name).ok_or_else(|| {
            ObjectFormatError::UnknownRelocationSymbol {
                offset: reloc.offset,
                section: reloc.section_index,
                symbol: reloc.symbol_name.clone(),
            }
        })?;
        relocation_symbol_indices.push(index);
    }

    let mut out = Vec::with_capacity(
        super::HEADER_SIZE
            + object.sections.len() * super::SECTION_ENTRY_SIZE
            + object.symbols.len() * super::SYMBOL_ENTRY_SIZE
            + object.relocations.len() * super::RELOCATION_ENTRY_SIZE
            + strings.len() as usize
            + code_data.len(),
    );

    write_header(&mut out, object, &strings, total_code_size, source_filename_offset);

    for (section, offset) in object.sections.iter().zip(&section_offsets) {
        out.extend_from_slice(&section.base_address.to_le_bytes());
        out.extend_from_slice(&section.size().to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&section.flags.bits().to_le_bytes());
        out.extend_from_slice(&section.alignment.to_le_bytes());
    }

    for (symbol, name_offset) in object.symbols.iter().zip(&name_offsets) {
        out.extend_from_slice(&name_offset.to_le_bytes());
        out.extend_from_slice(&symbol.value.to_le_bytes());
        out.extend_from_slice(&symbol.section_index.to_le_bytes());
        out.push(symbol.symbol_type as u8);
        out.push(symbol.binding as u8);
        out.extend_from_slice(&symbol.size.to_le_bytes());
    }

    for (reloc, symbol_index) in object.relocations.iter().zip(&relocation_symbol_indices) {
        out.extend_from_slice(&reloc.offset.to_le_bytes());
        out.extend_from_slice(&reloc.section_index.to_le_bytes());
        out.extend_from_slice(&symbol_index.to_le_bytes());
        out.extend_from_slice(&reloc.addend.to_le_bytes());
        out.push(reloc.reloc_type as u8);
        out.extend_from_slice(&[0u8; 3]);
    }

    out.extend_from_slice(strings.as_bytes());
    out.extend_from_slice(&code_data);

    debug!(
        bytes = out.len(),
        sections = object.sections.len(),
        symbols = object.symbols.len(),
        relocations = object.relocations.len(),
        "object written"
    );
    Ok(out)
}

fn write_header(
    out: &mut Vec<u8>,
    object: &ObjectFile,
    strings: &crate::object::StringTable,
    total_code_size: u32,
    source_filename_offset: u32,
) {
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // flags, reserved for future use
    out.extend_from_slice(&(object.sections.len() as u16).to_le_bytes());
    out.extend_from_slice(&(object.symbols.len() as u16).to_le_bytes());
    out.extend_from_slice(&(object.relocations.len() as u32).to_le_bytes());
    out.extend_from_slice(&strings.len().to_le_bytes());
    out.extend_from_slice(&total_code_size.to_le_bytes());
    out.extend_from_slice(&source_filename_offset.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
}

fn symbol_index(symbols: &[Symbol], name: &str) -> Option<u32> {
    symbols.iter().position(|s| s.name == name).map(|i| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Section, SectionFlags};

    #[test]
    fn empty_object_is_header_plus_the_empty_string_byte() {
        let object = ObjectFile::new("");
        let bytes = write_object(&object).unwrap();
        assert_eq!(bytes.len(), super::super::HEADER_SIZE + 1);
    }

    #[test]
    fn unresolved_relocation_symbol_is_fatal() {
        let mut object = ObjectFile::new("t.asm");
        object.sections.push(Section::new(0x2000, SectionFlags::EXECUTABLE));
        object.relocations.push(crate::object::Relocation::abs32(0, 0, "missing"));
        assert!(write_object(&object).is_err());
    }
}
