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

//! `Vec<u8> -> ObjectFile`, with the validation spec §6.1 requires.

use tracing::debug;

use crate::errors::ObjectFormatError;
use crate::object::{
    Binding, ObjectFile, Relocation, RelocationType, Section, SectionFlags, Symbol, SymbolType,
    EXTERN_SENTINEL,
};

use super::{MAGIC, VERSION};

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ObjectFormatError> {
        if self.pos + n > self.bytes.len() {
            return Err(ObjectFormatError::Truncated {
                needed: self.pos + n,
                found: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ObjectFormatError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ObjectFormatError> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32, ObjectFormatError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i32(&mut self) -> Result<i32, ObjectFormatError> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }
}

pub fn read_object(bytes: &[u8]) -> Result<ObjectFile, ObjectFormatError> {
    let mut cursor = Cursor::new(bytes);

    let magic = cursor.u32()?;
    if magic != MAGIC {
        return Err(ObjectFormatError::BadMagic {
            expected: MAGIC,
            found: magic,
        });
    }
    let version = cursor.u16()?;
    if version != VERSION {
        return Err(ObjectFormatError::UnsupportedVersion(version));
    }
    let _flags = cursor.u16()?;
    let section_count = cursor.u16()?;
    let symbol_count = cursor.u16()?;
    let relocation_count = cursor.u32()?;
    let string_table_size = cursor.u32()?;
    let code_size = cursor.u32()?;
    let source_filename_offset = cursor.u32()?;
    let _reserved = cursor.u32()?;

    if section_count == 0 {
        return Err(ObjectFormatError::NoSections);
    }

    struct RawSection {
        base_address: u32,
        size: u32,
        offset: u32,
        flags: u16,
        alignment: u16,
    }
    let mut raw_sections = Vec::with_capacity(section_count as usize);
    for _ in 0..section_count {
        raw_sections.push(RawSection {
            base_address: cursor.u32()?,
            size: cursor.u32()?,
            offset: cursor.u32()?,
            flags: cursor.u16()?,
            alignment: cursor.u16()?,
        });
    }

    struct RawSymbol {
        name_offset: u32,
        value: u32,
        section_index: u16,
        symbol_type: u8,
        binding: u8,
        size: u32,
    }
    let mut raw_symbols = Vec::with_capacity(symbol_count as usize);
    for _ in 0..symbol_count {
        raw_symbols.push(RawSymbol {
            name_offset: cursor.u32()?,
            value: cursor.u32()?,
            section_index: cursor.u16()?,
            symbol_type: cursor.u8()?,
            binding: cursor.u8()?,
            size: cursor.u32()?,
        });
    }

    struct RawRelocation {
        offset: u32,
        section_index: u16,
        symbol_index: u16,
        addend: i32,
        reloc_type: u8,
    }
    let mut raw_relocations = Vec::with_capacity(relocation_count as usize);
    for _ in 0..relocation_count {
        let offset = cursor.u32()?;
        let section_index = cursor.u16()?;
        let symbol_index = cursor.u16()?;
        let addend = cursor.i32()?;
        let reloc_type = cursor.u8()?;
        let _reserved = cursor.take(3)?;
        raw_relocations.push(RawRelocation {
            offset,
            section_index,
            symbol_index,
            addend,
            reloc_type,
        });
    }

    let string_bytes = cursor.take(string_table_size as usize)?;
    let code_data = cursor.take(code_size as usize)?;

    let actual_code_size: u32 = raw_sections
        .iter()
        .filter(|s| !SectionFlags::from_bits_truncate(s.flags).is_ram())
        .map(|s| s.size)
        .sum();
    if actual_code_size != code_size {
        return Err(ObjectFormatError::CodeSizeMismatch {
            index: 0,
            code_size,
            actual: actual_code_size,
        });
    }

    for (index, section) in raw_sections.iter().enumerate() {
        let flags = SectionFlags::from_bits_truncate(section.flags);
        if flags.is_ram() {
            continue;
        }
        let end = section.offset + section.size;
        if end > code_size {
            return Err(ObjectFormatError::SectionOutOfRange {
                index: index as u16,
                offset: section.offset,
                end,
                code_size,
            });
        }
    }

    for i in 0..raw_sections.len() {
        let a = &raw_sections[i];
        if SectionFlags::from_bits_truncate(a.flags).is_ram() {
            continue;
        }
        for (j, b) in raw_sections.iter().enumerate().skip(i + 1) {
            if SectionFlags::from_bits_truncate(b.flags).is_ram() {
                continue;
            }
            let overlap = a.offset < b.offset + b.size && b.offset < a.offset + a.size;
            if overlap {
                return Err(ObjectFormatError::OverlappingSections {
                    a: i as u16,
                    b: j as u16,
                });
            }
        }
    }

    let read_string = |offset: u32| -> Result<String, ObjectFormatError> {
        read_null_terminated(string_bytes, offset)
            .ok_or(ObjectFormatError::StringOffsetOutOfRange {
                offset,
                size: string_bytes.len() as u32,
            })
    };

    let source_filename = read_string(source_filename_offset)?;

    let mut sections = Vec::with_capacity(raw_sections.len());
    for raw in &raw_sections {
        let flags = SectionFlags::from_bits_truncate(raw.flags);
        let mut section = Section::new(raw.base_address, flags);
        section.alignment = raw.alignment;
        if flags.is_ram() {
            section.reserved = raw.size;
        } else {
            let start = raw.offset as usize;
            let end = start + raw.size as usize;
            section.bytes = code_data[start..end].to_vec();
        }
        sections.push(section);
    }

    let mut symbols = Vec::with_capacity(raw_symbols.len());
    for (index, raw) in raw_symbols.iter().enumerate() {
        if raw.section_index != EXTERN_SENTINEL && raw.section_index as usize >= sections.len() {
            return Err(ObjectFormatError::InvalidSymbolSection {
                index: index as u16,
                section: raw.section_index,
            });
        }
        symbols.push(Symbol {
            name: read_string(raw.name_offset)?,
            value: raw.value,
            section_index: raw.section_index,
            symbol_type: decode_symbol_type(raw.symbol_type),
            binding: decode_binding(raw.binding),
            size: raw.size,
        });
    }

    let mut relocations = Vec::with_capacity(raw_relocations.len());
    for (index, raw) in raw_relocations.iter().enumerate() {
        if raw.section_index as usize >= sections.len() {
            return Err(ObjectFormatError::InvalidRelocationSection {
                index: index as u16,
                section: raw.section_index,
            });
        }
        let symbol = symbols.get(raw.symbol_index as usize).ok_or(
            ObjectFormatError::InvalidRelocationSymbol {
                index: index as u16,
                symbol: raw.symbol_index,
            },
        )?;
        relocations.push(Relocation {
            offset: raw.offset,
            section_index: raw.section_index,
            symbol_name: symbol.name.clone(),
            reloc_type: decode_relocation_type(raw.reloc_type),
            addend: raw.addend,
        });
    }

    debug!(
        sections = sections.len(),
        symbols = symbols.len(),
        relocations = relocations.len(),
        "object read"
    );

    Ok(ObjectFile {
        source_filename,
        sections,
        symbols,
        relocations,
    })
}

fn read_null_terminated(bytes: &[u8], offset: u32) -> Option<String> {
    let start = offset as usize;
    if start > bytes.len() {
        return None;
    }
    if start == bytes.len() {
        return if start == 0 { Some(String::new()) } else { None };
    }
    let end = bytes[start..].iter().position(|&b| b == 0)? + start;
    std::str::from_utf8(&bytes[start..end]).ok().map(str::to_owned)
}

fn decode_symbol_type(value: u8) -> SymbolType {
    match value {
        1 => SymbolType::Label,
        2 => SymbolType::Data,
        3 => SymbolType::Constant,
        4 => SymbolType::Section,
        _ => SymbolType::Undefined,
    }
}

fn decode_binding(value: u8) -> Binding {
    match value {
        1 => Binding::Global,
        2 => Binding::Extern,
        3 => Binding::Weak,
        _ => Binding::Local,
    }
}

fn decode_relocation_type(value: u8) -> RelocationType {
    match value {
        1 => RelocationType::Rel16,
        _ => RelocationType::Abs32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::writer::write_object;
    use crate::format::HEADER_SIZE;
    use crate::object::{ObjectFile as OF, Section as Sec, SectionFlags as SF};

    #[test]
    fn round_trips_a_minimal_object() {
        let mut object = OF::new("t.asm");
        let mut section = Sec::new(0x2000, SF::EXECUTABLE | SF::INITIALIZED);
        section.bytes = vec![0x00, 0x10, 0x42];
        object.sections.push(section);
        object.symbols.push(Symbol::local_label("start", 0x2000, 0));

        let bytes = write_object(&object).unwrap();
        let back = read_object(&bytes).unwrap();

        assert_eq!(back.source_filename, "t.asm");
        assert_eq!(back.sections.len(), 1);
        assert_eq!(back.sections[0].bytes, vec![0x00, 0x10, 0x42]);
        assert_eq!(back.symbols[0].name, "start");
        assert_eq!(back.symbols[0].value, 0x2000);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = vec![0u8; HEADER_SIZE + 1];
        bytes[4..6].copy_from_slice(&VERSION.to_le_bytes());
        assert!(matches!(
            read_object(&bytes),
            Err(ObjectFormatError::BadMagic { .. })
        ));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let bytes = vec![0u8; 2];
        assert!(matches!(
            read_object(&bytes),
            Err(ObjectFormatError::Truncated { .. })
        ));
    }
}
