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

//! The `.g10` executable file format (spec §6.2) is a linker output,
//! not something this crate produces. These constants exist so a
//! linker built on top of this crate's `ObjectFile`/section-flag model
//! doesn't have to re-derive the contract.

use bitflags::bitflags;

/// `"G10X"` little-endian.
pub const MAGIC: u32 = 0x4731_3058;
pub const HEADER_SIZE: usize = 64;
pub const SEGMENT_ENTRY_SIZE: usize = 16;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SegmentType {
    Code = 0,
    Data = 1,
    Bss = 2,
    Metadata = 3,
    Interrupt = 4,
}

bitflags! {
    /// Maps 1:1 onto `object::SectionFlags` (spec §6.2, §4.7): a
    /// section's `EXECUTABLE | INITIALIZED` becomes a `CODE`/`DATA`
    /// segment with `LOAD | EXEC` or `LOAD`; `WRITABLE | ZERO` becomes
    /// a `BSS` segment with `ZERO_FILL | WRITE`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct SegmentFlags: u16 {
        const LOAD      = 0b0001;
        const ZERO_FILL = 0b0010;
        const EXEC      = 0b0100;
        const WRITE     = 0b1000;
    }
}

impl From<crate::object::SectionFlags> for SegmentFlags {
    fn from(section_flags: crate::object::SectionFlags) -> Self {
        use crate::object::SectionFlags as SF;
        if section_flags.contains(SF::WRITABLE) {
            SegmentFlags::ZERO_FILL | SegmentFlags::WRITE
        } else {
            let mut flags = SegmentFlags::LOAD;
            if section_flags.contains(SF::EXECUTABLE) {
                flags |= SegmentFlags::EXEC;
            }
            flags
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SectionFlags;

    #[test]
    fn rom_section_maps_to_load_exec() {
        let flags: SegmentFlags = (SectionFlags::EXECUTABLE | SectionFlags::INITIALIZED).into();
        assert_eq!(flags, SegmentFlags::LOAD | SegmentFlags::EXEC);
    }

    #[test]
    fn ram_section_maps_to_zero_fill_write() {
        let flags: SegmentFlags = (SectionFlags::WRITABLE | SectionFlags::ZERO).into();
        assert_eq!(flags, SegmentFlags::ZERO_FILL | SegmentFlags::WRITE);
    }
}
