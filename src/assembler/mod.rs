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

//! Address resolution, instruction sizing and code emission (spec
//! §4.3–§4.5). `pass1` and `pass2` each walk the program once and
//! agree on section boundaries only because both derive them from the
//! same deterministic rule in [`open_or_rebase_section`].

pub mod pass1;
pub mod pass2;
pub mod size;

use crate::object::{Section, SectionFlags};

/// Default ROM section base when a program opens no `.ORG` at all
/// (spec §3, §4.3 step 1/3).
pub const DEFAULT_SECTION_BASE: u32 = 0x0000_2000;

/// Finds the index of a section already opened at exactly `base`
/// (Pass 2 re-locates the section Pass 1 implied for a given `.ORG`,
/// spec §4.5).
pub fn find_section_by_base(sections: &[Section], base: u32) -> Option<usize> {
    sections.iter().position(|s| s.base_address == base)
}

/// Implements the `.ORG` section bookkeeping rule from spec §4.3: if
/// the current section is still empty, rebase it in place; otherwise
/// (or if none is open yet) start a new section.
pub fn open_or_rebase_section(
    sections: &mut Vec<Section>,
    current: Option<usize>,
    addr: u32,
) -> usize {
    let flags = SectionFlags::for_base_address(addr);
    if let Some(idx) = current {
        if sections[idx].is_empty() {
            sections[idx].base_address = addr;
            sections[idx].flags = flags;
            return idx;
        }
    }
    sections.push(Section::new(addr, flags));
    sections.len() - 1
}
