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

//! On-disk `.g10obj` layout (spec §4.6, §6.1) and the `.g10` executable
//! contract constants (§6.2). `writer` turns an `ObjectFile` into bytes,
//! `reader` turns bytes back into one with the validation §6.1 requires.

pub mod executable;
pub mod reader;
pub mod writer;

pub use reader::read_object;
pub use writer::write_object;

/// `"G10A"` little-endian.
pub const MAGIC: u32 = 0x4731_3041;
pub const VERSION: u16 = 0x0001;

pub const HEADER_SIZE: usize = 32;
pub const SECTION_ENTRY_SIZE: usize = 16;
pub const SYMBOL_ENTRY_SIZE: usize = 16;
pub const RELOCATION_ENTRY_SIZE: usize = 16;
