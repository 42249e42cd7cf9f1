use thiserror::Error;

/// Errors raised by the two code-generation passes and the instruction
/// encoder (spec.md §7: Semantic and Encoder error kinds).
///
/// Both passes share one enum because Pass 1's structural checks
/// (duplicate labels, RAM-section violations, `.global`/`.extern`
/// mismatches) and Pass 2's encoder failures are reported the same way
/// to a caller: file, line, and a one-sentence reason.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("{file}:{line}: semantic error: {reason}")]
    Semantic {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("{file}:{line}: encoder error: mnemonic `{mnemonic}` has no encoding for operand shape {shape}")]
    UnencodableOperands {
        file: String,
        line: usize,
        mnemonic: String,
        shape: String,
    },

    #[error("{file}: structural error: {reason}")]
    Structural { file: String, reason: String },
}

impl AssemblyError {
    pub fn semantic(file: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        AssemblyError::Semantic {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn structural(file: impl Into<String>, reason: impl Into<String>) -> Self {
        AssemblyError::Structural {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while serializing or validating the on-disk `.g10obj`
/// format (spec.md §7: Writer error kind; §6.1: reader validation).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjectFormatError {
    #[error("relocation at offset 0x{offset:x} in section {section} references unknown symbol `{symbol}`")]
    UnknownRelocationSymbol {
        offset: u32,
        section: u16,
        symbol: String,
    },

    #[error("bad magic: expected 0x{expected:08x}, found 0x{found:08x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("unsupported object file version {0}")]
    UnsupportedVersion(u16),

    #[error("section count must be at least 1")]
    NoSections,

    #[error("section {index} size mismatch: header code size is {code_size}, sections sum to {actual}")]
    CodeSizeMismatch {
        index: u16,
        code_size: u32,
        actual: u32,
    },

    #[error("section {index} range 0x{offset:x}..0x{end:x} exceeds code data length {code_size}")]
    SectionOutOfRange {
        index: u16,
        offset: u32,
        end: u32,
        code_size: u32,
    },

    #[error("sections {a} and {b} overlap in code data")]
    OverlappingSections { a: u16, b: u16 },

    #[error("name offset 0x{offset:x} is outside the string table (size {size})")]
    StringOffsetOutOfRange { offset: u32, size: u32 },

    #[error("symbol {index} has out-of-range section index {section}")]
    InvalidSymbolSection { index: u16, section: u16 },

    #[error("relocation {index} has out-of-range section index {section}")]
    InvalidRelocationSection { index: u16, section: u16 },

    #[error("relocation {index} has out-of-range symbol index {symbol}")]
    InvalidRelocationSymbol { index: u16, symbol: u16 },

    #[error("truncated object file: needed {needed} bytes, found {found}")]
    Truncated { needed: usize, found: usize },

    #[error("{0}")]
    Io(String),
}

/// Errors raised by the reference (stand-in) parser. These are the
/// Lexical/Syntactic kinds from spec.md §7; a real preprocessor+parser
/// pipeline defines its own richer taxonomy (spec.md §1 treats that
/// pipeline as an external collaborator).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{file}:{line}: unknown lexeme `{lexeme}`")]
    UnknownLexeme {
        file: String,
        line: usize,
        lexeme: String,
    },

    #[error("{file}:{line}: {reason}")]
    Syntax {
        file: String,
        line: usize,
        reason: String,
    },
}
