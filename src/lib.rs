//! Embed compiled SPIR-V binaries into a C header.
//!
//! Each shader becomes a `static const uint32_t` array of little-endian words
//! plus a `<name>_size` constant holding its size in bytes. The helpers here
//! are used by the `embed-spirv` binary and can be called from build scripts.
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

mod error;
pub use error::Error;

/// Number of words emitted per row inside an array initializer
pub const WORDS_PER_ROW: usize = 8;

const PREAMBLE: &str = "// Auto-generated SPIR-V shader bytecode
#ifndef SHADER_SPIRV_H
#define SHADER_SPIRV_H

#include <stdint.h>
#include <stddef.h>

";

const TRAILER: &str = "#endif\n";

/// Derive the C symbol for a shader from its file name
///
/// Every `.` becomes `_`, so `blit.frag.spv` turns into `blit_frag_spv`. No
/// other characters are rewritten; names that still are not C identifiers,
/// or that are C keywords, are rejected.
pub fn symbol_name(path: &Path) -> Result<String, Error> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::InvalidFileName(path.to_path_buf()))?;
    let symbol = file_name.replace('.', "_");
    if !is_c_identifier(&symbol) {
        return Err(Error::InvalidSymbol {
            path: path.to_path_buf(),
            symbol,
        });
    }
    Ok(symbol)
}

// C11 keywords plus the ones C23 adds
const C_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "auto", "bool", "break", "case", "char", "const", "constexpr",
    "continue", "default", "do", "double", "else", "enum", "extern", "false", "float", "for",
    "goto", "if", "inline", "int", "long", "nullptr", "register", "restrict", "return", "short",
    "signed", "sizeof", "static", "static_assert", "struct", "switch", "thread_local", "true",
    "typedef", "typeof", "typeof_unqual", "union", "unsigned", "void", "volatile", "while",
    "_Alignas", "_Alignof", "_Atomic", "_BitInt", "_Bool", "_Complex", "_Decimal128",
    "_Decimal32", "_Decimal64", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert",
    "_Thread_local",
];

fn is_c_identifier(s: &str) -> bool {
    if C_KEYWORDS.contains(&s) {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => (),
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Reinterpret raw bytes as little-endian 32-bit words
///
/// A trailing chunk of 1-3 bytes is decoded as a narrower little-endian
/// integer, i.e. its missing high bytes read as zero.
pub fn decode_words(bytes: &[u8]) -> Vec<u32> {
    let chunks = bytes.chunks_exact(4);
    let tail = chunks.remainder();

    let mut words = Vec::with_capacity(bytes.len().div_ceil(4));
    for chunk in chunks {
        words.push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    if !tail.is_empty() {
        let mut word = [0u8; 4];
        word[..tail.len()].copy_from_slice(tail);
        words.push(u32::from_le_bytes(word));
    }
    words
}

/// Format a word as a C hex literal, e.g. `0x07230203`
pub fn format_word(word: u32) -> String {
    format!("0x{word:08x}")
}

/// Every name a header declares, mapped to the input that declared it
///
/// Each shader claims both `<symbol>` and `<symbol>_size`, so `a.spv` and
/// `a_spv.size` clash on `a_spv_size`.
#[derive(Default)]
struct SymbolTable {
    names: HashMap<String, PathBuf>,
    shaders: usize,
}

impl SymbolTable {
    fn claim(&mut self, symbol: &str, path: &Path) -> Result<(), Error> {
        let size = format!("{symbol}_size");
        for name in [symbol, size.as_str()] {
            if let Some(first) = self.names.get(name) {
                return Err(Error::DuplicateSymbol {
                    symbol: name.to_owned(),
                    first: first.clone(),
                    second: path.to_path_buf(),
                });
            }
        }
        self.names.insert(symbol.to_owned(), path.to_path_buf());
        self.names.insert(size, path.to_path_buf());
        self.shaders += 1;
        Ok(())
    }
}

/// A shader binary paired with the symbol it is emitted under
#[derive(Clone, Debug)]
pub struct ShaderBinary {
    path: PathBuf,
    symbol: String,
    bytes: Vec<u8>,
}

impl ShaderBinary {
    /// Wrap bytes that were obtained elsewhere; the symbol comes from `path`
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self, Error> {
        let path = path.into();
        let symbol = symbol_name(&path)?;
        Ok(Self {
            path,
            symbol,
            bytes,
        })
    }

    /// Read a shader binary from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(path, bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn words(&self) -> Vec<u32> {
        decode_words(&self.bytes)
    }
}

/// Streams a header: preamble on construction, one block per shader, and
/// the include-guard trailer on [`HeaderWriter::finish`]
pub struct HeaderWriter<W: Write> {
    out: W,
    symbols: SymbolTable,
}

impl<W: Write> HeaderWriter<W> {
    pub fn new(mut out: W) -> Result<Self, Error> {
        out.write_all(PREAMBLE.as_bytes())?;
        Ok(Self {
            out,
            symbols: SymbolTable::default(),
        })
    }

    /// Append the array and size declarations for one shader
    pub fn write_shader(&mut self, shader: &ShaderBinary) -> Result<(), Error> {
        self.symbols.claim(shader.symbol(), shader.path())?;

        let symbol = shader.symbol();
        let words = shader.words();
        let partial = shader.bytes().len() % 4 != 0;
        if partial {
            warn!(
                "{}: {} bytes is not a whole number of words",
                shader.path().display(),
                shader.bytes().len()
            );
        }
        debug!(
            "embedding {} as `{symbol}` ({} bytes, {} words{})",
            shader.path().display(),
            shader.bytes().len(),
            words.len(),
            if partial { ", partial tail" } else { "" }
        );

        writeln!(self.out, "static const uint32_t {symbol}[] = {{")?;
        for row in words.chunks(WORDS_PER_ROW) {
            let row: Vec<String> = row.iter().map(|&w| format_word(w)).collect();
            writeln!(self.out, "    {},", row.join(", "))?;
        }
        writeln!(self.out, "}};")?;
        writeln!(
            self.out,
            "static const size_t {symbol}_size = sizeof({symbol});\n"
        )?;
        Ok(())
    }

    /// Number of shaders written so far
    pub fn len(&self) -> usize {
        self.symbols.shaders
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.shaders == 0
    }

    /// Write the trailer and flush, returning the underlying writer
    pub fn finish(mut self) -> Result<W, Error> {
        self.out.write_all(TRAILER.as_bytes())?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Render a complete header in memory
pub fn render_header(shaders: &[ShaderBinary]) -> Result<String, Error> {
    let mut writer = HeaderWriter::new(Vec::new())?;
    for shader in shaders {
        writer.write_shader(shader)?;
    }
    let bytes = writer.finish()?;
    // Symbols are ASCII identifiers and everything else is fixed text
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reject input lists where two paths declare the same name, counting both
/// the arrays and their `_size` constants
///
/// Runs before any file is opened, so a bad argument list never produces
/// output.
pub fn check_symbols<P: AsRef<Path>>(inputs: &[P]) -> Result<(), Error> {
    let mut seen = SymbolTable::default();
    for path in inputs {
        let path = path.as_ref();
        seen.claim(&symbol_name(path)?, path)?;
    }
    Ok(())
}

/// Generate the header at `output` from `inputs`, in order
///
/// The header is written to a temporary file next to `output` and renamed
/// over it only once complete, so a failed run leaves `output` untouched.
///
/// The rename replaces `output` itself: a symlink there becomes a regular
/// file, and an existing header's mode and owner are not kept (the new file
/// is `0644` on Unix, owned by the caller).
pub fn generate<P: AsRef<Path>>(output: &Path, inputs: &[P]) -> Result<(), Error> {
    check_symbols(inputs)?;

    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".spirv-embed-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }
    let tmp = builder
        .tempfile_in(dir)
        .map_err(|source| Error::CreateOutput {
            path: output.to_path_buf(),
            source,
        })?;

    let mut writer = HeaderWriter::new(BufWriter::new(tmp))?;
    for path in inputs {
        let shader = ShaderBinary::load(path)?;
        writer.write_shader(&shader)?;
    }
    let count = writer.len();
    let tmp = writer
        .finish()?
        .into_inner()
        .map_err(|e| Error::Write(e.into_error()))?;

    tmp.persist(output).map_err(|e| Error::PersistOutput {
        path: output.to_path_buf(),
        source: e.error,
    })?;
    info!("wrote {} ({count} shaders)", output.display());
    Ok(())
}
