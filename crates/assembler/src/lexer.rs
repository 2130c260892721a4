//! Tokenizer for Chassis assembly text.

use crate::error::AsmError;
use std::fmt;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// A mnemonic. Always uppercase.
    Ident(String),
    /// A register reference `rN`, holding `N`.
    Register(u64),
    /// A numeric literal (decimal or hex).
    Number(u64),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => f.write_str(s),
            Token::Register(n) => write!(f, "r{n}"),
            Token::Number(n) => write!(f, "{n:#x}"),
        }
    }
}

fn parse_number(word: &str, line_num: usize) -> Result<u64, AsmError> {
    let parsed = match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => word.parse(),
    };
    parsed.map_err(|_| AsmError::InvalidNumber {
        line: line_num,
        token: word.to_string(),
    })
}

/// `r12` or `R12`, but not mnemonics such as `RET` or `RC4K`.
fn register_index(word: &str) -> Option<&str> {
    let digits = word.strip_prefix(['r', 'R'])?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` and extend to end of line. Operands are
/// separated by whitespace and optional commas.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };

    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|word| !word.is_empty())
        .map(|word| {
            if let Some(digits) = register_index(word) {
                parse_number(digits, line_num).map(Token::Register)
            } else if word.as_bytes()[0].is_ascii_digit() {
                parse_number(word, line_num).map(Token::Number)
            } else {
                Ok(Token::Ident(word.to_uppercase()))
            }
        })
        .collect()
}
