//! Code 128 symbology: code-set selection, checksum and module patterns.

use crate::error::EncodingError;

pub const START_A: u8 = 103;
pub const START_B: u8 = 104;
pub const START_C: u8 = 105;
pub const STOP: u8 = 106;

const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;

/// Modules per data symbol. The stop symbol is two modules wider.
pub const SYMBOL_MODULES: usize = 11;
pub const STOP_MODULES: usize = 13;

/// Bar/space widths for symbol values 0..=106, starting with a bar.
const PATTERNS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn value_of(self, byte: u8) -> Option<u8> {
        match self {
            CodeSet::A if byte < 32 => Some(byte + 64),
            CodeSet::A if byte < 96 => Some(byte - 32),
            CodeSet::B if (32..128).contains(&byte) => Some(byte - 32),
            _ => None,
        }
    }
}

/// Encodes `value` into Code 128 symbol values.
///
/// The result starts with a start symbol and ends with the checksum and the
/// stop symbol. Code set C packs digit pairs; A and B cover the rest of ASCII.
pub fn encode(value: &str) -> Result<Vec<u8>, EncodingError> {
    if value.is_empty() {
        return Err(EncodingError::Empty);
    }
    if let Some((index, ch)) = value.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
        return Err(EncodingError::UnsupportedCharacter { ch, index });
    }

    let bytes = value.as_bytes();
    let mut symbols = Vec::with_capacity(bytes.len() + 4);

    let leading = digit_run(bytes, 0);
    let mut set = if leading % 2 == 0 && (leading >= 4 || leading == bytes.len()) {
        symbols.push(START_C);
        CodeSet::C
    } else {
        match letter_set(bytes, 0) {
            CodeSet::A => {
                symbols.push(START_A);
                CodeSet::A
            }
            _ => {
                symbols.push(START_B);
                CodeSet::B
            }
        }
    };

    let mut i = 0;
    while i < bytes.len() {
        if set == CodeSet::C {
            if digit_run(bytes, i) >= 2 {
                symbols.push((bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0'));
                i += 2;
            } else {
                set = letter_set(bytes, i);
                symbols.push(if set == CodeSet::A { CODE_A } else { CODE_B });
            }
            continue;
        }

        let run = digit_run(bytes, i);
        if run >= 4 {
            if run % 2 == 1 {
                symbols.extend(set.value_of(bytes[i]));
                i += 1;
            }
            symbols.push(CODE_C);
            set = CodeSet::C;
            continue;
        }

        let byte = bytes[i];
        let symbol = match set.value_of(byte) {
            Some(symbol) => symbol,
            None => {
                set = if set == CodeSet::A { CodeSet::B } else { CodeSet::A };
                symbols.push(if set == CodeSet::A { CODE_A } else { CODE_B });
                // Every ASCII byte is representable in either A or B.
                set.value_of(byte).unwrap_or_default()
            }
        };
        symbols.push(symbol);
        i += 1;
    }

    symbols.push(checksum(&symbols));
    symbols.push(STOP);
    Ok(symbols)
}

/// Modulo-103 weighted sum over the start symbol and data symbols.
pub fn checksum(symbols: &[u8]) -> u8 {
    let sum = symbols
        .iter()
        .enumerate()
        .map(|(position, &value)| value as u32 * (position as u32).max(1))
        .sum::<u32>();
    (sum % 103) as u8
}

/// Expands symbol values into a bar (`true`) / space (`false`) module row.
pub fn modules(symbols: &[u8]) -> Vec<bool> {
    let mut row = Vec::with_capacity(symbols.len() * SYMBOL_MODULES + 2);
    for &symbol in symbols {
        let pattern = PATTERNS[symbol as usize];
        for (element, width) in pattern.bytes().enumerate() {
            let is_bar = element % 2 == 0;
            row.extend(std::iter::repeat_n(is_bar, (width - b'0') as usize));
        }
    }
    row
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Picks A when a control character shows up before any lowercase letter.
fn letter_set(bytes: &[u8], from: usize) -> CodeSet {
    bytes[from..]
        .iter()
        .find_map(|&b| match b {
            0..32 => Some(CodeSet::A),
            96..128 => Some(CodeSet::B),
            _ => None,
        })
        .unwrap_or(CodeSet::B)
}
