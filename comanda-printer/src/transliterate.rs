//! ASCII transliteration for accent-less receipt printers
//!
//! The remote print agent drives hardware whose character set stops at
//! 0x7F, so rendered text must be folded to plain ASCII before it goes on
//! the wire. Accented Latin letters map to their base letter and the
//! cedilla maps to a plain c. The mapping is applied at render time only;
//! stored order data keeps its original spelling.

/// Fold a string to the ASCII range
///
/// Characters already below 0x80 pass through unchanged. Anything outside
/// the known Latin table is replaced with `?` so the printer never receives
/// a byte it cannot draw.
pub fn to_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            fold_char(c, &mut out);
        }
    }
    out
}

fn fold_char(c: char, out: &mut String) {
    let folded: &str = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'É' | 'È' | 'Ê' | 'Ë' => "E",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'Í' | 'Ì' | 'Î' | 'Ï' => "I",
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => "o",
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => "O",
        'ú' | 'ù' | 'û' | 'ü' => "u",
        'Ú' | 'Ù' | 'Û' | 'Ü' => "U",
        'ç' => "c",
        'Ç' => "C",
        'ñ' => "n",
        'Ñ' => "N",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        // Typographic punctuation that shows up in free-text notes
        '\u{2018}' | '\u{2019}' => "'",
        '\u{201C}' | '\u{201D}' => "\"",
        '\u{2013}' | '\u{2014}' => "-",
        '\u{00BA}' | '\u{00B0}' => "o",
        '\u{00AA}' => "a",
        _ => "?",
    };
    out.push_str(folded);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(to_ascii("Pedido #42 - Total R$10.00"), "Pedido #42 - Total R$10.00");
    }

    #[test]
    fn test_portuguese_accents() {
        assert_eq!(to_ascii("Observação"), "Observacao");
        assert_eq!(to_ascii("Pão de queijo"), "Pao de queijo");
        assert_eq!(to_ascii("Açaí"), "Acai");
        assert_eq!(to_ascii("ENDEREÇO"), "ENDERECO");
    }

    #[test]
    fn test_ordinal_markers() {
        assert_eq!(to_ascii("3º andar"), "3o andar");
        assert_eq!(to_ascii("1ª Avenida"), "1a Avenida");
    }

    #[test]
    fn test_unknown_chars_replaced() {
        assert_eq!(to_ascii("café 中"), "cafe ?");
    }
}
