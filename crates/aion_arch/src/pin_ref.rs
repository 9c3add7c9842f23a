//! Parsing of pin references such as `clb.I[3:0]`, `O[2]`, or `cin`.

/// A parsed pin reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRef<'a> {
    /// Tile type name, when written as `tile.port`.
    pub tile: Option<&'a str>,
    /// Port name.
    pub port: &'a str,
    /// Bit range `(start, end)`; `None` selects the whole port.
    ///
    /// `port[msb:lsb]` yields `start = lsb` and `end = msb`, so a range
    /// written low-to-high as `port[0:3]` comes back reversed.
    pub range: Option<(usize, usize)>,
}

/// Parses a pin reference.
pub fn parse_pin_ref(text: &str) -> Result<PinRef<'_>, String> {
    let text = text.trim();
    let (head, range) = match text.find('[') {
        Some(open) => {
            let close = text
                .strip_suffix(']')
                .ok_or_else(|| "missing closing ']'".to_string())?;
            let inner = &close[open + 1..];
            let range = match inner.split_once(':') {
                Some((msb, lsb)) => (parse_index(lsb)?, parse_index(msb)?),
                None => {
                    let bit = parse_index(inner)?;
                    (bit, bit)
                }
            };
            (&text[..open], Some(range))
        }
        None => (text, None),
    };
    let (tile, port) = match head.split_once('.') {
        Some((tile, port)) => (Some(tile), port),
        None => (None, head),
    };
    if port.is_empty() || tile.is_some_and(str::is_empty) {
        return Err("empty tile or port name".to_string());
    }
    Ok(PinRef { tile, port, range })
}

fn parse_index(text: &str) -> Result<usize, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("'{}' is not a pin index", text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_port() {
        let r = parse_pin_ref("clb.O").unwrap();
        assert_eq!(r.tile, Some("clb"));
        assert_eq!(r.port, "O");
        assert_eq!(r.range, None);
        assert_eq!(parse_pin_ref("cin").unwrap().tile, None);
    }

    #[test]
    fn msb_lsb_range() {
        let r = parse_pin_ref("clb.I[3:0]").unwrap();
        assert_eq!(r.range, Some((0, 3)));
        let r = parse_pin_ref("I[0:3]").unwrap();
        assert_eq!(r.range, Some((3, 0)));
    }

    #[test]
    fn single_bit() {
        assert_eq!(parse_pin_ref("O[ 2 ]").unwrap().range, Some((2, 2)));
    }

    #[test]
    fn malformed() {
        assert!(parse_pin_ref("I[3").is_err());
        assert!(parse_pin_ref("I[x]").is_err());
        assert!(parse_pin_ref(".I").is_err());
        assert!(parse_pin_ref("").is_err());
    }
}
