use std::str;

use nom::bytes::streaming::take;
use nom::{Err, IResult};
use rusticata_macros::{align32, newtype_enum};

use crate::endianness::PcapEndianness;
use crate::error::PcapError;

/// Option code
///
/// Codes 0 and 1 are common to all blocks; other values depend on the block type, which is why
/// interface options are declared separately from section header options.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct OptionCode(pub u16);

newtype_enum! {
impl debug OptionCode {
    EndOfOpt = 0,
    Comment = 1,
    ShbUserAppl = 4,
    IfTsresol = 9,
    IfTsoffset = 14,
}
}

#[allow(non_upper_case_globals)]
impl OptionCode {
    pub const IfName: OptionCode = OptionCode(2);
}

/// An option from a block
///
/// `value` is limited to the `len` declared bytes (padding removed).
#[derive(Debug)]
pub struct PcapNGOption<'a> {
    pub code: OptionCode,
    pub len: u16,
    pub value: &'a [u8],
}

impl<'a> PcapNGOption<'a> {
    /// Return the option value as a string, or `None` if it is not valid UTF-8
    ///
    /// Trailing NUL bytes, written by some tools, are ignored.
    pub fn as_str(&self) -> Option<&'a str> {
        let end = self
            .value
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |p| p + 1);
        str::from_utf8(&self.value[..end]).ok()
    }
}

/// Return the first option with the given code, as a string
pub fn options_get_as_str<'a>(options: &[PcapNGOption<'a>], code: OptionCode) -> Option<&'a str> {
    options
        .iter()
        .find(|opt| opt.code == code)
        .and_then(|opt| opt.as_str())
}

/// Parse a list of options, until `opt_endofopt` or the end of the input
///
/// An option whose (padded) value does not fit in the remaining bytes is an
/// [`PcapError::OptionsOverrun`] error. Fewer than 4 stray bytes at the end are ignored.
pub(crate) fn parse_options<'a, En: PcapEndianness>(
    i: &'a [u8],
) -> IResult<&'a [u8], Vec<PcapNGOption<'a>>, PcapError> {
    let mut options = Vec::new();
    let mut i = i;
    while i.len() >= 4 {
        let (rem, code) = En::parse_u16(i)?;
        let (rem, len) = En::parse_u16(rem)?;
        if code == 0 {
            i = rem;
            break;
        }
        let padded_len = align32!(usize::from(len));
        if padded_len > rem.len() {
            return Err(Err::Error(PcapError::OptionsOverrun {
                code,
                length: len,
                available: rem.len(),
            }));
        }
        let (rem, value) = take(padded_len)(rem)?;
        options.push(PcapNGOption {
            code: OptionCode(code),
            len,
            value: &value[..usize::from(len)],
        });
        i = rem;
    }
    Ok((i, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endianness::{PcapBE, PcapLE};
    use hex_literal::hex;

    #[test]
    fn parse_comment_and_end() {
        let input = hex!("01 00 05 00 68 65 6c 6c 6f 00 00 00 00 00 00 00");
        let (rem, opts) = parse_options::<PcapLE>(&input).expect("options");
        assert!(rem.is_empty());
        assert_eq!(opts.len(), 1);
        assert_eq!(opts[0].code, OptionCode::Comment);
        assert_eq!(opts[0].as_str(), Some("hello"));
        assert_eq!(options_get_as_str(&opts, OptionCode::Comment), Some("hello"));
    }

    #[test]
    fn options_end_at_exhaustion() {
        let input = hex!("00 09 00 01 06 00 00 00");
        let (rem, opts) = parse_options::<PcapBE>(&input).expect("options");
        assert!(rem.is_empty());
        assert_eq!(opts[0].code, OptionCode::IfTsresol);
        assert_eq!(opts[0].value, &[6]);
    }

    #[test]
    fn option_overrun() {
        let input = hex!("01 00 10 00 61 62 63 64");
        match parse_options::<PcapLE>(&input) {
            Err(Err::Error(PcapError::OptionsOverrun {
                code,
                length,
                available,
            })) => {
                assert_eq!((code, length, available), (1, 16, 4));
            }
            r => panic!("unexpected result {:?}", r.map(|(_, o)| o)),
        }
    }
}
