use nom::{IResult, Needed};

use crate::error::PcapError;

/// Run a streaming nom parser over a complete buffer
///
/// Input is always fully resident, so `Incomplete` means the data is truncated: it is turned
/// into a [`PcapError::Truncated`] error naming `context`.
pub(crate) fn complete<'a, O, F>(
    context: &str,
    input: &'a [u8],
    mut parser: F,
) -> Result<(&'a [u8], O), PcapError>
where
    F: FnMut(&'a [u8]) -> IResult<&'a [u8], O, PcapError>,
{
    match parser(input) {
        Ok(r) => Ok(r),
        Err(nom::Err::Incomplete(needed)) => {
            let missing = match needed {
                Needed::Size(n) => n.get(),
                Needed::Unknown => 1,
            };
            Err(PcapError::Truncated {
                context: context.to_owned(),
                available: input.len(),
                missing,
            })
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
    }
}

/// Fail with a `Truncated` error unless `i` holds at least `len` bytes
#[inline]
pub(crate) fn require(context: &str, i: &[u8], len: usize) -> Result<(), PcapError> {
    if i.len() < len {
        Err(PcapError::Truncated {
            context: context.to_owned(),
            available: i.len(),
            missing: len - i.len(),
        })
    } else {
        Ok(())
    }
}
