//! Domain name decompression (RFC 1035 section 4.1.4)

use crate::error::PcapError;

/// Maximum number of compression pointers followed for one name
pub const MAX_COMPRESSION_DEPTH: u8 = 10;

/// Maximum length of a name on the wire, length bytes included
pub const MAX_NAME_LENGTH: usize = 255;

fn truncated(msg: &[u8], pos: usize, needed: usize) -> PcapError {
    let available = msg.len().saturating_sub(pos);
    PcapError::Truncated {
        context: format!("name at offset {}", pos),
        available,
        missing: needed.saturating_sub(available).max(1),
    }
}

/// Append the labels of the name starting at `offset` to `labels`
///
/// Returns the number of bytes of the name at `offset`: a pointer counts for its 2 bytes, the
/// labels it points to are not consumed.
fn read_labels<'a>(
    msg: &'a [u8],
    offset: usize,
    depth: u8,
    labels: &mut Vec<&'a [u8]>,
) -> Result<usize, PcapError> {
    if depth > MAX_COMPRESSION_DEPTH {
        return Err(PcapError::CompressionLoop {
            offset,
            max_depth: MAX_COMPRESSION_DEPTH,
        });
    }
    let mut pos = offset;
    loop {
        let len = *msg.get(pos).ok_or_else(|| truncated(msg, pos, 1))?;
        match len & 0xc0 {
            0x00 => {
                if len == 0 {
                    return Ok(pos + 1 - offset);
                }
                let start = pos + 1;
                let end = start + usize::from(len);
                let label = msg
                    .get(start..end)
                    .ok_or_else(|| truncated(msg, start, usize::from(len)))?;
                labels.push(label);
                pos = end;
            }
            0xc0 => {
                let low = *msg.get(pos + 1).ok_or_else(|| truncated(msg, pos, 2))?;
                let target = usize::from(len & 0x3f) << 8 | usize::from(low);
                // only backward pointers can terminate
                if target >= pos {
                    return Err(PcapError::CompressionLoop {
                        offset: pos,
                        max_depth: MAX_COMPRESSION_DEPTH,
                    });
                }
                read_labels(msg, target, depth + 1, labels)?;
                return Ok(pos + 2 - offset);
            }
            bits => {
                return Err(PcapError::ReservedLabelType { offset: pos, bits });
            }
        }
    }
}

/// Decode the (possibly compressed) name at `offset` in the DNS message `msg`
///
/// Returns the dotted name and the number of bytes it occupies at `offset`. The root name is
/// the empty string. Labels that are not valid UTF-8 are converted lossily.
pub fn read_name(msg: &[u8], offset: usize) -> Result<(String, usize), PcapError> {
    let mut labels = Vec::new();
    let consumed = read_labels(msg, offset, 0, &mut labels)?;
    let wire_length = labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1;
    let name = labels
        .iter()
        .map(|l| String::from_utf8_lossy(l))
        .collect::<Vec<_>>()
        .join(".");
    if wire_length > MAX_NAME_LENGTH {
        return Err(PcapError::NameTooLong {
            name,
            offset,
            length: wire_length,
        });
    }
    Ok((name, consumed))
}
