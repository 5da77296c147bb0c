use rusticata_macros::newtype_enum;

/// Data link type
///
/// Identifies the header found at the beginning of every frame of a capture (or of an
/// interface, for PCAPNG). It is also the identifier the decode pipeline starts from.
///
/// See <http://www.tcpdump.org/linktypes.html>
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Linktype(pub i32);

newtype_enum! {
impl display Linktype {
    NULL = 0,
    ETHERNET = 1,

    IEEE802_5 = 6,
    FDDI = 10,

    RAW = 101,
    IEEE802_11 = 105,

    LOOP = 108,
    LINUX_SLL = 113,
    IEEE802_11_RADIOTAP = 127,

    // Raw IPv4; the packet begins with an IPv4 header.
    IPV4 = 228,
    // Raw IPv6; the packet begins with an IPv6 header.
    IPV6 = 229,

    LINUX_SLL2 = 276,
}
}

impl From<u16> for Linktype {
    /// PCAPNG interface descriptions store the link type on 16 bits
    fn from(v: u16) -> Self {
        Linktype(i32::from(v))
    }
}
