use std::sync::Arc;

use crate::endianness::Endianness;
use crate::error::PcapError;
use crate::frame::InterfaceInfo;

use super::*;

/// State of the section being read
///
/// A section header block resets everything: interfaces and names are only valid in the section
/// that declared them.
#[derive(Clone, Debug)]
pub struct Section {
    pub endianness: Endianness,
    pub major_version: u16,
    pub minor_version: u16,
    /// Declared length of the section, -1 if unknown
    pub section_length: i64,
    /// Interfaces, indexed by interface id
    pub interfaces: Vec<Arc<InterfaceInfo>>,
    /// Entries of all name resolution blocks of the section
    pub name_records: Vec<NameEntry>,
}

impl Section {
    /// An empty section with the given byte order
    pub fn new(endianness: Endianness) -> Section {
        Section {
            endianness,
            major_version: 1,
            minor_version: 0,
            section_length: -1,
            interfaces: Vec::new(),
            name_records: Vec::new(),
        }
    }

    pub fn from_header(shb: &SectionHeaderBlock) -> Section {
        Section {
            major_version: shb.major_version,
            minor_version: shb.minor_version,
            section_length: shb.section_len,
            ..Section::new(shb.endianness)
        }
    }

    /// Register an interface; its id is its index in the section
    pub fn add_interface(&mut self, idb: &InterfaceDescriptionBlock) -> &Arc<InterfaceInfo> {
        let id = self.interfaces.len() as u32;
        self.interfaces.push(Arc::new(idb.to_interface_info(id)));
        &self.interfaces[id as usize]
    }

    pub fn interface(&self, interface_id: u32) -> Result<&Arc<InterfaceInfo>, PcapError> {
        self.interfaces
            .get(interface_id as usize)
            .ok_or(PcapError::UnknownInterface {
                interface_id,
                known: self.interfaces.len(),
            })
    }

    pub fn add_names(&mut self, nrb: &NameResolutionBlock) {
        self.name_records.extend(nrb.entries());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linktype::Linktype;

    #[test]
    fn interfaces_are_indexed_in_order() {
        let mut section = Section::new(Endianness::Little);
        let idb = InterfaceDescriptionBlock {
            linktype: Linktype::RAW,
            reserved: 0,
            snaplen: 0,
            options: Vec::new(),
            if_tsresol: 9,
            if_tsoffset: 0,
        };
        section.add_interface(&idb);
        let iface = section.add_interface(&idb).clone();
        assert_eq!(iface.interface_id, 1);
        assert_eq!(iface.ts_resolution, 1_000_000_000);
        assert!(section.interface(1).is_ok());
        assert!(matches!(
            section.interface(2),
            Err(PcapError::UnknownInterface {
                interface_id: 2,
                known: 2
            })
        ));
    }
}
