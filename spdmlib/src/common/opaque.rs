// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The DSP0277 secured-message opaque-data table (spec §6): a spec-id'd,
//! versioned list of vendor-tagged elements, each padded to a 4-byte
//! boundary.

use codec::{Codec, Reader, Writer};

use crate::config::MAX_SPDM_OPAQUE_SIZE;

pub const SPDM_OPAQUE_DATA_SPEC_ID: u32 = 0x444D_5446; // "DMTF" little-endian on the wire
pub const SPDM_OPAQUE_VERSION: u8 = 0x1;
const MAX_VENDOR_ID_LEN: usize = 16;
const MAX_OPAQUE_ELEMENT_DATA_LEN: usize = 256;
const MAX_OPAQUE_ELEMENTS: usize = 4;

/// One element of an opaque table: `{id, vendor_id[vendor_len], data[len]}`,
/// aligned to 4 bytes.
#[derive(Debug, Clone, Copy)]
pub struct SpdmOpaqueElement {
    pub id: u8,
    pub vendor_id: [u8; MAX_VENDOR_ID_LEN],
    pub vendor_len: u8,
    pub data: [u8; MAX_OPAQUE_ELEMENT_DATA_LEN],
    pub data_len: u16,
}

impl Default for SpdmOpaqueElement {
    fn default() -> Self {
        SpdmOpaqueElement {
            id: 0,
            vendor_id: [0u8; MAX_VENDOR_ID_LEN],
            vendor_len: 0,
            data: [0u8; MAX_OPAQUE_ELEMENT_DATA_LEN],
            data_len: 0,
        }
    }
}

impl SpdmOpaqueElement {
    fn wire_len(&self) -> usize {
        // id(1) + vendor_len(1) + vendor_id + data_len(2) + data, padded to 4
        let raw = 1 + 1 + self.vendor_len as usize + 2 + self.data_len as usize;
        (raw + 3) & !3
    }

    fn encode(&self, bytes: &mut Writer) {
        let start = bytes.used();
        self.id.encode(bytes);
        self.vendor_len.encode(bytes);
        bytes.push(&self.vendor_id[..self.vendor_len as usize]);
        self.data_len.encode(bytes);
        bytes.push(&self.data[..self.data_len as usize]);
        let written = bytes.used() - start;
        let padded = (written + 3) & !3;
        for _ in written..padded {
            0u8.encode(bytes);
        }
    }

    fn read(r: &mut Reader) -> Option<Self> {
        let start_left = r.left();
        let id = u8::read(r)?;
        let vendor_len = u8::read(r)?;
        if vendor_len as usize > MAX_VENDOR_ID_LEN {
            return None;
        }
        let mut vendor_id = [0u8; MAX_VENDOR_ID_LEN];
        vendor_id[..vendor_len as usize].copy_from_slice(r.take(vendor_len as usize)?);
        let data_len = u16::read(r)?;
        if data_len as usize > MAX_OPAQUE_ELEMENT_DATA_LEN {
            return None;
        }
        let mut data = [0u8; MAX_OPAQUE_ELEMENT_DATA_LEN];
        data[..data_len as usize].copy_from_slice(r.take(data_len as usize)?);
        let consumed = start_left - r.left();
        let pad = ((consumed + 3) & !3) - consumed;
        r.take(pad)?;
        Some(SpdmOpaqueElement {
            id,
            vendor_id,
            vendor_len,
            data,
            data_len,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmOpaqueStruct {
    pub data_size: u16,
    pub data: [u8; MAX_SPDM_OPAQUE_SIZE],
}

impl Default for SpdmOpaqueStruct {
    fn default() -> Self {
        SpdmOpaqueStruct {
            data_size: 0,
            data: [0u8; MAX_SPDM_OPAQUE_SIZE],
        }
    }
}

impl Codec for SpdmOpaqueStruct {
    fn encode(&self, bytes: &mut Writer) {
        self.data_size.encode(bytes);
        bytes.push(&self.data[..self.data_size as usize]);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let data_size = u16::read(r)?;
        if data_size as usize > MAX_SPDM_OPAQUE_SIZE {
            return None;
        }
        let mut data = [0u8; MAX_SPDM_OPAQUE_SIZE];
        data[..data_size as usize].copy_from_slice(r.take(data_size as usize)?);
        Some(SpdmOpaqueStruct { data_size, data })
    }
}

impl SpdmOpaqueStruct {
    /// Builds the DMTF-format table body (spec-id, version, element count,
    /// then each element) from a list of elements.
    pub fn from_elements(elements: &[SpdmOpaqueElement]) -> Option<Self> {
        if elements.len() > MAX_OPAQUE_ELEMENTS {
            return None;
        }
        let mut buf = [0u8; MAX_SPDM_OPAQUE_SIZE];
        let mut writer = Writer::init(&mut buf);
        SPDM_OPAQUE_DATA_SPEC_ID.encode(&mut writer);
        SPDM_OPAQUE_VERSION.encode(&mut writer);
        0u8.encode(&mut writer); // reserved
        (elements.len() as u16).encode(&mut writer);
        for e in elements {
            e.encode(&mut writer);
        }
        let used = writer.used();
        Some(SpdmOpaqueStruct {
            data_size: used as u16,
            data: buf,
        })
    }

    /// Parses the DMTF-format table body into its elements.
    pub fn elements(&self) -> Option<([SpdmOpaqueElement; MAX_OPAQUE_ELEMENTS], usize)> {
        if self.data_size == 0 {
            return Some(([SpdmOpaqueElement::default(); MAX_OPAQUE_ELEMENTS], 0));
        }
        let mut r = Reader::init(&self.data[..self.data_size as usize]);
        let spec_id = u32::read(&mut r)?;
        if spec_id != SPDM_OPAQUE_DATA_SPEC_ID {
            return None;
        }
        let version = u8::read(&mut r)?;
        if version != SPDM_OPAQUE_VERSION {
            return None;
        }
        let _reserved = u8::read(&mut r)?;
        let total_elements = u16::read(&mut r)? as usize;
        if total_elements > MAX_OPAQUE_ELEMENTS {
            return None;
        }
        let mut out = [SpdmOpaqueElement::default(); MAX_OPAQUE_ELEMENTS];
        for slot in out.iter_mut().take(total_elements) {
            *slot = SpdmOpaqueElement::read(&mut r)?;
        }
        Some((out, total_elements))
    }
}
