// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::spdm_codec::SpdmCodec;
use crate::common::algo::SpdmVersion;
use crate::common::SpdmContext;

#[derive(Debug, Clone, Default)]
pub struct SpdmGetVersionRequestPayload {}

impl SpdmCodec for SpdmGetVersionRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes);
        0u8.encode(bytes);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        u8::read(r)?;
        Some(SpdmGetVersionRequestPayload {})
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmVersionResponsePayload {
    pub version_number_entries: Vec<SpdmVersion>,
}

impl SpdmCodec for SpdmVersionResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        0u8.encode(bytes); // param2
        0u8.encode(bytes); // reserved
        (self.version_number_entries.len() as u8).encode(bytes);
        for v in &self.version_number_entries {
            v.get_u8().encode(bytes);
            0u8.encode(bytes); // VersionNumberEntry is a 16-bit field; low byte unused here
        }
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?; // param1
        u8::read(r)?; // param2
        u8::read(r)?; // reserved
        let count = u8::read(r)?;
        let mut version_number_entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let major_minor = u8::read(r)?;
            u8::read(r)?;
            version_number_entries.push(SpdmVersion::read(&mut Reader::init(&[major_minor]))?);
        }
        Some(SpdmVersionResponsePayload { version_number_entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::create_test_context;

    #[test]
    fn test_case0_version_round_trip() {
        let mut context = create_test_context();
        let mut buf = [0u8; 64];
        let mut writer = Writer::init(&mut buf);
        let value = SpdmVersionResponsePayload {
            version_number_entries: vec![SpdmVersion::SpdmVersion10, SpdmVersion::SpdmVersion11],
        };
        value.spdm_encode(&mut context, &mut writer);
        let used = writer.used();
        let mut reader = Reader::init(&buf[..used]);
        let decoded = SpdmVersionResponsePayload::spdm_read(&mut context, &mut reader).unwrap();
        assert_eq!(decoded.version_number_entries, value.version_number_entries);
    }
}
