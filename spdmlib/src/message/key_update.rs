// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{enum_builder, Codec, Reader, Writer};

use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

enum_builder! {
    @U8
    EnumName: SpdmKeyUpdateOperation;
    EnumVal{
        SpdmUpdateSingleKey => 0x1,
        SpdmUpdateAllKeys => 0x2,
        SpdmVerifyNewKey => 0x3
    }
}

impl SpdmKeyUpdateOperation {
    /// Whether this operation rolls both the request- and response-direction
    /// secrets (`true`, `SpdmUpdateAllKeys`), or only the request-direction
    /// secret (`false`, `SpdmUpdateSingleKey`).
    pub fn updates_all_directions(&self) -> bool {
        matches!(self, SpdmKeyUpdateOperation::SpdmUpdateAllKeys)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmKeyUpdateRequestPayload {
    pub key_update_operation: SpdmKeyUpdateOperation,
    pub tag: u8,
}

impl SpdmCodec for SpdmKeyUpdateRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.key_update_operation.encode(bytes); // param1
        self.tag.encode(bytes); // param2
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let key_update_operation = SpdmKeyUpdateOperation::read(r)?;
        let tag = u8::read(r)?;
        Some(SpdmKeyUpdateRequestPayload {
            key_update_operation,
            tag,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmKeyUpdateResponsePayload {
    pub key_update_operation: SpdmKeyUpdateOperation,
    pub tag: u8,
}

impl SpdmCodec for SpdmKeyUpdateResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.key_update_operation.encode(bytes); // param1
        self.tag.encode(bytes); // param2
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let key_update_operation = SpdmKeyUpdateOperation::read(r)?;
        let tag = u8::read(r)?;
        Some(SpdmKeyUpdateResponsePayload {
            key_update_operation,
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case0_update_all_flag_matches_operation() {
        assert!(!SpdmKeyUpdateOperation::SpdmUpdateSingleKey.updates_all_directions());
        assert!(SpdmKeyUpdateOperation::SpdmUpdateAllKeys.updates_all_directions());
        assert!(!SpdmKeyUpdateOperation::SpdmVerifyNewKey.updates_all_directions());
    }
}
