// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::algo::{SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

#[derive(Debug, Clone, Default)]
pub struct SpdmGetCapabilitiesRequestPayload {
    pub ct_exponent: u8,
    pub flags: SpdmRequestCapabilityFlags,
}

impl SpdmCodec for SpdmGetCapabilitiesRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        0u8.encode(bytes); // param2
        0u8.encode(bytes); // reserved
        self.ct_exponent.encode(bytes);
        0u16.encode(bytes); // reserved
        self.flags.encode(bytes);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        u8::read(r)?;
        u8::read(r)?;
        let ct_exponent = u8::read(r)?;
        u16::read(r)?;
        let flags = SpdmRequestCapabilityFlags::read(r)?;
        Some(SpdmGetCapabilitiesRequestPayload { ct_exponent, flags })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmCapabilitiesResponsePayload {
    pub ct_exponent: u8,
    pub flags: SpdmResponseCapabilityFlags,
}

impl SpdmCodec for SpdmCapabilitiesResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        0u8.encode(bytes); // param2
        0u8.encode(bytes); // reserved
        self.ct_exponent.encode(bytes);
        0u16.encode(bytes); // reserved
        self.flags.encode(bytes);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        u8::read(r)?;
        u8::read(r)?;
        let ct_exponent = u8::read(r)?;
        u16::read(r)?;
        let flags = SpdmResponseCapabilityFlags::read(r)?;
        Some(SpdmCapabilitiesResponsePayload { ct_exponent, flags })
    }
}
