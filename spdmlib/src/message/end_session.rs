// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

bitflags! {
    #[derive(Default)]
    pub struct SpdmEndSessionRequestAttributes: u8 {
        const PRESERVE_NEGOTIATED_STATE = 0b0000_0001;
    }
}

impl Codec for SpdmEndSessionRequestAttributes {
    fn encode(&self, bytes: &mut Writer) {
        self.bits().encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let bits = u8::read(r)?;
        Some(SpdmEndSessionRequestAttributes::from_bits_truncate(bits))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmEndSessionRequestPayload {
    pub end_session_request_attributes: SpdmEndSessionRequestAttributes,
}

impl SpdmCodec for SpdmEndSessionRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.end_session_request_attributes.encode(bytes); // param1
        0u8.encode(bytes); // param2
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let end_session_request_attributes = SpdmEndSessionRequestAttributes::read(r)?;
        u8::read(r)?;
        Some(SpdmEndSessionRequestPayload {
            end_session_request_attributes,
        })
    }
}
