// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::algo::SpdmDigestStruct;
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

#[derive(Debug, Clone, Default)]
pub struct SpdmPskFinishRequestPayload {
    pub verify_data: SpdmDigestStruct,
}

impl SpdmCodec for SpdmPskFinishRequestPayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        0u8.encode(bytes); // param2
        self.verify_data.spdm_encode(context, bytes);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        u8::read(r)?;
        let verify_data = SpdmDigestStruct::spdm_read(context, r)?;
        Some(SpdmPskFinishRequestPayload { verify_data })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmPskFinishResponsePayload {}

impl SpdmCodec for SpdmPskFinishResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        0u8.encode(bytes); // param2
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        u8::read(r)?;
        Some(SpdmPskFinishResponsePayload {})
    }
}
