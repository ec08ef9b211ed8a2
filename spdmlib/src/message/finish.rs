// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::algo::{SpdmDigestStruct, SpdmSignatureStruct};
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

bitflags! {
    #[derive(Default)]
    pub struct SpdmFinishRequestAttributes: u8 {
        const SIGNATURE_INCLUDED = 0b0000_0001;
    }
}

impl Codec for SpdmFinishRequestAttributes {
    fn encode(&self, bytes: &mut Writer) {
        self.bits().encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let bits = u8::read(r)?;
        Some(SpdmFinishRequestAttributes::from_bits_truncate(bits))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmFinishRequestPayload {
    pub finish_request_attributes: SpdmFinishRequestAttributes,
    pub req_slot_id: u8,
    pub signature: SpdmSignatureStruct,
    pub verify_data: SpdmDigestStruct,
}

impl SpdmCodec for SpdmFinishRequestPayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.finish_request_attributes.encode(bytes); // param1
        self.req_slot_id.encode(bytes); // param2
        if self
            .finish_request_attributes
            .contains(SpdmFinishRequestAttributes::SIGNATURE_INCLUDED)
        {
            self.signature.spdm_encode(context, bytes);
        }
        self.verify_data.spdm_encode(context, bytes);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let finish_request_attributes = SpdmFinishRequestAttributes::read(r)?;
        let req_slot_id = u8::read(r)?;
        let signature = if finish_request_attributes.contains(SpdmFinishRequestAttributes::SIGNATURE_INCLUDED) {
            SpdmSignatureStruct::spdm_read(context, r)?
        } else {
            SpdmSignatureStruct::default()
        };
        let verify_data = SpdmDigestStruct::spdm_read(context, r)?;
        Some(SpdmFinishRequestPayload {
            finish_request_attributes,
            req_slot_id,
            signature,
            verify_data,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmFinishResponsePayload {
    pub verify_data: Option<SpdmDigestStruct>,
}

impl SpdmCodec for SpdmFinishResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        0u8.encode(bytes); // param2
        if let Some(verify_data) = &self.verify_data {
            verify_data.spdm_encode(context, bytes);
        }
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        u8::read(r)?;
        u8::read(r)?;
        let verify_data = if r.left() > 0 {
            Some(SpdmDigestStruct::spdm_read(context, r)?)
        } else {
            None
        };
        Some(SpdmFinishResponsePayload { verify_data })
    }
}
