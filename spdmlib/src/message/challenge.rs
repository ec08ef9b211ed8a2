// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{enum_builder, Codec, Reader, Writer};

use crate::common::algo::{SpdmDigestStruct, SpdmNonceStruct, SpdmSignatureStruct};
use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

enum_builder! {
    @U8
    EnumName: SpdmMeasurementSummaryHashType;
    EnumVal{
        SpdmMeasurementSummaryHashTypeNone => 0x0,
        SpdmMeasurementSummaryHashTypeTcb => 0x1,
        SpdmMeasurementSummaryHashTypeAll => 0xFF
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmChallengeRequestPayload {
    pub slot_id: u8,
    pub measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    pub nonce: SpdmNonceStruct,
}

impl SpdmCodec for SpdmChallengeRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.slot_id.encode(bytes); // param1
        self.measurement_summary_hash_type.encode(bytes); // param2
        self.nonce.encode(bytes);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let slot_id = u8::read(r)?;
        let measurement_summary_hash_type = SpdmMeasurementSummaryHashType::read(r)?;
        let nonce = SpdmNonceStruct::read(r)?;
        Some(SpdmChallengeRequestPayload {
            slot_id,
            measurement_summary_hash_type,
            nonce,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmChallengeAuthResponsePayload {
    pub slot_id: u8,
    pub cert_chain_hash: SpdmDigestStruct,
    pub nonce: SpdmNonceStruct,
    pub measurement_summary_hash: SpdmDigestStruct,
    pub opaque: SpdmOpaqueStruct,
    pub signature: SpdmSignatureStruct,
}

impl SpdmCodec for SpdmChallengeAuthResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.slot_id.encode(bytes); // param1
        0u8.encode(bytes); // param2
        self.cert_chain_hash.spdm_encode(context, bytes);
        self.nonce.encode(bytes);
        self.measurement_summary_hash.spdm_encode(context, bytes);
        self.opaque.encode(bytes);
        self.signature.spdm_encode(context, bytes);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let slot_id = u8::read(r)?;
        u8::read(r)?;
        let cert_chain_hash = SpdmDigestStruct::spdm_read(context, r)?;
        let nonce = SpdmNonceStruct::read(r)?;
        let measurement_summary_hash = SpdmDigestStruct::spdm_read(context, r)?;
        let opaque = SpdmOpaqueStruct::read(r)?;
        let signature = SpdmSignatureStruct::spdm_read(context, r)?;
        Some(SpdmChallengeAuthResponsePayload {
            slot_id,
            cert_chain_hash,
            nonce,
            measurement_summary_hash,
            opaque,
            signature,
        })
    }
}
