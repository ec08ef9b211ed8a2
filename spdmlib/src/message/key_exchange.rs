// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::algo::{SpdmDheExchangeStruct, SpdmDigestStruct, SpdmSignatureStruct};
use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;
use crate::message::challenge::SpdmMeasurementSummaryHashType;

#[derive(Debug, Clone, Default)]
pub struct SpdmKeyExchangeRequestPayload {
    pub measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    pub slot_id: u8,
    pub req_session_id: u16,
    pub random: [u8; 32],
    pub exchange: SpdmDheExchangeStruct,
    pub opaque: SpdmOpaqueStruct,
}

impl SpdmCodec for SpdmKeyExchangeRequestPayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.measurement_summary_hash_type.encode(bytes); // param1
        self.slot_id.encode(bytes); // param2
        self.req_session_id.encode(bytes);
        0u16.encode(bytes); // reserved
        bytes.push(&self.random);
        self.exchange.spdm_encode(context, bytes);
        self.opaque.encode(bytes);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let measurement_summary_hash_type = SpdmMeasurementSummaryHashType::read(r)?;
        let slot_id = u8::read(r)?;
        let req_session_id = u16::read(r)?;
        u16::read(r)?;
        let random = <[u8; 32]>::read(r)?;
        let exchange = SpdmDheExchangeStruct::spdm_read(context, r)?;
        let opaque = SpdmOpaqueStruct::read(r)?;
        Some(SpdmKeyExchangeRequestPayload {
            measurement_summary_hash_type,
            slot_id,
            req_session_id,
            random,
            exchange,
            opaque,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmKeyExchangeResponsePayload {
    pub heartbeat_period: u8,
    pub rsp_session_id: u16,
    pub mut_auth_requested: bool,
    pub req_slot_id: u8,
    pub random: [u8; 32],
    pub exchange: SpdmDheExchangeStruct,
    pub measurement_summary_hash: SpdmDigestStruct,
    pub opaque: SpdmOpaqueStruct,
    pub signature: SpdmSignatureStruct,
    pub verify_data: SpdmDigestStruct,
}

impl SpdmCodec for SpdmKeyExchangeResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.heartbeat_period.encode(bytes); // param1
        self.req_slot_id.encode(bytes); // param2
        self.rsp_session_id.encode(bytes);
        let mut_auth = if self.mut_auth_requested { 0x01u8 } else { 0u8 };
        mut_auth.encode(bytes);
        bytes.push(&self.random);
        self.exchange.spdm_encode(context, bytes);
        if !context.negotiate_info.measurement_hash_sel.is_empty() {
            self.measurement_summary_hash.spdm_encode(context, bytes);
        }
        self.opaque.encode(bytes);
        self.signature.spdm_encode(context, bytes);
        self.verify_data.spdm_encode(context, bytes);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let heartbeat_period = u8::read(r)?;
        let req_slot_id = u8::read(r)?;
        let rsp_session_id = u16::read(r)?;
        let mut_auth_requested = u8::read(r)? & 0x01 != 0;
        let random = <[u8; 32]>::read(r)?;
        let exchange = SpdmDheExchangeStruct::spdm_read(context, r)?;
        let measurement_summary_hash = if !context.negotiate_info.measurement_hash_sel.is_empty() {
            SpdmDigestStruct::spdm_read(context, r)?
        } else {
            SpdmDigestStruct::default()
        };
        let opaque = SpdmOpaqueStruct::read(r)?;
        let signature = SpdmSignatureStruct::spdm_read(context, r)?;
        let verify_data = SpdmDigestStruct::spdm_read(context, r)?;
        Some(SpdmKeyExchangeResponsePayload {
            heartbeat_period,
            rsp_session_id,
            mut_auth_requested,
            req_slot_id,
            random,
            exchange,
            measurement_summary_hash,
            opaque,
            signature,
            verify_data,
        })
    }
}
