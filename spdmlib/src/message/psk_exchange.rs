// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Codec, Reader, Writer};

use crate::common::algo::SpdmDigestStruct;
use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;
use crate::config::{MAX_SPDM_PSK_CONTEXT_SIZE, MAX_SPDM_PSK_HINT_SIZE};
use crate::message::challenge::SpdmMeasurementSummaryHashType;

#[derive(Debug, Clone, Default)]
pub struct SpdmPskExchangeRequestPayload {
    pub measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    pub req_session_id: u16,
    pub psk_hint: Vec<u8>,
    pub context: Vec<u8>,
    pub opaque: SpdmOpaqueStruct,
}

impl SpdmCodec for SpdmPskExchangeRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.measurement_summary_hash_type.encode(bytes); // param1
        0u8.encode(bytes); // param2
        self.req_session_id.encode(bytes);
        (self.psk_hint.len() as u16).encode(bytes);
        (self.context.len() as u16).encode(bytes);
        bytes.push(&self.psk_hint);
        bytes.push(&self.context);
        self.opaque.encode(bytes);
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let measurement_summary_hash_type = SpdmMeasurementSummaryHashType::read(r)?;
        u8::read(r)?;
        let req_session_id = u16::read(r)?;
        let psk_hint_len = u16::read(r)? as usize;
        let context_len = u16::read(r)? as usize;
        if context_len > MAX_SPDM_PSK_CONTEXT_SIZE || psk_hint_len > MAX_SPDM_PSK_HINT_SIZE {
            return None;
        }
        let psk_hint = r.take(psk_hint_len)?.to_vec();
        let context = r.take(context_len)?.to_vec();
        let opaque = SpdmOpaqueStruct::read(r)?;
        Some(SpdmPskExchangeRequestPayload {
            measurement_summary_hash_type,
            req_session_id,
            psk_hint,
            context,
            opaque,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SpdmPskExchangeResponsePayload {
    pub heartbeat_period: u8,
    pub rsp_session_id: u16,
    pub measurement_summary_hash: SpdmDigestStruct,
    pub context: [u8; MAX_SPDM_PSK_CONTEXT_SIZE],
    pub opaque: SpdmOpaqueStruct,
    pub verify_data: SpdmDigestStruct,
}

impl Default for SpdmPskExchangeResponsePayload {
    fn default() -> Self {
        SpdmPskExchangeResponsePayload {
            heartbeat_period: 0,
            rsp_session_id: 0,
            measurement_summary_hash: SpdmDigestStruct::default(),
            context: [0u8; MAX_SPDM_PSK_CONTEXT_SIZE],
            opaque: SpdmOpaqueStruct::default(),
            verify_data: SpdmDigestStruct::default(),
        }
    }
}

impl SpdmCodec for SpdmPskExchangeResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.heartbeat_period.encode(bytes); // param1
        0u8.encode(bytes); // param2
        self.rsp_session_id.encode(bytes);
        0u16.encode(bytes); // reserved
        if !context.negotiate_info.measurement_hash_sel.is_empty() {
            self.measurement_summary_hash.spdm_encode(context, bytes);
        }
        bytes.push(&self.context);
        self.opaque.encode(bytes);
        self.verify_data.spdm_encode(context, bytes);
    }
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let heartbeat_period = u8::read(r)?;
        u8::read(r)?;
        let rsp_session_id = u16::read(r)?;
        u16::read(r)?;
        let measurement_summary_hash = if !context.negotiate_info.measurement_hash_sel.is_empty() {
            SpdmDigestStruct::spdm_read(context, r)?
        } else {
            SpdmDigestStruct::default()
        };
        let psk_context = <[u8; MAX_SPDM_PSK_CONTEXT_SIZE]>::read(r)?;
        let opaque = SpdmOpaqueStruct::read(r)?;
        let verify_data = SpdmDigestStruct::spdm_read(context, r)?;
        Some(SpdmPskExchangeResponsePayload {
            heartbeat_period,
            rsp_session_id,
            measurement_summary_hash,
            context: psk_context,
            opaque,
            verify_data,
        })
    }
}
