// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{enum_builder, Codec, Reader, Writer};

use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

enum_builder! {
    @U8
    EnumName: SpdmErrorCode;
    EnumVal{
        SpdmErrorInvalidRequest => 0x01,
        SpdmErrorBusy => 0x03,
        SpdmErrorUnexpectedRequest => 0x04,
        SpdmErrorUnspecified => 0x05,
        SpdmErrorDecryptError => 0x06,
        SpdmErrorUnsupportedRequest => 0x07,
        SpdmErrorRequestResynch => 0x08,
        SpdmErrorVersionMismatch => 0x41,
        SpdmErrorResponseNotReady => 0x42,
        SpdmErrorRequestInFlight => 0x43,
        SpdmErrorInvalidSessionId => 0x44,
        SpdmErrorSessionLimitExceeded => 0x45
    }
}

/// Extended error data attached to a `SpdmErrorResponseNotReady` (spec §7).
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmErrorResponseNotReadyExtData {
    pub request_code: u8,
    pub rdt_exponent: u8,
    pub rdt: u16,
    pub token: u8,
}

impl Codec for SpdmErrorResponseNotReadyExtData {
    fn encode(&self, bytes: &mut Writer) {
        self.request_code.encode(bytes);
        self.rdt_exponent.encode(bytes);
        self.rdt.encode(bytes);
        self.token.encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let request_code = u8::read(r)?;
        let rdt_exponent = u8::read(r)?;
        let rdt = u16::read(r)?;
        let token = u8::read(r)?;
        Some(SpdmErrorResponseNotReadyExtData {
            request_code,
            rdt_exponent,
            rdt,
            token,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpdmErrorResponsePayload {
    pub error_code: SpdmErrorCode,
    pub error_data: u8,
    pub extended_data: Option<SpdmErrorResponseNotReadyExtData>,
}

impl SpdmCodec for SpdmErrorResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.error_code.encode(bytes); // param1
        self.error_data.encode(bytes); // param2
        if let Some(extended_data) = &self.extended_data {
            extended_data.encode(bytes);
        }
    }
    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let error_code = SpdmErrorCode::read(r)?;
        let error_data = u8::read(r)?;
        let extended_data = if error_code == SpdmErrorCode::SpdmErrorResponseNotReady && r.left() > 0 {
            Some(SpdmErrorResponseNotReadyExtData::read(r)?)
        } else {
            None
        };
        Some(SpdmErrorResponsePayload {
            error_code,
            error_data,
            extended_data,
        })
    }
}
