// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The SPDM message codec (spec §4.3): the fixed 4-byte header every PDU
//! opens with, the request/response code registry, and the tagged
//! `SpdmMessage` envelope over every payload type. One file per message
//! family, the way the teacher lays out `requester`/`responder` handlers.

pub mod algorithm;
pub mod capability;
pub mod certificate;
pub mod challenge;
pub mod digest;
pub mod end_session;
pub mod error;
pub mod finish;
pub mod heartbeat;
pub mod key_exchange;
pub mod key_update;
pub mod measurement;
pub mod psk_exchange;
pub mod psk_finish;
pub mod version;

use codec::{enum_builder, Codec, Reader, Writer};

use crate::common::algo::SpdmVersion;
use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;

pub use algorithm::*;
pub use capability::*;
pub use certificate::*;
pub use challenge::*;
pub use digest::*;
pub use end_session::*;
pub use error::*;
pub use finish::*;
pub use heartbeat::*;
pub use key_exchange::*;
pub use key_update::*;
pub use measurement::*;
pub use psk_exchange::*;
pub use psk_finish::*;
pub use version::*;

enum_builder! {
    @U8
    EnumName: SpdmRequestResponseCode;
    EnumVal{
        SpdmRequestGetDigests => 0x81,
        SpdmRequestGetCertificate => 0x82,
        SpdmRequestChallenge => 0x83,
        SpdmRequestGetVersion => 0x84,
        SpdmRequestGetMeasurements => 0xE0,
        SpdmRequestGetCapabilities => 0xE1,
        SpdmRequestNegotiateAlgorithms => 0xE3,
        SpdmRequestKeyExchange => 0xE4,
        SpdmRequestFinish => 0xE5,
        SpdmRequestPskExchange => 0xE6,
        SpdmRequestPskFinish => 0xE7,
        SpdmRequestHeartbeat => 0xE8,
        SpdmRequestKeyUpdate => 0xE9,
        SpdmRequestEndSession => 0xEC,
        SpdmRequestRespondIfReady => 0xFF,

        SpdmResponseDigests => 0x01,
        SpdmResponseCertificate => 0x02,
        SpdmResponseChallengeAuth => 0x03,
        SpdmResponseVersion => 0x04,
        SpdmResponseMeasurements => 0x60,
        SpdmResponseCapabilities => 0x61,
        SpdmResponseAlgorithms => 0x63,
        SpdmResponseKeyExchangeRsp => 0x64,
        SpdmResponseFinishRsp => 0x65,
        SpdmResponsePskExchangeRsp => 0x66,
        SpdmResponsePskFinishRsp => 0x67,
        SpdmResponseHeartbeatAck => 0x68,
        SpdmResponseKeyUpdateAck => 0x69,
        SpdmResponseEndSessionAck => 0x6C,
        SpdmResponseError => 0x7F
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmMessageHeader {
    pub version: SpdmVersion,
    pub request_response_code: SpdmRequestResponseCode,
}

impl Codec for SpdmMessageHeader {
    fn encode(&self, bytes: &mut Writer) {
        self.version.encode(bytes);
        self.request_response_code.encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        let version = SpdmVersion::read(r)?;
        let request_response_code = SpdmRequestResponseCode::read(r)?;
        Some(SpdmMessageHeader {
            version,
            request_response_code,
        })
    }
}

#[derive(Debug, Clone)]
pub enum SpdmMessagePayload {
    SpdmGetVersionRequest(SpdmGetVersionRequestPayload),
    SpdmVersionResponse(SpdmVersionResponsePayload),
    SpdmGetCapabilitiesRequest(SpdmGetCapabilitiesRequestPayload),
    SpdmCapabilitiesResponse(SpdmCapabilitiesResponsePayload),
    SpdmNegotiateAlgorithmsRequest(SpdmNegotiateAlgorithmsRequestPayload),
    SpdmAlgorithmsResponse(SpdmAlgorithmsResponsePayload),
    SpdmGetDigestsRequest,
    SpdmDigestsResponse(SpdmDigestsResponsePayload),
    SpdmGetCertificateRequest(SpdmGetCertificateRequestPayload),
    SpdmCertificateResponse(SpdmCertificateResponsePayload),
    SpdmChallengeRequest(SpdmChallengeRequestPayload),
    SpdmChallengeAuthResponse(SpdmChallengeAuthResponsePayload),
    SpdmGetMeasurementsRequest(SpdmGetMeasurementsRequestPayload),
    SpdmMeasurementsResponse(SpdmMeasurementsResponsePayload),
    SpdmKeyExchangeRequest(SpdmKeyExchangeRequestPayload),
    SpdmKeyExchangeResponse(SpdmKeyExchangeResponsePayload),
    SpdmFinishRequest(SpdmFinishRequestPayload),
    SpdmFinishResponse(SpdmFinishResponsePayload),
    SpdmPskExchangeRequest(SpdmPskExchangeRequestPayload),
    SpdmPskExchangeResponse(SpdmPskExchangeResponsePayload),
    SpdmPskFinishRequest(SpdmPskFinishRequestPayload),
    SpdmPskFinishResponse(SpdmPskFinishResponsePayload),
    SpdmHeartbeatRequest,
    SpdmHeartbeatResponse,
    SpdmKeyUpdateRequest(SpdmKeyUpdateRequestPayload),
    SpdmKeyUpdateResponse(SpdmKeyUpdateResponsePayload),
    SpdmEndSessionRequest(SpdmEndSessionRequestPayload),
    SpdmEndSessionResponse,
    SpdmErrorResponse(SpdmErrorResponsePayload),
}

#[derive(Debug, Clone)]
pub struct SpdmMessage {
    pub header: SpdmMessageHeader,
    pub payload: SpdmMessagePayload,
}

impl SpdmCodec for SpdmMessage {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.header.encode(bytes);
        match &self.payload {
            SpdmMessagePayload::SpdmGetVersionRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmVersionResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmGetCapabilitiesRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmCapabilitiesResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmNegotiateAlgorithmsRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmAlgorithmsResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmGetDigestsRequest => {}
            SpdmMessagePayload::SpdmDigestsResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmGetCertificateRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmCertificateResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmChallengeRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmChallengeAuthResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmGetMeasurementsRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmMeasurementsResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmKeyExchangeRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmKeyExchangeResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmFinishRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmFinishResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmPskExchangeRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmPskExchangeResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmPskFinishRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmPskFinishResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmHeartbeatRequest => {
                0u8.encode(bytes);
                0u8.encode(bytes);
            }
            SpdmMessagePayload::SpdmHeartbeatResponse => {
                0u8.encode(bytes);
                0u8.encode(bytes);
            }
            SpdmMessagePayload::SpdmKeyUpdateRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmKeyUpdateResponse(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmEndSessionRequest(p) => p.spdm_encode(context, bytes),
            SpdmMessagePayload::SpdmEndSessionResponse => {
                0u8.encode(bytes);
                0u8.encode(bytes);
            }
            SpdmMessagePayload::SpdmErrorResponse(p) => p.spdm_encode(context, bytes),
        }
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self> {
        let header = SpdmMessageHeader::read(r)?;
        let payload = match header.request_response_code {
            SpdmRequestResponseCode::SpdmRequestGetVersion => {
                SpdmMessagePayload::SpdmGetVersionRequest(SpdmGetVersionRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponseVersion => {
                SpdmMessagePayload::SpdmVersionResponse(SpdmVersionResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestGetCapabilities => SpdmMessagePayload::SpdmGetCapabilitiesRequest(
                SpdmGetCapabilitiesRequestPayload::spdm_read(context, r)?,
            ),
            SpdmRequestResponseCode::SpdmResponseCapabilities => {
                SpdmMessagePayload::SpdmCapabilitiesResponse(SpdmCapabilitiesResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestNegotiateAlgorithms => {
                SpdmMessagePayload::SpdmNegotiateAlgorithmsRequest(SpdmNegotiateAlgorithmsRequestPayload::spdm_read(
                    context, r,
                )?)
            }
            SpdmRequestResponseCode::SpdmResponseAlgorithms => {
                SpdmMessagePayload::SpdmAlgorithmsResponse(SpdmAlgorithmsResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestGetDigests => {
                u8::read(r)?;
                u8::read(r)?;
                SpdmMessagePayload::SpdmGetDigestsRequest
            }
            SpdmRequestResponseCode::SpdmResponseDigests => {
                SpdmMessagePayload::SpdmDigestsResponse(SpdmDigestsResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestGetCertificate => {
                SpdmMessagePayload::SpdmGetCertificateRequest(SpdmGetCertificateRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponseCertificate => {
                SpdmMessagePayload::SpdmCertificateResponse(SpdmCertificateResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestChallenge => {
                SpdmMessagePayload::SpdmChallengeRequest(SpdmChallengeRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponseChallengeAuth => {
                SpdmMessagePayload::SpdmChallengeAuthResponse(SpdmChallengeAuthResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestGetMeasurements => {
                SpdmMessagePayload::SpdmGetMeasurementsRequest(SpdmGetMeasurementsRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponseMeasurements => {
                SpdmMessagePayload::SpdmMeasurementsResponse(SpdmMeasurementsResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestKeyExchange => {
                SpdmMessagePayload::SpdmKeyExchangeRequest(SpdmKeyExchangeRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponseKeyExchangeRsp => {
                SpdmMessagePayload::SpdmKeyExchangeResponse(SpdmKeyExchangeResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestFinish => {
                SpdmMessagePayload::SpdmFinishRequest(SpdmFinishRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponseFinishRsp => {
                SpdmMessagePayload::SpdmFinishResponse(SpdmFinishResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestPskExchange => {
                SpdmMessagePayload::SpdmPskExchangeRequest(SpdmPskExchangeRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponsePskExchangeRsp => {
                SpdmMessagePayload::SpdmPskExchangeResponse(SpdmPskExchangeResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestPskFinish => {
                SpdmMessagePayload::SpdmPskFinishRequest(SpdmPskFinishRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponsePskFinishRsp => {
                SpdmMessagePayload::SpdmPskFinishResponse(SpdmPskFinishResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestHeartbeat => {
                u8::read(r)?;
                u8::read(r)?;
                SpdmMessagePayload::SpdmHeartbeatRequest
            }
            SpdmRequestResponseCode::SpdmResponseHeartbeatAck => {
                u8::read(r)?;
                u8::read(r)?;
                SpdmMessagePayload::SpdmHeartbeatResponse
            }
            SpdmRequestResponseCode::SpdmRequestKeyUpdate => {
                SpdmMessagePayload::SpdmKeyUpdateRequest(SpdmKeyUpdateRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponseKeyUpdateAck => {
                SpdmMessagePayload::SpdmKeyUpdateResponse(SpdmKeyUpdateResponsePayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmRequestEndSession => {
                SpdmMessagePayload::SpdmEndSessionRequest(SpdmEndSessionRequestPayload::spdm_read(context, r)?)
            }
            SpdmRequestResponseCode::SpdmResponseEndSessionAck => {
                u8::read(r)?;
                u8::read(r)?;
                SpdmMessagePayload::SpdmEndSessionResponse
            }
            SpdmRequestResponseCode::SpdmResponseError => {
                SpdmMessagePayload::SpdmErrorResponse(SpdmErrorResponsePayload::spdm_read(context, r)?)
            }
            _ => return None,
        };
        Some(SpdmMessage { header, payload })
    }
}
