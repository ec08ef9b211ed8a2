// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::measurement::{SPDM_MEASUREMENT_REQUEST_ALL, SPDM_MEASUREMENT_REQUEST_TOTAL_NUMBER};
use crate::message::*;
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    /// GET_MEASUREMENTS / MEASUREMENTS (spec §4.11). `request_signature`
    /// asks the peer to sign the returned record over L1L2; the nonce it
    /// must sign over is generated here.
    pub fn send_receive_spdm_measurement(
        &mut self,
        slot_id: u8,
        measurement_operation: u8,
        request_signature: bool,
    ) -> SpdmResult<SpdmMeasurementsResponsePayload> {
        if self.common.runtime_info.connection_state < SpdmConnectionState::AfterCertificate {
            return spdm_result_err!(UnexpectedRequest);
        }

        let nonce = if request_signature && measurement_operation != SPDM_MEASUREMENT_REQUEST_TOTAL_NUMBER {
            let mut nonce = [0u8; 32];
            self.common.crypto.random_bytes(&mut nonce)?;
            Some(nonce)
        } else {
            None
        };

        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmGetMeasurementsRequest(SpdmGetMeasurementsRequestPayload {
                measurement_attributes_signature_requested: request_signature,
                measurement_operation,
                nonce,
                slot_id,
            }),
            SpdmRequestResponseCode::SpdmRequestGetMeasurements,
        );
        self.common.transcript.append(TranscriptScope::L1L2, &request_bytes)?;

        self.send_message(&request_bytes, false)?;
        let mut receive_buffer = [0u8; crate::config::MAX_SPDM_TRANSPORT_SIZE];
        let used = self.receive_message(&mut receive_buffer)?;
        let raw_response = receive_buffer[..used].to_vec();

        let base_asym_sel = self.common.negotiate_info.base_asym_sel;
        let base_hash_sel = self.common.negotiate_info.base_hash_sel;
        let signed = request_signature && measurement_operation != SPDM_MEASUREMENT_REQUEST_TOTAL_NUMBER;
        let sig_size = if signed { base_asym_sel.get_size() as usize } else { 0 };
        if raw_response.len() < sig_size {
            return spdm_result_err!(InvalidRequest);
        }
        let unsigned_len = raw_response.len() - sig_size;

        let mut reader = codec::Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        let measurements = match response.payload {
            SpdmMessagePayload::SpdmErrorResponse(ref error) => {
                return Err(crate::requester::error_handling::map_error_response(error));
            }
            SpdmMessagePayload::SpdmMeasurementsResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };

        self.common.transcript.append(TranscriptScope::L1L2, &raw_response[..unsigned_len])?;

        if signed {
            let l1l2_hash = self.common.transcript.snapshot(TranscriptScope::L1L2, self.common.crypto, base_hash_sel)?;
            let peer_chain = self
                .common
                .peer_info
                .peer_cert_chain
                .as_ref()
                .ok_or_else(|| crate::spdm_err!(UnexpectedRequest))?;
            self.common
                .crypto
                .asym_verify(base_asym_sel, base_hash_sel, peer_chain, l1l2_hash.as_ref(), measurements.signature.as_ref())
                .map_err(|_| crate::spdm_err!(SecurityViolation))?;
            self.common.transcript.append(TranscriptScope::L1L2, &raw_response[unsigned_len..])?;
        }

        self.common.runtime_info.connection_state = SpdmConnectionState::AfterMeasurements;
        Ok(measurements)
    }
}
