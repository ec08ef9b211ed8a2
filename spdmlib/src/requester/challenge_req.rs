// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::algo::SpdmNonceStruct;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    /// CHALLENGE / CHALLENGE_AUTH (spec §4.10): proves the peer holds the
    /// private key for the certificate chain it advertised in GET_DIGESTS.
    pub fn send_receive_spdm_challenge(
        &mut self,
        slot_id: u8,
        measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    ) -> SpdmResult<()> {
        if self.common.runtime_info.connection_state < SpdmConnectionState::AfterCertificate {
            return spdm_result_err!(UnexpectedRequest);
        }

        let mut nonce = [0u8; crate::config::SPDM_NONCE_SIZE];
        self.common.crypto.random_bytes(&mut nonce)?;

        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmChallengeRequest(SpdmChallengeRequestPayload {
                slot_id,
                measurement_summary_hash_type,
                nonce: SpdmNonceStruct { data: nonce },
            }),
            SpdmRequestResponseCode::SpdmRequestChallenge,
        );
        self.common.transcript.append(TranscriptScope::M1M2, &request_bytes)?;

        self.send_message(&request_bytes, false)?;
        let mut receive_buffer = [0u8; crate::config::MAX_SPDM_TRANSPORT_SIZE];
        let used = self.receive_message(&mut receive_buffer)?;
        let raw_response = receive_buffer[..used].to_vec();

        let base_asym_sel = self.common.negotiate_info.base_asym_sel;
        let base_hash_sel = self.common.negotiate_info.base_hash_sel;
        let sig_size = base_asym_sel.get_size() as usize;
        if raw_response.len() < sig_size {
            return spdm_result_err!(InvalidRequest);
        }
        let unsigned_len = raw_response.len() - sig_size;

        let mut reader = codec::Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        let challenge_auth = match response.payload {
            SpdmMessagePayload::SpdmErrorResponse(ref error) => {
                return Err(crate::requester::error_handling::map_error_response(error));
            }
            SpdmMessagePayload::SpdmChallengeAuthResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };

        let peer_chain = self
            .common
            .peer_info
            .peer_cert_chain
            .as_ref()
            .ok_or_else(|| crate::spdm_err!(UnexpectedRequest))?;
        let expected_cert_chain_hash = self.common.crypto.hash_all(base_hash_sel, peer_chain)?;
        if expected_cert_chain_hash.as_ref() != challenge_auth.cert_chain_hash.as_ref() {
            return crate::spdm_result_err!(SecurityViolation);
        }

        self.common.transcript.append(TranscriptScope::M1M2, &raw_response[..unsigned_len])?;
        let transcript_hash = self.common.transcript.snapshot(TranscriptScope::M1M2, self.common.crypto, base_hash_sel)?;

        self.common
            .crypto
            .asym_verify(base_asym_sel, base_hash_sel, peer_chain, transcript_hash.as_ref(), &challenge_auth.signature)
            .map_err(|_| crate::spdm_err!(SecurityViolation))?;

        self.common.transcript.append(TranscriptScope::M1M2, &raw_response[unsigned_len..])?;
        self.common.runtime_info.connection_state = SpdmConnectionState::Authenticated;
        Ok(())
    }
}
