// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_TRANSPORT_SIZE;
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::requester::RequesterContext;
use crate::session::{SpdmSession, SpdmSessionDirection};

impl<'a> RequesterContext<'a> {
    /// KEY_EXCHANGE / KEY_EXCHANGE_RSP (spec §4.12): establishes a secure
    /// session keyed from an ephemeral DHE exchange, authenticated by the
    /// responder's signature and handshake HMAC.
    pub fn send_receive_spdm_key_exchange(
        &mut self,
        slot_id: u8,
        measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    ) -> SpdmResult<u32> {
        if self.common.runtime_info.connection_state < SpdmConnectionState::Negotiated {
            return spdm_result_err!(UnexpectedRequest);
        }

        let base_hash_sel = self.common.negotiate_info.base_hash_sel;
        let base_asym_sel = self.common.negotiate_info.base_asym_sel;
        let aead_sel = self.common.negotiate_info.aead_sel;
        let dhe_sel = self.common.negotiate_info.dhe_sel;

        let dhe_exchange = self.common.crypto.dhe_generate(dhe_sel)?;
        let req_public = dhe_exchange.public_key();

        let req_session_id: u16 = 0x01;
        let mut random = [0u8; 32];
        self.common.crypto.random_bytes(&mut random)?;

        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmKeyExchangeRequest(SpdmKeyExchangeRequestPayload {
                measurement_summary_hash_type,
                slot_id,
                req_session_id,
                random,
                exchange: req_public,
                opaque: SpdmOpaqueStruct::default(),
            }),
            SpdmRequestResponseCode::SpdmRequestKeyExchange,
        );
        self.common.transcript.append(TranscriptScope::Vca, &request_bytes)?;
        let mut session = SpdmSession::new(0, false, base_hash_sel, aead_sel);
        session.message_k.append_message(&request_bytes).ok_or_else(|| crate::spdm_err!(InternalError))?;

        self.send_message(&request_bytes, false)?;
        let mut receive_buffer = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let used = self.receive_message(&mut receive_buffer)?;
        let raw_response = receive_buffer[..used].to_vec();

        let sig_size = base_asym_sel.get_size() as usize;
        let hmac_size = base_hash_sel.get_size() as usize;
        if raw_response.len() < sig_size + hmac_size {
            return spdm_result_err!(InvalidRequest);
        }
        let verify_data_start = raw_response.len() - hmac_size;
        let unsigned_len = verify_data_start - sig_size;

        let mut reader = codec::Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        let key_exchange = match response.payload {
            SpdmMessagePayload::SpdmErrorResponse(ref error) => {
                return Err(crate::requester::error_handling::map_error_response(error));
            }
            SpdmMessagePayload::SpdmKeyExchangeResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };

        let dhe_secret = dhe_exchange.compute_shared_secret(key_exchange.exchange.as_ref())?;
        let session_id = ((key_exchange.rsp_session_id as u32) << 16) | req_session_id as u32;

        session.message_k.append_message(&raw_response[..unsigned_len]).ok_or_else(|| crate::spdm_err!(InternalError))?;
        let th1_unsigned = self.common.session_transcript_hash(&session.message_k, None)?;

        let peer_chain = self
            .common
            .peer_info
            .peer_cert_chain
            .as_ref()
            .ok_or_else(|| crate::spdm_err!(UnexpectedRequest))?;
        self.common
            .crypto
            .asym_verify(base_asym_sel, base_hash_sel, peer_chain, th1_unsigned.as_ref(), key_exchange.signature.as_ref())
            .map_err(|_| crate::spdm_err!(SecurityViolation))?;
        session.message_k.append_message(&raw_response[unsigned_len..verify_data_start]).ok_or_else(|| crate::spdm_err!(InternalError))?;

        let th1 = self.common.session_transcript_hash(&session.message_k, None)?;
        session.generate_handshake_secret(self.common.crypto, dhe_secret, th1.as_ref())?;
        let finished_key = session.generate_finished_key(self.common.crypto, SpdmSessionDirection::Response)?;
        self.common
            .crypto
            .hmac_verify(base_hash_sel, &finished_key, th1.as_ref(), key_exchange.verify_data.as_ref())
            .map_err(|_| crate::spdm_err!(SecurityViolation))?;
        session.message_k.append_message(&raw_response[verify_data_start..]).ok_or_else(|| crate::spdm_err!(InternalError))?;

        session.session_id = session_id;
        let slot = self.common.get_next_free_session_slot()?;
        self.common.session[slot] = Some(session);

        Ok(session_id)
    }
}
