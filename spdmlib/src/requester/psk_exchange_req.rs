// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::config::{MAX_SPDM_PSK_CONTEXT_SIZE, MAX_SPDM_TRANSPORT_SIZE};
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::requester::RequesterContext;
use crate::session::{SpdmSession, SpdmSessionDirection};

impl<'a> RequesterContext<'a> {
    /// PSK_EXCHANGE / PSK_EXCHANGE_RSP (spec §4.3.2): pre-shared-key
    /// counterpart to KEY_EXCHANGE. The handshake secret is rooted in the
    /// provisioned PSK rather than a DHE shared secret.
    pub fn send_receive_spdm_psk_exchange(
        &mut self,
        psk_hint: Vec<u8>,
        measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    ) -> SpdmResult<u32> {
        if self.common.runtime_info.connection_state < SpdmConnectionState::Negotiated {
            return spdm_result_err!(UnexpectedRequest);
        }

        let psk = self
            .common
            .provision_info
            .psk
            .clone()
            .ok_or_else(|| crate::spdm_err!(UnsupportedRequest))?;

        let base_hash_sel = self.common.negotiate_info.base_hash_sel;
        let aead_sel = self.common.negotiate_info.aead_sel;

        let req_session_id: u16 = 0x01;
        let mut context = [0u8; MAX_SPDM_PSK_CONTEXT_SIZE];
        self.common.crypto.random_bytes(&mut context)?;

        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmPskExchangeRequest(SpdmPskExchangeRequestPayload {
                measurement_summary_hash_type,
                req_session_id,
                psk_hint,
                context: context.to_vec(),
                opaque: SpdmOpaqueStruct::default(),
            }),
            SpdmRequestResponseCode::SpdmRequestPskExchange,
        );
        self.common.transcript.append(TranscriptScope::Vca, &request_bytes)?;
        let mut session = SpdmSession::new(0, true, base_hash_sel, aead_sel);
        session.message_k.append_message(&request_bytes).ok_or_else(|| crate::spdm_err!(InternalError))?;

        self.send_message(&request_bytes, false)?;
        let mut receive_buffer = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let used = self.receive_message(&mut receive_buffer)?;
        let raw_response = receive_buffer[..used].to_vec();

        let hmac_size = base_hash_sel.get_size() as usize;
        if raw_response.len() < hmac_size {
            return spdm_result_err!(InvalidRequest);
        }
        let unsigned_len = raw_response.len() - hmac_size;

        let mut reader = codec::Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        let psk_exchange = match response.payload {
            SpdmMessagePayload::SpdmErrorResponse(ref error) => {
                return Err(crate::requester::error_handling::map_error_response(error));
            }
            SpdmMessagePayload::SpdmPskExchangeResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };

        let session_id = ((psk_exchange.rsp_session_id as u32) << 16) | req_session_id as u32;

        session.message_k.append_message(&raw_response[..unsigned_len]).ok_or_else(|| crate::spdm_err!(InternalError))?;
        let th1 = self.common.session_transcript_hash(&session.message_k, None)?;

        session.generate_handshake_secret_psk(self.common.crypto, &psk, th1.as_ref())?;
        let finished_key = session.generate_finished_key(self.common.crypto, SpdmSessionDirection::Response)?;
        self.common
            .crypto
            .hmac_verify(base_hash_sel, &finished_key, th1.as_ref(), psk_exchange.verify_data.as_ref())
            .map_err(|_| crate::spdm_err!(SecurityViolation))?;
        session.message_k.append_message(&raw_response[unsigned_len..]).ok_or_else(|| crate::spdm_err!(InternalError))?;

        session.session_id = session_id;
        let slot = self.common.get_next_free_session_slot()?;
        self.common.session[slot] = Some(session);

        Ok(session_id)
    }
}
