// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::{Reader, Writer};

use crate::common::algo::{SpdmDigestStruct, SpdmSignatureStruct};
use crate::config::MAX_SPDM_TRANSPORT_SIZE;
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::requester::RequesterContext;
use crate::session::SpdmSessionDirection;

impl<'a> RequesterContext<'a> {
    /// FINISH / FINISH_RSP (spec §4.13): completes the handshake phase and
    /// flips the session into the `Established` state both sides trust.
    pub fn send_receive_spdm_finish(&mut self, session_id: u32) -> SpdmResult<()> {
        let base_hash_sel = self.common.negotiate_info.base_hash_sel;
        let hmac_size = base_hash_sel.get_size() as usize;

        let message = SpdmMessage {
            header: SpdmMessageHeader {
                version: self.common.negotiate_info.spdm_version_sel,
                request_response_code: SpdmRequestResponseCode::SpdmRequestFinish,
            },
            payload: SpdmMessagePayload::SpdmFinishRequest(SpdmFinishRequestPayload {
                finish_request_attributes: SpdmFinishRequestAttributes::empty(),
                req_slot_id: 0,
                signature: SpdmSignatureStruct::default(),
                verify_data: SpdmDigestStruct::default(),
            }),
        };
        let mut buf = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let mut writer = Writer::init(&mut buf);
        message.spdm_encode(&mut self.common, &mut writer);
        let total_len = writer.used();
        let unsigned_len = total_len - hmac_size;

        let crypto = self.common.crypto;
        { let session = self.common.get_session_via_id(session_id).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
          session.message_f.append_message(&buf[..unsigned_len]).ok_or_else(|| crate::spdm_err!(InternalError))?; }

        let (message_k, message_f) = { let session = self.common.get_session_via_id(session_id).unwrap();
          (session.message_k.clone(), session.message_f.clone()) };
        let th_for_req = self.common.session_transcript_hash(&message_k, Some(&message_f))?;

        { let session = self.common.get_session_via_id(session_id).unwrap();
          let finished_key = session.generate_finished_key(crypto, SpdmSessionDirection::Request)?;
          let hmac = crypto.hmac_all(base_hash_sel, &finished_key, th_for_req.as_ref())?;
          buf[unsigned_len..total_len].copy_from_slice(hmac.as_ref());
          session.message_f.append_message(&buf[unsigned_len..total_len]).ok_or_else(|| crate::spdm_err!(InternalError))?; }

        self.send_secured_message(session_id, &buf[..total_len])?;
        let raw_response = self.receive_secured_message(session_id)?;
        if raw_response.len() < hmac_size {
            return spdm_result_err!(InvalidRequest);
        }
        let response_unsigned_len = raw_response.len() - hmac_size;

        let mut reader = Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        let finish_rsp = match response.payload {
            SpdmMessagePayload::SpdmErrorResponse(ref error) => {
                return Err(crate::requester::error_handling::map_error_response(error));
            }
            SpdmMessagePayload::SpdmFinishResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };
        let verify_data = finish_rsp.verify_data.ok_or_else(|| crate::spdm_err!(InvalidRequest))?;

        { let session = self.common.get_session_via_id(session_id).unwrap();
          session.message_f.append_message(&raw_response[..response_unsigned_len]).ok_or_else(|| crate::spdm_err!(InternalError))?; }

        let (message_k, message_f) = { let session = self.common.get_session_via_id(session_id).unwrap();
          (session.message_k.clone(), session.message_f.clone()) };
        let th2_for_verify = self.common.session_transcript_hash(&message_k, Some(&message_f))?;

        { let session = self.common.get_session_via_id(session_id).unwrap();
          let finished_key = session.generate_finished_key(crypto, SpdmSessionDirection::Response)?;
          crypto.hmac_verify(base_hash_sel, &finished_key, th2_for_verify.as_ref(), verify_data.as_ref())
              .map_err(|_| crate::spdm_err!(SecurityViolation))?;
          session.message_f.append_message(&raw_response[response_unsigned_len..]).ok_or_else(|| crate::spdm_err!(InternalError))?; }

        { let session = self.common.get_session_via_id(session_id).unwrap();
          session.generate_data_secret(crypto, th2_for_verify.as_ref())?; }

        Ok(())
    }
}
