// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::Writer;

use crate::common::algo::SpdmDigestStruct;
use crate::config::MAX_SPDM_TRANSPORT_SIZE;
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::responder::ResponderContext;
use crate::session::{SpdmSessionDirection, SpdmSessionState};

pub fn handle(
    ctx: &mut ResponderContext,
    raw_request: &[u8],
    request: &SpdmFinishRequestPayload,
) -> SpdmResult<Vec<u8>> {
    let session_id = ctx
        .common
        .session
        .iter()
        .flatten()
        .find(|s| s.state == SpdmSessionState::Handshaking)
        .map(|s| s.session_id)
        .ok_or_else(|| crate::spdm_err!(UnexpectedRequest))?;

    let crypto = ctx.common.crypto;
    let base_hash_sel = ctx.common.negotiate_info.base_hash_sel;
    let hmac_size = base_hash_sel.get_size() as usize;
    let unsigned_request_len = raw_request.len() - hmac_size;

    {
        let session = ctx.common.get_session_via_id(session_id).unwrap();
        session
            .message_f
            .append_message(&raw_request[..unsigned_request_len])
            .ok_or_else(|| crate::spdm_err!(InternalError))?;
    }

    let (message_k, message_f) = {
        let session = ctx.common.get_session_via_id(session_id).unwrap();
        (session.message_k.clone(), session.message_f.clone())
    };
    let th_for_req_verify = ctx.common.session_transcript_hash(&message_k, Some(&message_f))?;

    {
        let session = ctx.common.get_session_via_id(session_id).unwrap();
        let finished_key = session.generate_finished_key(crypto, SpdmSessionDirection::Request)?;
        crypto
            .hmac_verify(base_hash_sel, &finished_key, th_for_req_verify.as_ref(), request.verify_data.as_ref())
            .map_err(|_| crate::spdm_err!(SecurityViolation))?;
        session
            .message_f
            .append_message(&raw_request[unsigned_request_len..])
            .ok_or_else(|| crate::spdm_err!(InternalError))?;
    }

    let message = SpdmMessage {
        header: SpdmMessageHeader {
            version: ctx.common.negotiate_info.spdm_version_sel,
            request_response_code: SpdmRequestResponseCode::SpdmResponseFinishRsp,
        },
        payload: SpdmMessagePayload::SpdmFinishResponse(SpdmFinishResponsePayload {
            verify_data: Some(SpdmDigestStruct::default()),
        }),
    };
    let mut buf = [0u8; MAX_SPDM_TRANSPORT_SIZE];
    let mut writer = Writer::init(&mut buf);
    message.spdm_encode(&mut ctx.common, &mut writer);
    let total_len = writer.used();
    let unsigned_len = total_len - hmac_size;

    {
        let session = ctx.common.get_session_via_id(session_id).unwrap();
        session
            .message_f
            .append_message(&buf[..unsigned_len])
            .ok_or_else(|| crate::spdm_err!(InternalError))?;
    }

    let (message_k, message_f) = {
        let session = ctx.common.get_session_via_id(session_id).unwrap();
        (session.message_k.clone(), session.message_f.clone())
    };
    let th2 = ctx.common.session_transcript_hash(&message_k, Some(&message_f))?;

    {
        let session = ctx.common.get_session_via_id(session_id).unwrap();
        let finished_key = session.generate_finished_key(crypto, SpdmSessionDirection::Response)?;
        let hmac = crypto.hmac_all(base_hash_sel, &finished_key, th2.as_ref())?;
        buf[unsigned_len..total_len].copy_from_slice(hmac.as_ref());
        session
            .message_f
            .append_message(&buf[unsigned_len..total_len])
            .ok_or_else(|| crate::spdm_err!(InternalError))?;
        session.generate_data_secret(crypto, th2.as_ref())?;
    }

    Ok(buf[..total_len].to_vec())
}
