// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::responder::ResponderContext;
use crate::session::{SpdmSessionDirection, SpdmSessionState};

/// PSK_FINISH (spec §4.3.2): confirms both ends derived the same PSK
/// handshake secret. Unlike FINISH there is no signature half — the
/// whole payload is the request-direction finished MAC — and the
/// response carries no verify_data of its own.
pub fn handle(
    ctx: &mut ResponderContext,
    raw_request: &[u8],
    request: &SpdmPskFinishRequestPayload,
) -> SpdmResult<Vec<u8>> {
    let session_id = ctx
        .common
        .session
        .iter()
        .flatten()
        .find(|s| s.use_psk && s.state == SpdmSessionState::Handshaking)
        .map(|s| s.session_id)
        .ok_or_else(|| crate::spdm_err!(UnexpectedRequest))?;

    let crypto = ctx.common.crypto;
    let base_hash_sel = ctx.common.negotiate_info.base_hash_sel;
    let hmac_size = base_hash_sel.get_size() as usize;
    if raw_request.len() < hmac_size {
        return spdm_result_err!(InvalidRequest);
    }
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
    let th2_for_verify = ctx.common.session_transcript_hash(&message_k, Some(&message_f))?;

    {
        let session = ctx.common.get_session_via_id(session_id).unwrap();
        let finished_key = session.generate_finished_key(crypto, SpdmSessionDirection::Request)?;
        crypto
            .hmac_verify(base_hash_sel, &finished_key, th2_for_verify.as_ref(), request.verify_data.as_ref())
            .map_err(|_| crate::spdm_err!(SecurityViolation))?;
        session
            .message_f
            .append_message(&raw_request[unsigned_request_len..])
            .ok_or_else(|| crate::spdm_err!(InternalError))?;
        session.generate_data_secret(crypto, th2_for_verify.as_ref())?;
    }

    Ok(ctx.encode(
        SpdmMessagePayload::SpdmPskFinishResponse(SpdmPskFinishResponsePayload {}),
        SpdmRequestResponseCode::SpdmResponsePskFinishRsp,
    ))
}
