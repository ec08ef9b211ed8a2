// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::Writer;

use crate::common::algo::{SpdmDheExchangeStruct, SpdmDigestStruct, SpdmSignatureStruct};
use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_TRANSPORT_SIZE;
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::responder::ResponderContext;
use crate::session::SpdmSession;

pub fn handle(
    ctx: &mut ResponderContext,
    raw_request: &[u8],
    request: &SpdmKeyExchangeRequestPayload,
) -> SpdmResult<Vec<u8>> {
    if ctx.common.runtime_info.connection_state < SpdmConnectionState::Negotiated {
        return spdm_result_err!(UnexpectedRequest);
    }

    let base_hash_sel = ctx.common.negotiate_info.base_hash_sel;
    let base_asym_sel = ctx.common.negotiate_info.base_asym_sel;
    let aead_sel = ctx.common.negotiate_info.aead_sel;
    let dhe_sel = ctx.common.negotiate_info.dhe_sel;

    let dhe_exchange = ctx.common.crypto.dhe_generate(dhe_sel)?;
    let rsp_public = dhe_exchange.public_key();
    let dhe_secret = dhe_exchange.compute_shared_secret(request.exchange.as_ref())?;

    let slot = ctx.common.get_next_free_session_slot()?;
    let rsp_session_id: u16 = 0xff;
    let session_id = ((rsp_session_id as u32) << 16) | request.req_session_id as u32;
    let mut session = SpdmSession::new(session_id, false, base_hash_sel, aead_sel);

    let measurement_summary_hash = match request.measurement_summary_hash_type {
        SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeNone => SpdmDigestStruct::default(),
        _ => ctx.common.crypto.hash_all(base_hash_sel, &[])?,
    };

    let mut random = [0u8; 32];
    ctx.common.crypto.random_bytes(&mut random)?;

    ctx.common.transcript.append(TranscriptScope::Vca, raw_request)?;
    session.message_k.append_message(raw_request).ok_or_else(|| crate::spdm_err!(InternalError))?;

    let sig_size = base_asym_sel.get_size() as usize;
    let hmac_size = base_hash_sel.get_size() as usize;

    let message = SpdmMessage {
        header: SpdmMessageHeader {
            version: ctx.common.negotiate_info.spdm_version_sel,
            request_response_code: SpdmRequestResponseCode::SpdmResponseKeyExchangeRsp,
        },
        payload: SpdmMessagePayload::SpdmKeyExchangeResponse(SpdmKeyExchangeResponsePayload {
            heartbeat_period: 0,
            rsp_session_id,
            mut_auth_requested: false,
            req_slot_id: request.slot_id,
            random,
            exchange: rsp_public,
            measurement_summary_hash,
            opaque: SpdmOpaqueStruct::default(),
            signature: SpdmSignatureStruct::default(),
            verify_data: SpdmDigestStruct::default(),
        }),
    };

    let mut buf = [0u8; MAX_SPDM_TRANSPORT_SIZE];
    let mut writer = Writer::init(&mut buf);
    message.spdm_encode(&mut ctx.common, &mut writer);
    let total_len = writer.used();
    let verify_data_start = total_len - hmac_size;
    let unsigned_len = verify_data_start - sig_size;

    session.message_k.append_message(&buf[..unsigned_len]).ok_or_else(|| crate::spdm_err!(InternalError))?;
    let th1_unsigned = ctx.common.session_transcript_hash(&session.message_k, None)?;

    let private_key = ctx
        .common
        .provision_info
        .my_private_key
        .as_ref()
        .ok_or_else(|| crate::spdm_err!(InternalError))?;
    let signature = ctx.common.crypto.asym_sign(base_asym_sel, base_hash_sel, private_key, th1_unsigned.as_ref())?;
    buf[unsigned_len..verify_data_start].copy_from_slice(signature.as_ref());
    session.message_k.append_message(&buf[unsigned_len..verify_data_start]).ok_or_else(|| crate::spdm_err!(InternalError))?;

    let th1 = ctx.common.session_transcript_hash(&session.message_k, None)?;
    session.generate_handshake_secret(ctx.common.crypto, dhe_secret, th1.as_ref())?;
    let finished_key = session.generate_finished_key(ctx.common.crypto, crate::session::SpdmSessionDirection::Response)?;
    let hmac = ctx.common.crypto.hmac_all(base_hash_sel, &finished_key, th1.as_ref())?;
    buf[verify_data_start..total_len].copy_from_slice(hmac.as_ref());
    session.message_k.append_message(&buf[verify_data_start..total_len]).ok_or_else(|| crate::spdm_err!(InternalError))?;

    ctx.common.session[slot] = Some(session);

    Ok(buf[..total_len].to_vec())
}
