// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::Writer;

use crate::common::algo::SpdmDigestStruct;
use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::config::{MAX_SPDM_PSK_CONTEXT_SIZE, MAX_SPDM_TRANSPORT_SIZE};
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::responder::ResponderContext;
use crate::session::SpdmSession;

/// PSK_EXCHANGE (spec §4.3.2): the pre-shared-key counterpart to
/// KEY_EXCHANGE. No DHE, no certificate, no signature — the handshake
/// secret is rooted directly in the provisioned PSK and authenticated by
/// the FINISH HMAC alone.
pub fn handle(
    ctx: &mut ResponderContext,
    raw_request: &[u8],
    request: &SpdmPskExchangeRequestPayload,
) -> SpdmResult<Vec<u8>> {
    if ctx.common.runtime_info.connection_state < SpdmConnectionState::Negotiated {
        return spdm_result_err!(UnexpectedRequest);
    }

    let psk = ctx
        .common
        .provision_info
        .psk
        .clone()
        .ok_or_else(|| crate::spdm_err!(UnsupportedRequest))?;
    if let Some(hint) = &ctx.common.provision_info.psk_hint {
        if !request.psk_hint.is_empty() && &request.psk_hint != hint {
            return spdm_result_err!(InvalidRequest);
        }
    }

    let base_hash_sel = ctx.common.negotiate_info.base_hash_sel;
    let aead_sel = ctx.common.negotiate_info.aead_sel;

    let slot = ctx.common.get_next_free_session_slot()?;
    let rsp_session_id: u16 = 0xff;
    let session_id = ((rsp_session_id as u32) << 16) | request.req_session_id as u32;
    let mut session = SpdmSession::new(session_id, true, base_hash_sel, aead_sel);

    let measurement_summary_hash = match request.measurement_summary_hash_type {
        SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeNone => SpdmDigestStruct::default(),
        _ => ctx.common.crypto.hash_all(base_hash_sel, &[])?,
    };

    let mut context = [0u8; MAX_SPDM_PSK_CONTEXT_SIZE];
    ctx.common.crypto.random_bytes(&mut context)?;

    ctx.common.transcript.append(TranscriptScope::Vca, raw_request)?;
    session.message_k.append_message(raw_request).ok_or_else(|| crate::spdm_err!(InternalError))?;

    let hmac_size = base_hash_sel.get_size() as usize;

    let message = SpdmMessage {
        header: SpdmMessageHeader {
            version: ctx.common.negotiate_info.spdm_version_sel,
            request_response_code: SpdmRequestResponseCode::SpdmResponsePskExchangeRsp,
        },
        payload: SpdmMessagePayload::SpdmPskExchangeResponse(SpdmPskExchangeResponsePayload {
            heartbeat_period: 0,
            rsp_session_id,
            measurement_summary_hash,
            context,
            opaque: SpdmOpaqueStruct::default(),
            verify_data: SpdmDigestStruct::default(),
        }),
    };

    let mut buf = [0u8; MAX_SPDM_TRANSPORT_SIZE];
    let mut writer = Writer::init(&mut buf);
    message.spdm_encode(&mut ctx.common, &mut writer);
    let total_len = writer.used();
    let unsigned_len = total_len - hmac_size;

    session.message_k.append_message(&buf[..unsigned_len]).ok_or_else(|| crate::spdm_err!(InternalError))?;
    let th1 = ctx.common.session_transcript_hash(&session.message_k, None)?;

    session.generate_handshake_secret_psk(ctx.common.crypto, &psk, th1.as_ref())?;
    let finished_key = session.generate_finished_key(ctx.common.crypto, crate::session::SpdmSessionDirection::Response)?;
    let hmac = ctx.common.crypto.hmac_all(base_hash_sel, &finished_key, th1.as_ref())?;
    buf[unsigned_len..total_len].copy_from_slice(hmac.as_ref());
    session.message_k.append_message(&buf[unsigned_len..total_len]).ok_or_else(|| crate::spdm_err!(InternalError))?;

    ctx.common.session[slot] = Some(session);

    Ok(buf[..total_len].to_vec())
}
