// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::Writer;

use crate::common::algo::{SpdmDigestStruct, SpdmNonceStruct, SpdmSignatureStruct};
use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_TRANSPORT_SIZE;
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::responder::ResponderContext;

pub fn handle(
    ctx: &mut ResponderContext,
    raw_request: &[u8],
    request: &SpdmChallengeRequestPayload,
) -> SpdmResult<Vec<u8>> {
    if ctx.common.runtime_info.connection_state < SpdmConnectionState::AfterCertificate {
        return spdm_result_err!(UnexpectedRequest);
    }

    let chain = ctx.common.provision_info.my_cert_chain[request.slot_id as usize]
        .as_ref()
        .ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
    let cert_chain_hash = ctx.common.crypto.hash_all(ctx.common.negotiate_info.base_hash_sel, chain)?;

    let measurement_summary_hash = match request.measurement_summary_hash_type {
        SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeNone => SpdmDigestStruct::default(),
        _ => ctx.common.crypto.hash_all(ctx.common.negotiate_info.base_hash_sel, &[])?,
    };

    let mut nonce = [0u8; crate::config::SPDM_NONCE_SIZE];
    ctx.common.crypto.random_bytes(&mut nonce)?;

    ctx.common.transcript.append(TranscriptScope::M1M2, raw_request)?;

    let base_asym_sel = ctx.common.negotiate_info.base_asym_sel;
    let base_hash_sel = ctx.common.negotiate_info.base_hash_sel;
    let sig_size = base_asym_sel.get_size() as usize;

    let message = SpdmMessage {
        header: SpdmMessageHeader {
            version: ctx.common.negotiate_info.spdm_version_sel,
            request_response_code: SpdmRequestResponseCode::SpdmResponseChallengeAuth,
        },
        payload: SpdmMessagePayload::SpdmChallengeAuthResponse(SpdmChallengeAuthResponsePayload {
            slot_id: request.slot_id,
            cert_chain_hash,
            nonce: SpdmNonceStruct { data: nonce },
            measurement_summary_hash,
            opaque: SpdmOpaqueStruct::default(),
            signature: SpdmSignatureStruct::default(),
        }),
    };

    let mut buf = [0u8; MAX_SPDM_TRANSPORT_SIZE];
    let mut writer = Writer::init(&mut buf);
    message.spdm_encode(&mut ctx.common, &mut writer);
    let total_len = writer.used();
    let unsigned_len = total_len - sig_size;

    ctx.common.transcript.append(TranscriptScope::M1M2, &buf[..unsigned_len])?;
    let transcript_hash = ctx.common.transcript.snapshot(TranscriptScope::M1M2, ctx.common.crypto, base_hash_sel)?;

    let private_key = ctx
        .common
        .provision_info
        .my_private_key
        .as_ref()
        .ok_or_else(|| crate::spdm_err!(InternalError))?;
    let signature = ctx
        .common
        .crypto
        .asym_sign(base_asym_sel, base_hash_sel, private_key, transcript_hash.as_ref())?;
    buf[unsigned_len..total_len].copy_from_slice(signature.as_ref());

    ctx.common.transcript.append(TranscriptScope::M1M2, &buf[unsigned_len..total_len])?;
    ctx.common.runtime_info.connection_state = SpdmConnectionState::Authenticated;
    Ok(buf[..total_len].to_vec())
}
