// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::responder::ResponderContext;

pub fn handle(
    ctx: &mut ResponderContext,
    raw_request: &[u8],
    request: &SpdmGetCertificateRequestPayload,
) -> SpdmResult<Vec<u8>> {
    if ctx.common.runtime_info.connection_state < SpdmConnectionState::AfterDigests {
        return spdm_result_err!(UnexpectedRequest);
    }

    let chain = ctx.common.provision_info.my_cert_chain[request.slot_id as usize]
        .as_ref()
        .ok_or_else(|| crate::spdm_err!(InvalidRequest))?;

    let offset = request.offset as usize;
    if offset > chain.len() {
        return spdm_result_err!(InvalidRequest);
    }
    let portion_length = (request.length as usize).min(chain.len() - offset) as u16;
    let remainder_length = (chain.len() - offset - portion_length as usize) as u16;
    let cert_chain = chain[offset..offset + portion_length as usize].to_vec();

    let response = SpdmCertificateResponsePayload {
        slot_id: request.slot_id,
        portion_length,
        remainder_length,
        cert_chain,
    };
    let encoded = ctx.encode(
        SpdmMessagePayload::SpdmCertificateResponse(response),
        SpdmRequestResponseCode::SpdmResponseCertificate,
    );

    ctx.common.transcript.append(TranscriptScope::M1M2, raw_request)?;
    ctx.common.transcript.append(TranscriptScope::M1M2, &encoded)?;
    if remainder_length == 0 {
        ctx.common.runtime_info.connection_state = SpdmConnectionState::AfterCertificate;
    }
    Ok(encoded)
}
