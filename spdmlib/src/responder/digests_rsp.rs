// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::algo::SpdmDigestStruct;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_CERT_CHAIN_SLOT_COUNT;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::responder::ResponderContext;

pub fn handle(ctx: &mut ResponderContext, raw_request: &[u8]) -> SpdmResult<Vec<u8>> {
    if ctx.common.runtime_info.connection_state < SpdmConnectionState::Negotiated {
        return spdm_result_err!(UnexpectedRequest);
    }

    let mut slot_mask = 0u8;
    let mut digests = Vec::new();
    for (slot, chain) in ctx.common.provision_info.my_cert_chain.iter().enumerate().take(MAX_SPDM_CERT_CHAIN_SLOT_COUNT) {
        if let Some(chain) = chain {
            slot_mask |= 1 << slot;
            digests.push(ctx.common.crypto.hash_all(ctx.common.negotiate_info.base_hash_sel, chain)?);
        }
    }
    if digests.is_empty() {
        digests.push(SpdmDigestStruct::default());
    }

    let response = SpdmDigestsResponsePayload { slot_mask, digests };
    let encoded = ctx.encode(
        SpdmMessagePayload::SpdmDigestsResponse(response),
        SpdmRequestResponseCode::SpdmResponseDigests,
    );

    ctx.common.transcript.append(TranscriptScope::M1M2, raw_request)?;
    ctx.common.transcript.append(TranscriptScope::M1M2, &encoded)?;
    ctx.common.runtime_info.connection_state = SpdmConnectionState::AfterDigests;
    Ok(encoded)
}
