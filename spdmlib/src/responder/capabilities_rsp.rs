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
    request: &SpdmGetCapabilitiesRequestPayload,
) -> SpdmResult<Vec<u8>> {
    if ctx.common.runtime_info.connection_state < SpdmConnectionState::AfterVersion {
        return spdm_result_err!(UnexpectedRequest);
    }

    ctx.common.negotiate_info.req_ct_exponent_sel = request.ct_exponent;
    ctx.common.negotiate_info.req_capabilities_sel = request.flags;
    ctx.common.negotiate_info.rsp_ct_exponent_sel = ctx.common.config_info.rsp_ct_exponent;
    ctx.common.negotiate_info.rsp_capabilities_sel = ctx.common.config_info.rsp_capabilities;

    let response = SpdmCapabilitiesResponsePayload {
        ct_exponent: ctx.common.config_info.rsp_ct_exponent,
        flags: ctx.common.config_info.rsp_capabilities,
    };
    let encoded = ctx.encode(
        SpdmMessagePayload::SpdmCapabilitiesResponse(response),
        SpdmRequestResponseCode::SpdmResponseCapabilities,
    );

    ctx.common.transcript.append(TranscriptScope::Vca, raw_request)?;
    ctx.common.transcript.append(TranscriptScope::Vca, &encoded)?;
    ctx.common.runtime_info.connection_state = SpdmConnectionState::AfterCapabilities;
    Ok(encoded)
}
