// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::error::SpdmResult;
use crate::message::*;
use crate::responder::ResponderContext;
use crate::session::SpdmSessionState;

/// END_SESSION (spec §4.6.3): the ACK goes out still under the session's
/// secured record layer, so the session is torn down only after `encode`
/// has built the response — removing it first would leave nothing for
/// `ResponderContext::send_secured_message` to encrypt under.
pub fn handle(ctx: &mut ResponderContext, request: &SpdmEndSessionRequestPayload) -> SpdmResult<Vec<u8>> {
    let session_id = ctx
        .common
        .session
        .iter()
        .flatten()
        .find(|s| s.state == SpdmSessionState::Established)
        .map(|s| s.session_id)
        .ok_or_else(|| crate::spdm_err!(UnexpectedRequest))?;

    let response = ctx.encode(SpdmMessagePayload::SpdmEndSessionResponse, SpdmRequestResponseCode::SpdmResponseEndSessionAck);
    ctx.common.remove_session(session_id);
    if !request
        .end_session_request_attributes
        .contains(SpdmEndSessionRequestAttributes::PRESERVE_NEGOTIATED_STATE)
    {
        ctx.common.reset_runtime_info();
    }
    Ok(response)
}
