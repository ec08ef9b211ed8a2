// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::error::SpdmResult;
use crate::message::*;
use crate::responder::ResponderContext;
use crate::session::SpdmSessionState;

/// KEY_UPDATE (spec §4.6.1), a two-step rekey run entirely within an
/// established session. `UpdateKey`/`UpdateAllKeys` stages the rolled
/// request-direction secret as pending; `UpdateAllKeys` additionally rolls
/// and immediately activates the response-direction secret, since the
/// responder's own outgoing key needs no peer-confirmation round trip. The
/// follow-up `VerifyNewKey` request is what swaps the pending
/// request-direction secret in, via `SpdmSession::activate_pending_keys`.
pub fn handle(ctx: &mut ResponderContext, request: &SpdmKeyUpdateRequestPayload) -> SpdmResult<Vec<u8>> {
    let session_id = ctx
        .common
        .session
        .iter()
        .flatten()
        .find(|s| s.state == SpdmSessionState::Established)
        .map(|s| s.session_id)
        .ok_or_else(|| crate::spdm_err!(UnexpectedRequest))?;

    let crypto = ctx.common.crypto;
    let session = ctx.common.get_session_via_id(session_id).unwrap();
    match request.key_update_operation {
        SpdmKeyUpdateOperation::SpdmUpdateSingleKey | SpdmKeyUpdateOperation::SpdmUpdateAllKeys => {
            session.start_key_update(crypto, request.key_update_operation.updates_all_directions())?;
        }
        SpdmKeyUpdateOperation::SpdmVerifyNewKey => {
            session.activate_pending_keys(crypto)?;
        }
        SpdmKeyUpdateOperation::Unknown(_) => return crate::spdm_result_err!(InvalidRequest),
    }

    Ok(ctx.encode(
        SpdmMessagePayload::SpdmKeyUpdateResponse(SpdmKeyUpdateResponsePayload {
            key_update_operation: request.key_update_operation,
            tag: request.tag,
        }),
        SpdmRequestResponseCode::SpdmResponseKeyUpdateAck,
    ))
}
