// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::error::SpdmResult;
use crate::message::*;
use crate::responder::ResponderContext;

/// HEARTBEAT (spec §4.6.2): a no-op liveness probe over an established
/// secured session. Resets nothing but the peer's inactivity timer, which
/// lives at the transport/host layer rather than in `SpdmSession`.
pub fn handle(ctx: &mut ResponderContext) -> SpdmResult<Vec<u8>> {
    Ok(ctx.encode(SpdmMessagePayload::SpdmHeartbeatResponse, SpdmRequestResponseCode::SpdmResponseHeartbeatAck))
}
