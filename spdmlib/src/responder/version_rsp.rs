// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::transcript::TranscriptScope;
use crate::common::{SpdmConnectionState, SpdmResponseState};
use crate::error::SpdmResult;
use crate::message::*;
use crate::responder::ResponderContext;

pub fn handle(ctx: &mut ResponderContext, raw_request: &[u8]) -> SpdmResult<Vec<u8>> {
    ctx.common.reset_runtime_info();
    ctx.common.runtime_info.response_state = SpdmResponseState::Normal;

    let response = SpdmVersionResponsePayload {
        version_number_entries: ctx.common.config_info.spdm_version.clone(),
    };
    let encoded = ctx.encode(
        SpdmMessagePayload::SpdmVersionResponse(response),
        SpdmRequestResponseCode::SpdmResponseVersion,
    );

    ctx.common.transcript.append(TranscriptScope::Vca, raw_request)?;
    ctx.common.transcript.append(TranscriptScope::Vca, &encoded)?;
    ctx.common.runtime_info.connection_state = SpdmConnectionState::AfterVersion;
    Ok(encoded)
}
