// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    /// GET_CAPABILITIES (spec §4.7): advertises this endpoint's supported
    /// operations and records the peer's in return.
    pub fn send_receive_spdm_capabilities(&mut self) -> SpdmResult<()> {
        if self.common.runtime_info.connection_state < SpdmConnectionState::AfterVersion {
            return spdm_result_err!(UnexpectedRequest);
        }

        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmGetCapabilitiesRequest(SpdmGetCapabilitiesRequestPayload {
                ct_exponent: self.common.config_info.req_ct_exponent,
                flags: self.common.config_info.req_capabilities,
            }),
            SpdmRequestResponseCode::SpdmRequestGetCapabilities,
        );
        self.common.negotiate_info.req_ct_exponent_sel = self.common.config_info.req_ct_exponent;
        self.common.negotiate_info.req_capabilities_sel = self.common.config_info.req_capabilities;

        let (raw_response, response) = self.send_receive(&request_bytes)?;
        let capabilities = match response.payload {
            SpdmMessagePayload::SpdmCapabilitiesResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };
        self.common.negotiate_info.rsp_ct_exponent_sel = capabilities.ct_exponent;
        self.common.negotiate_info.rsp_capabilities_sel = capabilities.flags;

        self.common.transcript.append(TranscriptScope::Vca, &request_bytes)?;
        self.common.transcript.append(TranscriptScope::Vca, &raw_response)?;
        self.common.runtime_info.connection_state = SpdmConnectionState::AfterCapabilities;
        Ok(())
    }
}
