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
    /// GET_DIGESTS (spec §4.8): fetches the hash of each provisioned
    /// certificate chain slot on the peer. Slot contents themselves are
    /// retrieved later via GET_CERTIFICATE.
    pub fn send_receive_spdm_digests(&mut self) -> SpdmResult<SpdmDigestsResponsePayload> {
        if self.common.runtime_info.connection_state < SpdmConnectionState::Negotiated {
            return spdm_result_err!(UnexpectedRequest);
        }

        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmGetDigestsRequest,
            SpdmRequestResponseCode::SpdmRequestGetDigests,
        );
        let (raw_response, response) = self.send_receive(&request_bytes)?;
        let digests = match response.payload {
            SpdmMessagePayload::SpdmDigestsResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };

        self.common.transcript.append(TranscriptScope::M1M2, &request_bytes)?;
        self.common.transcript.append(TranscriptScope::M1M2, &raw_response)?;
        self.common.runtime_info.connection_state = SpdmConnectionState::AfterDigests;
        Ok(digests)
    }
}
