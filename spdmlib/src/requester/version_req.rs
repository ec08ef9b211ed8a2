// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::algo::SpdmVersion;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::error::SpdmResult;
use crate::message::*;
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    /// GET_VERSION (spec §4.7): the first exchange of a connection. Resets
    /// any prior negotiation state before sending, since a version restart
    /// invalidates everything negotiated under the old one.
    pub fn send_receive_spdm_version(&mut self) -> SpdmResult<SpdmVersion> {
        self.common.reset_runtime_info();

        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmGetVersionRequest(SpdmGetVersionRequestPayload {}),
            SpdmRequestResponseCode::SpdmRequestGetVersion,
        );
        let (raw_response, response) = self.send_receive(&request_bytes)?;

        let version_response = match response.payload {
            SpdmMessagePayload::SpdmVersionResponse(p) => p,
            _ => return Err(crate::spdm_err!(InvalidRequest)),
        };
        let version = self.common.negotiate_version(&version_response.version_number_entries)?;
        self.common.negotiate_info.spdm_version_sel = version;

        self.common.transcript.append(TranscriptScope::Vca, &request_bytes)?;
        self.common.transcript.append(TranscriptScope::Vca, &raw_response)?;
        self.common.runtime_info.connection_state = SpdmConnectionState::AfterVersion;
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use crate::testlib::create_test_context;

    #[test]
    fn test_case0_requester_context_exists() {
        let _ = create_test_context();
    }
}
