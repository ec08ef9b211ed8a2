// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::Reader;

use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    /// HEARTBEAT (spec §4.14): keeps an established session's responder
    /// liveness timer from expiring.
    pub fn send_receive_spdm_heartbeat(&mut self, session_id: u32) -> SpdmResult<()> {
        let request_bytes = self.encode(SpdmMessagePayload::SpdmHeartbeatRequest, SpdmRequestResponseCode::SpdmRequestHeartbeat);
        self.send_secured_message(session_id, &request_bytes)?;
        let raw_response = self.receive_secured_message(session_id)?;

        let mut reader = Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        match response.payload {
            SpdmMessagePayload::SpdmErrorResponse(ref error) => Err(crate::requester::error_handling::map_error_response(error)),
            SpdmMessagePayload::SpdmHeartbeatResponse => Ok(()),
            _ => spdm_result_err!(InvalidRequest),
        }
    }
}
