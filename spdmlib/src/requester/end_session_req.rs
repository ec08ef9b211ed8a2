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
    /// END_SESSION (spec §4.16): tears the secure session down. Unless
    /// `PRESERVE_NEGOTIATED_STATE` is set, a future connection must redo
    /// version/capability/algorithm negotiation from scratch.
    pub fn send_receive_spdm_end_session(&mut self, session_id: u32, attributes: SpdmEndSessionRequestAttributes) -> SpdmResult<()> {
        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmEndSessionRequest(SpdmEndSessionRequestPayload { end_session_request_attributes: attributes }),
            SpdmRequestResponseCode::SpdmRequestEndSession,
        );
        self.send_secured_message(session_id, &request_bytes)?;
        let raw_response = self.receive_secured_message(session_id)?;

        let mut reader = Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        match response.payload {
            SpdmMessagePayload::SpdmErrorResponse(ref error) => {
                return Err(crate::requester::error_handling::map_error_response(error));
            }
            SpdmMessagePayload::SpdmEndSessionResponse => {}
            _ => return spdm_result_err!(InvalidRequest),
        }

        self.common.remove_session(session_id);
        if !attributes.contains(SpdmEndSessionRequestAttributes::PRESERVE_NEGOTIATED_STATE) {
            self.common.reset_runtime_info();
        }
        Ok(())
    }
}
