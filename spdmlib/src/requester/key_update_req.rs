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
    /// KEY_UPDATE (spec §4.15): the two-phase rekey. `UpdateSingleKey`/
    /// `UpdateAllKeys` rolls the secret locally and asks the peer to roll
    /// its matching half; `VerifyNewKey` then confirms both sides can
    /// decrypt under the new key before the old one is discarded.
    pub fn send_receive_spdm_key_update(&mut self, session_id: u32, operation: SpdmKeyUpdateOperation, tag: u8) -> SpdmResult<()> {
        let crypto = self.common.crypto;
        if !matches!(operation, SpdmKeyUpdateOperation::SpdmVerifyNewKey) {
            let session = self.common.get_session_via_id(session_id).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
            session.start_key_update(crypto, operation.updates_all_directions())?;
        }

        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmKeyUpdateRequest(SpdmKeyUpdateRequestPayload { key_update_operation: operation, tag }),
            SpdmRequestResponseCode::SpdmRequestKeyUpdate,
        );
        self.send_secured_message(session_id, &request_bytes)?;
        let raw_response = self.receive_secured_message(session_id)?;

        let mut reader = Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        let key_update = match response.payload {
            SpdmMessagePayload::SpdmErrorResponse(ref error) => {
                return Err(crate::requester::error_handling::map_error_response(error));
            }
            SpdmMessagePayload::SpdmKeyUpdateResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };
        if key_update.tag != tag {
            return spdm_result_err!(InvalidRequest);
        }

        if matches!(operation, SpdmKeyUpdateOperation::SpdmVerifyNewKey) {
            let session = self.common.get_session_via_id(session_id).unwrap();
            session.activate_pending_keys(crypto)?;
        }
        Ok(())
    }
}
