// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::config::DATA_TRANSFER_SIZE;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    /// GET_CERTIFICATE (spec §4.9): walks the peer's certificate chain in
    /// one slot out in `DATA_TRANSFER_SIZE`-sized portions until the
    /// responder reports no remainder, assembling the full chain.
    pub fn send_receive_spdm_certificate(&mut self, slot_id: u8) -> SpdmResult<()> {
        if self.common.runtime_info.connection_state < SpdmConnectionState::AfterDigests {
            return spdm_result_err!(UnexpectedRequest);
        }

        let mut cert_chain = Vec::new();
        let mut offset: u16 = 0;
        loop {
            let request_bytes = self.encode(
                SpdmMessagePayload::SpdmGetCertificateRequest(SpdmGetCertificateRequestPayload {
                    slot_id,
                    offset,
                    length: DATA_TRANSFER_SIZE as u16,
                }),
                SpdmRequestResponseCode::SpdmRequestGetCertificate,
            );
            let (raw_response, response) = self.send_receive(&request_bytes)?;
            let certificate = match response.payload {
                SpdmMessagePayload::SpdmCertificateResponse(p) => p,
                _ => return spdm_result_err!(InvalidRequest),
            };

            self.common.transcript.append(TranscriptScope::M1M2, &request_bytes)?;
            self.common.transcript.append(TranscriptScope::M1M2, &raw_response)?;

            cert_chain.extend_from_slice(&certificate.cert_chain);
            offset += certificate.portion_length;
            if certificate.remainder_length == 0 {
                break;
            }
        }

        self.common.peer_info.peer_cert_chain = Some(cert_chain);
        self.common.runtime_info.connection_state = SpdmConnectionState::AfterCertificate;
        Ok(())
    }
}
