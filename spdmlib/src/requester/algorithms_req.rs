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
    /// NEGOTIATE_ALGORITHMS (spec §4.7): offers this endpoint's candidate
    /// set per algorithm category and records the responder's final pick.
    pub fn send_receive_spdm_algorithm(&mut self) -> SpdmResult<()> {
        if self.common.runtime_info.connection_state < SpdmConnectionState::AfterCapabilities {
            return spdm_result_err!(UnexpectedRequest);
        }

        let config = &self.common.config_info;
        let request_bytes = self.encode(
            SpdmMessagePayload::SpdmNegotiateAlgorithmsRequest(SpdmNegotiateAlgorithmsRequestPayload {
                measurement_specification: config.measurement_specification,
                base_asym_algo: config.base_asym_algo,
                base_hash_algo: config.base_hash_algo,
                dhe_algo: config.dhe_algo,
                aead_algo: config.aead_algo,
                req_asym_algo: config.req_asym_algo,
                key_schedule_algo: config.key_schedule_algo,
            }),
            SpdmRequestResponseCode::SpdmRequestNegotiateAlgorithms,
        );

        let (raw_response, response) = self.send_receive(&request_bytes)?;
        let algorithms = match response.payload {
            SpdmMessagePayload::SpdmAlgorithmsResponse(p) => p,
            _ => return spdm_result_err!(InvalidRequest),
        };

        self.common.negotiate_info.measurement_specification_sel = algorithms.measurement_specification_sel;
        self.common.negotiate_info.measurement_hash_sel = algorithms.measurement_hash_algo;
        self.common.negotiate_info.base_asym_sel = algorithms.base_asym_sel;
        self.common.negotiate_info.base_hash_sel = algorithms.base_hash_sel;
        self.common.negotiate_info.dhe_sel = algorithms.dhe_sel;
        self.common.negotiate_info.aead_sel = algorithms.aead_sel;
        self.common.negotiate_info.req_asym_sel = algorithms.req_asym_sel;
        self.common.negotiate_info.key_schedule_sel = algorithms.key_schedule_sel;

        self.common.transcript.append(TranscriptScope::Vca, &request_bytes)?;
        self.common.transcript.append(TranscriptScope::Vca, &raw_response)?;
        self.common.runtime_info.connection_state = SpdmConnectionState::Negotiated;
        Ok(())
    }
}
