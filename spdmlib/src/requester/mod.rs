// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The Requester role (spec §4.7): one `send_receive_*` method per request
//! code, each building its request, round-tripping it through the wire,
//! and folding the response (or ERROR) into `SpdmContext`. One file per
//! message, mirroring `responder/`.

mod algorithms_req;
mod capabilities_req;
mod certificate_req;
mod challenge_req;
mod digests_req;
mod end_session_req;
mod error_handling;
mod finish_req;
mod heartbeat_req;
mod key_exchange_req;
mod key_update_req;
mod measurements_req;
mod psk_exchange_req;
mod psk_finish_req;
mod version_req;

pub use algorithms_req::*;
pub use capabilities_req::*;
pub use certificate_req::*;
pub use challenge_req::*;
pub use digests_req::*;
pub use end_session_req::*;
pub use finish_req::*;
pub use heartbeat_req::*;
pub use key_exchange_req::*;
pub use key_update_req::*;
pub use measurements_req::*;
pub use psk_exchange_req::*;
pub use psk_finish_req::*;
pub use version_req::*;

use codec::{Reader, Writer};

use crate::common::spdm_codec::SpdmCodec;
use crate::common::{SpdmConfigInfo, SpdmContext, SpdmDeviceIo, SpdmProvisionInfo, SpdmRole, SpdmTransportEncap};
use crate::config::MAX_SPDM_TRANSPORT_SIZE;
use crate::crypto::CryptoProvider;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::*;

/// Owns the exclusive `SpdmContext` a Requester endpoint drives a peer
/// through (spec §5: one request in flight at a time).
pub struct RequesterContext<'a> {
    pub common: SpdmContext<'a>,
}

impl<'a> RequesterContext<'a> {
    pub fn new(
        device_io: &'a mut dyn SpdmDeviceIo,
        transport_encap: &'a mut dyn SpdmTransportEncap,
        crypto: &'a dyn CryptoProvider,
        config_info: SpdmConfigInfo,
        provision_info: SpdmProvisionInfo,
    ) -> Self {
        RequesterContext {
            common: SpdmContext::new(
                SpdmRole::Requester,
                device_io,
                transport_encap,
                crypto,
                config_info,
                provision_info,
            ),
        }
    }

    pub(crate) fn encode(&mut self, payload: SpdmMessagePayload, code: SpdmRequestResponseCode) -> Vec<u8> {
        let message = SpdmMessage {
            header: SpdmMessageHeader {
                version: self.common.negotiate_info.spdm_version_sel,
                request_response_code: code,
            },
            payload,
        };
        let mut buf = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let mut writer = Writer::init(&mut buf);
        message.spdm_encode(&mut self.common, &mut writer);
        let used = writer.used();
        buf[..used].to_vec()
    }

    pub(crate) fn send_message(&mut self, spdm_buffer: &[u8], secured: bool) -> SpdmResult<()> {
        let mut transport_buffer = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let used = self.common.transport_encap.encap(spdm_buffer, &mut transport_buffer, secured)?;
        self.common.device_io.send(&transport_buffer[..used])
    }

    pub(crate) fn receive_message(&mut self, spdm_buffer: &mut [u8]) -> SpdmResult<usize> {
        let mut transport_buffer = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let transport_used = self.common.device_io.receive(&mut transport_buffer, 0)?;
        let (spdm_used, secured) = self
            .common
            .transport_encap
            .decap(&transport_buffer[..transport_used], spdm_buffer)?;
        if secured {
            return spdm_result_err!(InvalidRequest);
        }
        Ok(spdm_used)
    }

    /// Sends one unsecured request and returns the raw response bytes
    /// alongside its decoded `SpdmMessage`, translating an ERROR response
    /// into an `Err` via [`error_handling::map_error_response`].
    pub(crate) fn send_receive(&mut self, request_bytes: &[u8]) -> SpdmResult<(Vec<u8>, SpdmMessage)> {
        self.send_message(request_bytes, false)?;

        let mut receive_buffer = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let used = self.receive_message(&mut receive_buffer)?;
        let raw_response = receive_buffer[..used].to_vec();

        let mut reader = Reader::init(&raw_response);
        let response = SpdmMessage::spdm_read(&mut self.common, &mut reader).ok_or_else(|| crate::spdm_err!(InvalidRequest))?;

        if let SpdmMessagePayload::SpdmErrorResponse(ref error) = response.payload {
            return Err(error_handling::map_error_response(error));
        }

        Ok((raw_response, response))
    }

    pub(crate) fn send_secured_message(&mut self, session_id: u32, spdm_buffer: &[u8]) -> SpdmResult<()> {
        let mut random = vec![0u8; self.common.transport_encap.get_max_random_count() as usize];
        self.common.crypto.random_bytes(&mut random)?;
        let record = {
            let session = self
                .common
                .session
                .iter_mut()
                .flatten()
                .find(|s| s.session_id == session_id)
                .ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
            crate::secured_record::encode_secured_message(
                session,
                crate::session::SpdmSessionDirection::Request,
                self.common.transport_encap,
                self.common.crypto,
                spdm_buffer,
                &random,
            )?
        };
        self.send_message(&record, true)
    }

    pub(crate) fn receive_secured_message(&mut self, session_id: u32) -> SpdmResult<Vec<u8>> {
        let mut transport_buffer = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let transport_used = self.common.device_io.receive(&mut transport_buffer, 0)?;
        let mut spdm_buffer = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let (spdm_used, secured) = self
            .common
            .transport_encap
            .decap(&transport_buffer[..transport_used], &mut spdm_buffer)?;
        if !secured {
            return spdm_result_err!(InvalidRequest);
        }
        let session = self
            .common
            .session
            .iter_mut()
            .flatten()
            .find(|s| s.session_id == session_id)
            .ok_or_else(|| crate::spdm_err!(InvalidRequest))?;
        crate::secured_record::decode_secured_message(
            session,
            crate::session::SpdmSessionDirection::Response,
            self.common.transport_encap,
            self.common.crypto,
            &spdm_buffer[..spdm_used],
        )
    }

    /// Sends an application payload over an established session's secured
    /// record layer (spec §6 External Interfaces). Thin public alias over
    /// `send_secured_message`, which every session-scoped request (FINISH,
    /// HEARTBEAT, KEY_UPDATE, END_SESSION) already rides on internally.
    pub fn send_secured(&mut self, session_id: u32, app_data: &[u8]) -> SpdmResult<()> {
        self.send_secured_message(session_id, app_data)
    }

    /// Receives and decrypts one application payload over an established
    /// session's secured record layer (spec §6 External Interfaces).
    pub fn recv_secured(&mut self, session_id: u32) -> SpdmResult<Vec<u8>> {
        self.receive_secured_message(session_id)
    }
}
