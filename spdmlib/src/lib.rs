// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! An implementation of the DMTF Security Protocol and Data Model (SPDM,
//! DSP0274) device-attestation handshake and the Secured Messaging (DSP0277)
//! record layer built on top of it.
//!
//! `common` holds the endpoint context both roles share; `requester` and
//! `responder` each drive that context through one request/response pair at
//! a time; `session` and `secured_record` carry a negotiated session through
//! its encrypted lifetime; `crypto` is the pluggable primitive boundary
//! (`ring` by default, behind the `spdm-ring` feature).

#[macro_use]
extern crate bitflags;

pub mod common;
pub mod config;
pub mod crypto;
pub mod error;
pub mod key_schedule;
pub mod message;
pub mod requester;
pub mod responder;
pub mod secured_record;
pub mod session;
pub mod time;

#[cfg(any(test, feature = "std"))]
pub mod testlib;

use common::{SpdmConfigInfo, SpdmContext, SpdmDeviceIo, SpdmProvisionInfo, SpdmRole, SpdmTransportEncap};
use crypto::CryptoProvider;
use error::SpdmResult;
use message::{SpdmEndSessionRequestAttributes, SpdmKeyUpdateOperation, SpdmMeasurementSummaryHashType};
use requester::RequesterContext;
use responder::ResponderContext;

/// One side of a negotiated connection, wrapping either role's context
/// behind a single entry point so callers don't match on `SpdmRole`
/// themselves (spec §6). Built via [`Endpoint::new_requester`] or
/// [`Endpoint::new_responder`].
pub enum Endpoint<'a> {
    Requester(RequesterContext<'a>),
    Responder(ResponderContext<'a>),
}

impl<'a> Endpoint<'a> {
    pub fn new_requester(
        device_io: &'a mut dyn SpdmDeviceIo,
        transport_encap: &'a mut dyn SpdmTransportEncap,
        crypto: &'a dyn CryptoProvider,
        config_info: SpdmConfigInfo,
        provision_info: SpdmProvisionInfo,
    ) -> Self {
        Endpoint::Requester(RequesterContext::new(device_io, transport_encap, crypto, config_info, provision_info))
    }

    pub fn new_responder(
        device_io: &'a mut dyn SpdmDeviceIo,
        transport_encap: &'a mut dyn SpdmTransportEncap,
        crypto: &'a dyn CryptoProvider,
        config_info: SpdmConfigInfo,
        provision_info: SpdmProvisionInfo,
    ) -> Self {
        Endpoint::Responder(ResponderContext::new(device_io, transport_encap, crypto, config_info, provision_info))
    }

    pub fn role(&self) -> SpdmRole {
        match self {
            Endpoint::Requester(_) => SpdmRole::Requester,
            Endpoint::Responder(_) => SpdmRole::Responder,
        }
    }

    fn as_requester(&mut self) -> SpdmResult<&mut RequesterContext<'a>> {
        match self {
            Endpoint::Requester(ctx) => Ok(ctx),
            Endpoint::Responder(_) => Err(crate::spdm_err!(UnexpectedRequest)),
        }
    }

    /// Drives the full connection-establishment sequence (spec §4.7):
    /// GET_VERSION, GET_CAPABILITIES, NEGOTIATE_ALGORITHMS, GET_DIGESTS,
    /// GET_CERTIFICATE for `slot_id`, then CHALLENGE. Requester-only.
    pub fn connect(&mut self, slot_id: u8) -> SpdmResult<()> {
        let ctx = self.as_requester()?;
        ctx.send_receive_spdm_version()?;
        ctx.send_receive_spdm_capabilities()?;
        ctx.send_receive_spdm_algorithm()?;
        ctx.send_receive_spdm_digests()?;
        ctx.send_receive_spdm_certificate(slot_id)?;
        ctx.send_receive_spdm_challenge(slot_id, SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeNone)?;
        Ok(())
    }

    /// Drives KEY_EXCHANGE then FINISH to bring up a secure session over
    /// an already-negotiated, authenticated connection (spec §4.12-4.13).
    /// Returns the session id to address subsequent secured traffic with.
    pub fn start_session(&mut self, slot_id: u8) -> SpdmResult<u32> {
        let ctx = self.as_requester()?;
        let session_id = ctx.send_receive_spdm_key_exchange(slot_id, SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeNone)?;
        ctx.send_receive_spdm_finish(session_id)?;
        Ok(session_id)
    }

    /// Drives PSK_EXCHANGE then PSK_FINISH to bring up a secure session
    /// rooted in a provisioned pre-shared key (spec §4.3.2), skipping
    /// certificate-based authentication entirely.
    pub fn start_psk_session(&mut self, psk_hint: Vec<u8>) -> SpdmResult<u32> {
        let ctx = self.as_requester()?;
        let session_id = ctx.send_receive_spdm_psk_exchange(psk_hint, SpdmMeasurementSummaryHashType::SpdmMeasurementSummaryHashTypeNone)?;
        ctx.send_receive_spdm_psk_finish(session_id)?;
        Ok(session_id)
    }

    pub fn heartbeat(&mut self, session_id: u32) -> SpdmResult<()> {
        self.as_requester()?.send_receive_spdm_heartbeat(session_id)
    }

    pub fn update_key(&mut self, session_id: u32, operation: SpdmKeyUpdateOperation, tag: u8) -> SpdmResult<()> {
        self.as_requester()?.send_receive_spdm_key_update(session_id, operation, tag)
    }

    pub fn end_session(&mut self, session_id: u32, attributes: SpdmEndSessionRequestAttributes) -> SpdmResult<()> {
        self.as_requester()?.send_receive_spdm_end_session(session_id, attributes)
    }

    /// Sends an application payload over an established session (spec §6
    /// External Interfaces). Requester-only; the responder side answers
    /// secured application traffic through [`Endpoint::process_one_request`].
    pub fn send_secured(&mut self, session_id: u32, app_data: &[u8]) -> SpdmResult<()> {
        self.as_requester()?.send_secured(session_id, app_data)
    }

    /// Receives and decrypts one application payload over an established
    /// session (spec §6 External Interfaces). Requester-only.
    pub fn recv_secured(&mut self, session_id: u32) -> SpdmResult<Vec<u8>> {
        self.as_requester()?.recv_secured(session_id)
    }

    /// Receives and answers one unsecured or secured request. Responder-only;
    /// intended to be called in a loop by the hosting application.
    pub fn process_one_request(&mut self) -> SpdmResult<()> {
        match self {
            Endpoint::Responder(ctx) => ctx.process_one_request(),
            Endpoint::Requester(_) => Err(crate::spdm_err!(UnexpectedRequest)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SpdmConnectionState;
    use crate::crypto::ring_impl::RingCryptoProvider;
    use crate::testlib::{DrivingDeviceIo, LoopbackDeviceIo, PassthroughTransportEncap, SharedBuffer};
    use ring::signature::{EcdsaKeyPair, KeyPair};

    fn der_len(out: &mut Vec<u8>, len: usize) {
        if len < 0x80 {
            out.push(len as u8);
        } else {
            let bytes = len.to_be_bytes();
            let significant: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();
            out.push(0x80 | significant.len() as u8);
            out.extend_from_slice(&significant);
        }
    }

    fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        der_len(&mut out, content.len());
        out.extend_from_slice(content);
        out
    }

    /// Same padded-SEQUENCE shape as `cert_operation`'s own test helper,
    /// duplicated rather than exported since it's test-only scaffolding on
    /// both ends and `cert_operation`'s module is private to `crypto::ring_impl`.
    fn self_issued_cert_der(spki_public_key: &[u8]) -> Vec<u8> {
        let empty_seq = der_tlv(0x30, &[]);
        let serial = der_tlv(0x02, &[0x01]);
        let padding = der_tlv(0x04, &[0u8; 220]);
        let bit_string = der_tlv(0x03, &[&[0x00], spki_public_key].concat());
        let spki = der_tlv(0x30, &[empty_seq.clone(), bit_string].concat());
        let tbs = der_tlv(
            0x30,
            &[serial, padding, empty_seq.clone(), empty_seq.clone(), empty_seq, spki].concat(),
        );
        let signature_value = der_tlv(0x03, &[0x00, 0x01, 0x02]);
        der_tlv(0x30, &[tbs, der_tlv(0x30, &[]), signature_value].concat())
    }

    #[test]
    fn test_connect_start_session_and_end_session_over_loopback() {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(
            &ring::signature::ECDSA_P384_SHA384_FIXED_SIGNING,
            &ring::rand::SystemRandom::new(),
        )
        .unwrap();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ring::signature::ECDSA_P384_SHA384_FIXED_SIGNING, pkcs8.as_ref()).unwrap();
        let cert_der = self_issued_cert_der(key_pair.public_key().as_ref());

        let mut responder_provision_info = SpdmProvisionInfo::default();
        responder_provision_info.my_cert_chain[0] = Some(cert_der);
        responder_provision_info.my_private_key = Some(pkcs8.as_ref().to_vec());

        let to_responder = SharedBuffer::new();
        let to_requester = SharedBuffer::new();

        let responder_crypto = RingCryptoProvider::default();
        let mut responder_encap = PassthroughTransportEncap::default();
        let mut responder_device_io = LoopbackDeviceIo::new(to_requester.clone(), to_responder.clone());
        let mut responder = ResponderContext::new(
            &mut responder_device_io,
            &mut responder_encap,
            &responder_crypto,
            SpdmConfigInfo::default(),
            responder_provision_info,
        );

        let requester_crypto = RingCryptoProvider::default();
        let mut requester_encap = PassthroughTransportEncap::default();
        let mut driving_io = DrivingDeviceIo::new(to_responder, to_requester, &mut responder);
        let mut endpoint = Endpoint::new_requester(
            &mut driving_io,
            &mut requester_encap,
            &requester_crypto,
            SpdmConfigInfo::default(),
            SpdmProvisionInfo::default(),
        );

        endpoint.connect(0).unwrap();
        if let Endpoint::Requester(ctx) = &endpoint {
            assert_eq!(ctx.common.runtime_info.connection_state, SpdmConnectionState::Authenticated);
        } else {
            panic!("expected requester endpoint");
        }

        let session_id = endpoint.start_session(0).unwrap();

        // S4: an application payload sent under the established session
        // round-trips through the secured record layer.
        endpoint.send_secured(session_id, b"PING").unwrap();
        let reply = endpoint.recv_secured(session_id).unwrap();
        assert_eq!(reply, b"PING");

        // S5: a full KEY_UPDATE cycle rolls the request-direction data
        // secret and the session keeps working under the new key. This is
        // also the scenario that would have caught a requester/responder
        // data-secret mismatch coming out of FINISH: if the two sides'
        // secrets didn't already agree, the KEY_UPDATE ACK above would
        // never have decrypted.
        endpoint.update_key(session_id, SpdmKeyUpdateOperation::SpdmUpdateSingleKey, 7).unwrap();
        endpoint.update_key(session_id, SpdmKeyUpdateOperation::SpdmVerifyNewKey, 8).unwrap();
        endpoint.send_secured(session_id, b"PONG").unwrap();
        let reply = endpoint.recv_secured(session_id).unwrap();
        assert_eq!(reply, b"PONG");

        endpoint.update_key(session_id, SpdmKeyUpdateOperation::SpdmUpdateAllKeys, 9).unwrap();
        endpoint.update_key(session_id, SpdmKeyUpdateOperation::SpdmVerifyNewKey, 10).unwrap();
        endpoint.send_secured(session_id, b"PANG").unwrap();
        let reply = endpoint.recv_secured(session_id).unwrap();
        assert_eq!(reply, b"PANG");

        endpoint.end_session(session_id, SpdmEndSessionRequestAttributes::empty()).unwrap();
    }
}
