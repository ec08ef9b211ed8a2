// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The Endpoint Context (spec §3): negotiated state, provisioned material,
//! the transcript manager, and the session table. `RequesterContext` and
//! `ResponderContext` (in `crate::requester`/`crate::responder`) each own an
//! exclusive `SpdmContext`, which is what makes "one message in flight per
//! endpoint" (spec §5) a property the type system enforces rather than a
//! runtime lock.

pub mod algo;
pub mod opaque;
pub mod spdm_codec;
pub mod transcript;

pub use crate::session;

use crate::common::algo::*;
use crate::config::*;
use crate::crypto::CryptoProvider;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::session::SpdmSession;
use transcript::{ManagedBuffer, TranscriptManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmRole {
    Requester,
    Responder,
}

/// The connection state machine (spec §4.7). `NotStarted` is the initial
/// state; transitions only move forward except back to `NotStarted` on a
/// requester resynch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpdmConnectionState {
    NotStarted,
    AfterVersion,
    AfterCapabilities,
    Negotiated,
    AfterDigests,
    AfterCertificate,
    Authenticated,
    AfterMeasurements,
}

/// The responder's response-state mini-machine, checked before connection
/// state on every handler (spec §4.7, §7): a request while not `Normal`
/// never advances connection or session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmResponseState {
    Normal,
    Busy,
    NotReady,
    NeedResync,
}

/// What the local endpoint advertises/accepts — the inputs to negotiation.
pub struct SpdmConfigInfo {
    pub spdm_version: Vec<SpdmVersion>,
    pub req_capabilities: SpdmRequestCapabilityFlags,
    pub rsp_capabilities: SpdmResponseCapabilityFlags,
    pub req_ct_exponent: u8,
    pub rsp_ct_exponent: u8,
    pub measurement_specification: SpdmMeasurementSpecification,
    pub measurement_hash_algo: SpdmMeasurementHashAlgo,
    pub base_hash_algo: SpdmBaseHashAlgo,
    pub base_asym_algo: SpdmBaseAsymAlgo,
    pub dhe_algo: SpdmDheAlgo,
    pub aead_algo: SpdmAeadAlgo,
    pub req_asym_algo: SpdmReqAsymAlgo,
    pub key_schedule_algo: SpdmKeyScheduleAlgo,
    pub runtime_content_change_support: bool,
    pub max_spdm_msg_size: u32,
}

impl Default for SpdmConfigInfo {
    fn default() -> Self {
        SpdmConfigInfo {
            spdm_version: vec![SpdmVersion::SpdmVersion10, SpdmVersion::SpdmVersion11],
            req_capabilities: SpdmRequestCapabilityFlags::empty(),
            rsp_capabilities: SpdmResponseCapabilityFlags::empty(),
            req_ct_exponent: 0,
            rsp_ct_exponent: 0,
            measurement_specification: SpdmMeasurementSpecification::DMTF,
            measurement_hash_algo: SpdmMeasurementHashAlgo::TPM_ALG_SHA_384,
            base_hash_algo: SpdmBaseHashAlgo::TPM_ALG_SHA_384,
            base_asym_algo: SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384,
            dhe_algo: SpdmDheAlgo::SECP_384_R1,
            aead_algo: SpdmAeadAlgo::AES_256_GCM,
            req_asym_algo: SpdmReqAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384,
            key_schedule_algo: SpdmKeyScheduleAlgo::SPDM_KEY_SCHEDULE,
            runtime_content_change_support: false,
            max_spdm_msg_size: MAX_SPDM_MSG_SIZE as u32,
        }
    }
}

/// The outcome of negotiation — exactly one algorithm per category (spec
/// §3 "Negotiated Algorithm Suite").
#[derive(Default)]
pub struct SpdmNegotiateInfo {
    pub spdm_version_sel: SpdmVersion,
    pub req_ct_exponent_sel: u8,
    pub req_capabilities_sel: SpdmRequestCapabilityFlags,
    pub rsp_ct_exponent_sel: u8,
    pub rsp_capabilities_sel: SpdmResponseCapabilityFlags,
    pub measurement_specification_sel: SpdmMeasurementSpecification,
    pub measurement_hash_sel: SpdmMeasurementHashAlgo,
    pub base_hash_sel: SpdmBaseHashAlgo,
    pub base_asym_sel: SpdmBaseAsymAlgo,
    pub dhe_sel: SpdmDheAlgo,
    pub aead_sel: SpdmAeadAlgo,
    pub req_asym_sel: SpdmReqAsymAlgo,
    pub key_schedule_sel: SpdmKeyScheduleAlgo,
}

/// Locally-provisioned material: certificate chain slots and PSKs.
#[derive(Default)]
pub struct SpdmProvisionInfo {
    pub my_cert_chain: [Option<Vec<u8>>; MAX_SPDM_CERT_CHAIN_SLOT_COUNT],
    pub my_private_key: Option<Vec<u8>>,
    pub psk_hint: Option<Vec<u8>>,
    pub psk: Option<Vec<u8>>,
}

/// What we have learned about the peer.
#[derive(Default)]
pub struct SpdmPeerInfo {
    pub peer_cert_chain: Option<Vec<u8>>,
    pub peer_root_cert_digest: Vec<SpdmDigestStruct>,
}

pub struct SpdmRuntimeInfo {
    pub connection_state: SpdmConnectionState,
    pub response_state: SpdmResponseState,
    pub need_measurement_signature: bool,
    pub last_request_session_id_valid: bool,
    pub last_request_session_id: u32,
    pub message_count_in_measurement: u8,
}

impl Default for SpdmRuntimeInfo {
    fn default() -> Self {
        SpdmRuntimeInfo {
            connection_state: SpdmConnectionState::NotStarted,
            response_state: SpdmResponseState::Normal,
            need_measurement_signature: false,
            last_request_session_id_valid: false,
            last_request_session_id: 0,
            message_count_in_measurement: 0,
        }
    }
}

/// Byte-framed transport the core sends/receives opaque buffers over
/// (spec §6, component C2). Never implemented by the core itself — hosts
/// supply MCTP, PCI DOE, or (in tests) a loopback binding.
pub trait SpdmDeviceIo {
    fn send(&mut self, buf: &[u8]) -> SpdmResult<()>;
    fn receive(&mut self, buf: &mut [u8], timeout_us: usize) -> SpdmResult<usize>;
}

/// Wraps/unwraps SPDM messages in a transport's own framing and fixes the
/// sequence-number width used by the secured record layer.
pub trait SpdmTransportEncap {
    fn encap(
        &mut self,
        spdm_buffer: &[u8],
        transport_buffer: &mut [u8],
        secured_message: bool,
    ) -> SpdmResult<usize>;

    fn decap(&mut self, transport_buffer: &[u8], spdm_buffer: &mut [u8]) -> SpdmResult<(usize, bool)>;

    fn get_sequence_number_count(&mut self) -> u8;
    fn get_max_random_count(&mut self) -> u16;
}

/// The Endpoint Context.
pub struct SpdmContext<'a> {
    pub role: SpdmRole,
    pub device_io: &'a mut dyn SpdmDeviceIo,
    pub transport_encap: &'a mut dyn SpdmTransportEncap,
    pub crypto: &'a dyn CryptoProvider,

    pub config_info: SpdmConfigInfo,
    pub negotiate_info: SpdmNegotiateInfo,
    pub provision_info: SpdmProvisionInfo,
    pub peer_info: SpdmPeerInfo,
    pub runtime_info: SpdmRuntimeInfo,

    pub transcript: TranscriptManager,
    pub session: [Option<SpdmSession>; MAX_SPDM_SESSION_COUNT],
}

impl<'a> SpdmContext<'a> {
    pub fn new(
        role: SpdmRole,
        device_io: &'a mut dyn SpdmDeviceIo,
        transport_encap: &'a mut dyn SpdmTransportEncap,
        crypto: &'a dyn CryptoProvider,
        config_info: SpdmConfigInfo,
        provision_info: SpdmProvisionInfo,
    ) -> Self {
        SpdmContext {
            role,
            device_io,
            transport_encap,
            crypto,
            config_info,
            negotiate_info: SpdmNegotiateInfo::default(),
            provision_info,
            peer_info: SpdmPeerInfo::default(),
            runtime_info: SpdmRuntimeInfo::default(),
            transcript: TranscriptManager::default(),
            session: Default::default(),
        }
    }

    pub fn reset_runtime_info(&mut self) {
        self.runtime_info = SpdmRuntimeInfo::default();
        self.transcript.reset_all();
    }

    pub fn get_session_via_id(&mut self, session_id: u32) -> Option<&mut SpdmSession> {
        self.session
            .iter_mut()
            .flatten()
            .find(|s| s.session_id == session_id)
    }

    pub fn get_next_free_session_slot(&mut self) -> SpdmResult<usize> {
        self.session
            .iter()
            .position(|s| s.is_none())
            .ok_or_else(|| crate::spdm_err!(InternalError))
    }

    pub fn remove_session(&mut self, session_id: u32) {
        for slot in self.session.iter_mut() {
            if matches!(slot, Some(s) if s.session_id == session_id) {
                *slot = None;
            }
        }
    }

    /// Hashes the concatenation of a session's handshake transcript buffers
    /// under the negotiated base hash, producing the TH snapshot signatures
    /// and finished-MACs are computed over (spec §4.5).
    pub fn session_transcript_hash(
        &self,
        message_k: &ManagedBuffer,
        message_f: Option<&ManagedBuffer>,
    ) -> SpdmResult<SpdmDigestStruct> {
        let mut combined = message_k.as_slice().to_vec();
        if let Some(f) = message_f {
            combined.extend_from_slice(f.as_slice());
        }
        self.crypto.hash_all(self.negotiate_info.base_hash_sel, &combined)
    }

    /// Picks the highest-priority common version (spec §4.7).
    pub fn negotiate_version(&mut self, peer_versions: &[SpdmVersion]) -> SpdmResult<SpdmVersion> {
        self.config_info
            .spdm_version
            .iter()
            .rev()
            .find(|v| peer_versions.contains(v))
            .copied()
            .ok_or_else(|| crate::spdm_err!(VersionMismatch))
    }

    pub fn check_response_state(&self) -> SpdmResult<()> {
        match self.runtime_info.response_state {
            SpdmResponseState::Normal => Ok(()),
            SpdmResponseState::Busy => spdm_result_err!(Busy),
            SpdmResponseState::NotReady => spdm_result_err!(NotReady),
            SpdmResponseState::NeedResync => spdm_result_err!(RequestResynch),
        }
    }
}
