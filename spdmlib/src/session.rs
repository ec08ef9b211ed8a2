// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Session Context (spec §3, §4.5, §4.6): the secrets, AEAD key/IV pairs,
//! and per-direction sequence numbers a secured session carries once
//! KEY_EXCHANGE/PSK_EXCHANGE has run. Secret material is zeroized on drop.

use zeroize::Zeroize;

use crate::common::algo::{SpdmAeadAlgo, SpdmBaseHashAlgo};
use crate::common::transcript::ManagedBuffer;
use crate::config::MAX_SESSION_SEQUENCE_NUMBER;
use crate::crypto::CryptoProvider;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::key_schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmSessionState {
    NotStarted,
    /// KEY_EXCHANGE/PSK_EXCHANGE completed; handshake secrets are live,
    /// waiting on FINISH/PSK_FINISH (or immediately established for a
    /// responder-context-free PSK session).
    Handshaking,
    /// FINISH/PSK_FINISH verified; data secrets are live.
    Established,
}

/// Which side of the wire direction `A -> B` a secret belongs to. SPDM
/// calls these "request direction" (requester -> responder) and "response
/// direction" (responder -> requester) regardless of which endpoint is
/// running this code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmSessionDirection {
    Request,
    Response,
}

#[derive(Default)]
struct DirectionKeys {
    secret: Vec<u8>,
    pending_secret: Option<Vec<u8>>,
    pending_sequence_number: u64,
    key: Vec<u8>,
    iv: Vec<u8>,
    sequence_number: u64,
}

impl DirectionKeys {
    fn set_secret(
        &mut self,
        crypto: &dyn CryptoProvider,
        hash_algo: SpdmBaseHashAlgo,
        aead_algo: SpdmAeadAlgo,
        secret: Vec<u8>,
    ) -> SpdmResult<()> {
        let (key, iv) = key_schedule::derive_aead_key_iv(
            crypto,
            hash_algo,
            &secret,
            aead_algo.get_key_size(),
            aead_algo.get_iv_size(),
        )?;
        self.secret.zeroize();
        self.key.zeroize();
        self.iv.zeroize();
        self.secret = secret;
        self.key = key;
        self.iv = iv;
        self.sequence_number = 0;
        Ok(())
    }

    fn next_sequence_number(&mut self) -> SpdmResult<u64> {
        if self.sequence_number >= MAX_SESSION_SEQUENCE_NUMBER {
            return spdm_result_err!(SecurityViolation);
        }
        let n = self.sequence_number;
        self.sequence_number += 1;
        Ok(n)
    }

    fn next_pending_sequence_number(&mut self) -> SpdmResult<u64> {
        if self.pending_sequence_number >= MAX_SESSION_SEQUENCE_NUMBER {
            return spdm_result_err!(SecurityViolation);
        }
        let n = self.pending_sequence_number;
        self.pending_sequence_number += 1;
        Ok(n)
    }
}

impl Drop for DirectionKeys {
    fn drop(&mut self) {
        self.secret.zeroize();
        self.key.zeroize();
        self.iv.zeroize();
        if let Some(pending) = self.pending_secret.as_mut() {
            pending.zeroize();
        }
    }
}

/// A negotiated, keyed session. Lives in `SpdmContext::session` for the
/// lifetime of the secured channel.
pub struct SpdmSession {
    pub session_id: u32,
    pub use_psk: bool,
    pub mutual_auth_requested: bool,
    pub state: SpdmSessionState,

    base_hash_algo: SpdmBaseHashAlgo,
    aead_algo: SpdmAeadAlgo,

    handshake_secret: Vec<u8>,
    master_secret: Vec<u8>,

    request: DirectionKeys,
    response: DirectionKeys,

    /// KEY_EXCHANGE/KEY_EXCHANGE_RSP or PSK_EXCHANGE/PSK_EXCHANGE_RSP.
    pub message_k: ManagedBuffer,
    /// FINISH/FINISH_RSP or PSK_FINISH/PSK_FINISH_RSP.
    pub message_f: ManagedBuffer,
}

impl SpdmSession {
    pub fn new(session_id: u32, use_psk: bool, base_hash_algo: SpdmBaseHashAlgo, aead_algo: SpdmAeadAlgo) -> Self {
        SpdmSession {
            session_id,
            use_psk,
            mutual_auth_requested: false,
            state: SpdmSessionState::NotStarted,
            base_hash_algo,
            aead_algo,
            handshake_secret: Vec::new(),
            master_secret: Vec::new(),
            request: DirectionKeys::default(),
            response: DirectionKeys::default(),
            message_k: ManagedBuffer::default(),
            message_f: ManagedBuffer::default(),
        }
    }

    /// Derives the handshake secret and the two direction handshake
    /// key/IV pairs from a freshly-computed DHE shared secret and the
    /// TH1 snapshot (spec §4.5). `dhe_secret` is consumed and zeroized.
    pub fn generate_handshake_secret(
        &mut self,
        crypto: &dyn CryptoProvider,
        mut dhe_secret: Vec<u8>,
        th1_hash: &[u8],
    ) -> SpdmResult<()> {
        self.handshake_secret = key_schedule::derive_handshake_secret(crypto, self.base_hash_algo, &dhe_secret)?;
        dhe_secret.zeroize();
        self.activate_handshake_secrets(crypto, th1_hash)
    }

    /// As above, but rooted in the provisioned PSK (spec §4.3.2).
    pub fn generate_handshake_secret_psk(
        &mut self,
        crypto: &dyn CryptoProvider,
        psk: &[u8],
        th1_hash: &[u8],
    ) -> SpdmResult<()> {
        self.handshake_secret = key_schedule::derive_handshake_secret_psk(crypto, self.base_hash_algo, psk)?;
        self.activate_handshake_secrets(crypto, th1_hash)
    }

    fn activate_handshake_secrets(&mut self, crypto: &dyn CryptoProvider, th1_hash: &[u8]) -> SpdmResult<()> {
        let (req_secret, rsp_secret) =
            key_schedule::derive_session_handshake_secrets(crypto, self.base_hash_algo, &self.handshake_secret, th1_hash)?;
        self.request.set_secret(crypto, self.base_hash_algo, self.aead_algo, req_secret)?;
        self.response.set_secret(crypto, self.base_hash_algo, self.aead_algo, rsp_secret)?;
        self.state = SpdmSessionState::Handshaking;
        Ok(())
    }

    /// Derives the master secret and the two direction data key/IV pairs
    /// from the TH2 snapshot, taken after FINISH/PSK_FINISH (spec §4.5).
    pub fn generate_data_secret(&mut self, crypto: &dyn CryptoProvider, th2_hash: &[u8]) -> SpdmResult<()> {
        self.master_secret = key_schedule::derive_master_secret(crypto, self.base_hash_algo, &self.handshake_secret)?;
        let (req_secret, rsp_secret) =
            key_schedule::derive_session_data_secrets(crypto, self.base_hash_algo, &self.master_secret, th2_hash)?;
        self.request.set_secret(crypto, self.base_hash_algo, self.aead_algo, req_secret)?;
        self.response.set_secret(crypto, self.base_hash_algo, self.aead_algo, rsp_secret)?;
        self.state = SpdmSessionState::Established;
        Ok(())
    }

    fn direction_keys(&self, direction: SpdmSessionDirection) -> &DirectionKeys {
        match direction {
            SpdmSessionDirection::Request => &self.request,
            SpdmSessionDirection::Response => &self.response,
        }
    }

    fn direction_keys_mut(&mut self, direction: SpdmSessionDirection) -> &mut DirectionKeys {
        match direction {
            SpdmSessionDirection::Request => &mut self.request,
            SpdmSessionDirection::Response => &mut self.response,
        }
    }

    pub fn aead_key_iv(&self, direction: SpdmSessionDirection) -> (&[u8], &[u8]) {
        let d = self.direction_keys(direction);
        (&d.key, &d.iv)
    }

    /// Derives, without activating, the AEAD key/IV a pending KEY_UPDATE
    /// secret for `direction` would use. `None` if no update is staged.
    pub fn pending_aead_key_iv(
        &self,
        direction: SpdmSessionDirection,
        crypto: &dyn CryptoProvider,
    ) -> SpdmResult<Option<(Vec<u8>, Vec<u8>)>> {
        let d = self.direction_keys(direction);
        match d.pending_secret.as_ref() {
            Some(secret) => {
                let (key, iv) = key_schedule::derive_aead_key_iv(
                    crypto,
                    self.base_hash_algo,
                    secret,
                    self.aead_algo.get_key_size(),
                    self.aead_algo.get_iv_size(),
                )?;
                Ok(Some((key, iv)))
            }
            None => Ok(None),
        }
    }

    pub fn aead_algo(&self) -> SpdmAeadAlgo {
        self.aead_algo
    }

    pub fn next_sequence_number(&mut self, direction: SpdmSessionDirection) -> SpdmResult<u64> {
        self.direction_keys_mut(direction).next_sequence_number()
    }

    /// The sequence number `direction`'s *current* secret expects next,
    /// without consuming it. Call [`next_sequence_number`](Self::next_sequence_number)
    /// to actually advance once a record decrypts successfully under it.
    pub fn peek_sequence_number(&self, direction: SpdmSessionDirection) -> u64 {
        self.direction_keys(direction).sequence_number
    }

    /// The sequence number the *pending* KEY_UPDATE secret for `direction`
    /// expects next, or `None` if no update is staged. A freshly staged
    /// secret always starts its own count at zero, independent of the
    /// still-current direction counter (spec §4.6/§4.8 point 4).
    pub fn peek_pending_sequence_number(&self, direction: SpdmSessionDirection) -> Option<u64> {
        let d = self.direction_keys(direction);
        d.pending_secret.as_ref().map(|_| d.pending_sequence_number)
    }

    /// Consumes the next pending-secret sequence number once a record
    /// decrypts successfully under it.
    pub fn advance_pending_sequence_number(&mut self, direction: SpdmSessionDirection) -> SpdmResult<u64> {
        self.direction_keys_mut(direction).next_pending_sequence_number()
    }

    pub fn generate_finished_key(&self, crypto: &dyn CryptoProvider, direction: SpdmSessionDirection) -> SpdmResult<Vec<u8>> {
        key_schedule::derive_finished_key(crypto, self.base_hash_algo, &self.direction_keys(direction).secret)
    }

    /// KEY_UPDATE request (always requester -> responder, spec §4.6.1).
    /// Ground truth is the original implementation's
    /// `SpdmGetResponseKeyUpdate`: both `UpdateKey` and `UpdateAllKeys` roll
    /// the request-direction secret and stage it as pending; `UpdateAllKeys`
    /// additionally rolls the response-direction secret and activates it
    /// immediately, since the responder's own outgoing key needs no
    /// peer-confirmation round trip the way the request direction does via
    /// `VerifyNewKey`. Staging the request-direction secret resets its
    /// pending sequence count to zero.
    pub fn start_key_update(&mut self, crypto: &dyn CryptoProvider, update_all: bool) -> SpdmResult<()> {
        let request_pending = key_schedule::update_secret(crypto, self.base_hash_algo, &self.request.secret)?;
        self.request.pending_secret = Some(request_pending);
        self.request.pending_sequence_number = 0;
        if update_all {
            let response_pending = key_schedule::update_secret(crypto, self.base_hash_algo, &self.response.secret)?;
            self.response.set_secret(crypto, self.base_hash_algo, self.aead_algo, response_pending)?;
        }
        Ok(())
    }

    /// Swaps the pending request-direction secret in and rederives its
    /// key/IV, resetting its sequence number to zero (spec §4.6.1
    /// VERIFY_NEW_KEY). A no-op if no update is pending; the response
    /// direction is never pending here since `UpdateAllKeys` activates it
    /// immediately rather than staging it.
    pub fn activate_pending_keys(&mut self, crypto: &dyn CryptoProvider) -> SpdmResult<()> {
        if let Some(pending) = self.request.pending_secret.take() {
            self.request.set_secret(crypto, self.base_hash_algo, self.aead_algo, pending)?;
        }
        Ok(())
    }

    pub fn has_pending_key_update(&self) -> bool {
        self.request.pending_secret.is_some()
    }
}

impl Drop for SpdmSession {
    fn drop(&mut self) {
        self.handshake_secret.zeroize();
        self.master_secret.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ring_impl::RingCryptoProvider;

    fn new_session() -> SpdmSession {
        SpdmSession::new(
            0x01,
            false,
            SpdmBaseHashAlgo::TPM_ALG_SHA_256,
            SpdmAeadAlgo::AES_128_GCM,
        )
    }

    #[test]
    fn test_case0_handshake_then_data_secrets_differ() {
        let crypto = RingCryptoProvider::default();
        let mut session = new_session();
        session
            .generate_handshake_secret(&crypto, vec![0x55u8; 32], b"th1")
            .unwrap();
        let (handshake_key, _) = session.aead_key_iv(SpdmSessionDirection::Request);
        let handshake_key = handshake_key.to_vec();

        session.generate_data_secret(&crypto, b"th2").unwrap();
        let (data_key, _) = session.aead_key_iv(SpdmSessionDirection::Request);
        assert_ne!(handshake_key, data_key);
        assert_eq!(session.state, SpdmSessionState::Established);
    }

    #[test]
    fn test_case0_key_update_rolls_only_requested_directions() {
        let crypto = RingCryptoProvider::default();
        let mut session = new_session();
        session.generate_handshake_secret(&crypto, vec![0x77u8; 32], b"th1").unwrap();
        session.generate_data_secret(&crypto, b"th2").unwrap();

        let (req_before, _) = session.aead_key_iv(SpdmSessionDirection::Request);
        let req_before = req_before.to_vec();
        let (rsp_before, _) = session.aead_key_iv(SpdmSessionDirection::Response);
        let rsp_before = rsp_before.to_vec();

        session.start_key_update(&crypto, false).unwrap();
        assert!(session.has_pending_key_update());
        session.activate_pending_keys(&crypto).unwrap();

        let (req_after, _) = session.aead_key_iv(SpdmSessionDirection::Request);
        let (rsp_after, _) = session.aead_key_iv(SpdmSessionDirection::Response);
        assert_ne!(req_before, req_after.to_vec(), "UpdateKey must roll the request direction");
        assert_eq!(rsp_before, rsp_after.to_vec(), "UpdateKey must not roll the response direction");
    }

    #[test]
    fn test_case1_update_all_keys_activates_response_immediately() {
        let crypto = RingCryptoProvider::default();
        let mut session = new_session();
        session.generate_handshake_secret(&crypto, vec![0x99u8; 32], b"th1").unwrap();
        session.generate_data_secret(&crypto, b"th2").unwrap();

        let (rsp_before, _) = session.aead_key_iv(SpdmSessionDirection::Response);
        let rsp_before = rsp_before.to_vec();

        session.start_key_update(&crypto, true).unwrap();
        // The response direction rolls and activates in the same step, so
        // only the request direction is left pending.
        assert!(session.has_pending_key_update());
        let (rsp_after, _) = session.aead_key_iv(SpdmSessionDirection::Response);
        assert_ne!(rsp_before, rsp_after.to_vec(), "UpdateAllKeys must activate the response direction immediately");

        session.activate_pending_keys(&crypto).unwrap();
        assert!(!session.has_pending_key_update());
    }

    #[test]
    fn test_case0_sequence_numbers_are_independent_and_monotonic() {
        let crypto = RingCryptoProvider::default();
        let mut session = new_session();
        session.generate_handshake_secret(&crypto, vec![0x11u8; 32], b"th1").unwrap();
        session.generate_data_secret(&crypto, b"th2").unwrap();

        assert_eq!(session.next_sequence_number(SpdmSessionDirection::Request).unwrap(), 0);
        assert_eq!(session.next_sequence_number(SpdmSessionDirection::Request).unwrap(), 1);
        assert_eq!(session.next_sequence_number(SpdmSessionDirection::Response).unwrap(), 0);
    }
}
