// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The Transcript Manager (spec §4.4): up to three endpoint-scoped running
//! digests (VCA, M1M2, L1L2) plus the per-session handshake/data transcript
//! owned by `session::SpdmSession`. Each scope accumulates the exact wire
//! bytes of every covered PDU in transmission order and is hashed on demand
//! at the prescribed snapshot points — never incrementally, so the same
//! buffer can be re-hashed for both TH1 and TH2 without re-deriving state.

use crate::common::algo::{SpdmBaseHashAlgo, SpdmDigestStruct};
use crate::crypto::CryptoProvider;
use crate::error::SpdmResult;
use crate::spdm_result_err;

/// Bound large enough to hold a full negotiation-through-measurement
/// transcript (algorithm negotiation PDUs + a full certificate chain +
/// challenge/measurement exchanges) without reallocating.
pub const MAX_MANAGED_BUFFER_SIZE: usize = 0x4000;

/// A fixed-capacity append-only byte buffer, the unit the transcript
/// manager and each session's handshake transcript are built from.
#[derive(Clone)]
pub struct ManagedBuffer {
    data: Vec<u8>,
}

impl Default for ManagedBuffer {
    fn default() -> Self {
        ManagedBuffer {
            data: Vec::with_capacity(256),
        }
    }
}

impl ManagedBuffer {
    pub fn append_message(&mut self, data: &[u8]) -> Option<()> {
        if self.data.len() + data.len() > MAX_MANAGED_BUFFER_SIZE {
            return None;
        }
        self.data.extend_from_slice(data);
        Some(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn reset(&mut self) {
        self.data.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptScope {
    /// Version + Capabilities + Algorithms negotiation.
    Vca,
    /// Mutual-authentication transcript (GET_DIGESTS..CHALLENGE_AUTH).
    M1M2,
    /// Measurement transcript (GET_MEASUREMENTS/MEASUREMENTS pairs).
    L1L2,
}

#[derive(Default)]
pub struct TranscriptManager {
    vca: ManagedBuffer,
    m1m2: ManagedBuffer,
    l1l2: ManagedBuffer,
}

impl TranscriptManager {
    pub fn append(&mut self, scope: TranscriptScope, bytes: &[u8]) -> SpdmResult<()> {
        let buf = self.buffer_mut(scope);
        buf.append_message(bytes).ok_or_else(|| crate::spdm_err!(InternalError))
    }

    pub fn snapshot(
        &self,
        scope: TranscriptScope,
        crypto: &dyn CryptoProvider,
        hash_algo: SpdmBaseHashAlgo,
    ) -> SpdmResult<SpdmDigestStruct> {
        let buf = self.buffer(scope);
        crypto.hash_all(hash_algo, buf.as_slice())
    }

    pub fn reset(&mut self, scope: TranscriptScope) {
        self.buffer_mut(scope).reset();
    }

    pub fn reset_all(&mut self) {
        self.vca.reset();
        self.m1m2.reset();
        self.l1l2.reset();
    }

    pub fn buffer(&self, scope: TranscriptScope) -> &ManagedBuffer {
        match scope {
            TranscriptScope::Vca => &self.vca,
            TranscriptScope::M1M2 => &self.m1m2,
            TranscriptScope::L1L2 => &self.l1l2,
        }
    }

    fn buffer_mut(&mut self, scope: TranscriptScope) -> &mut ManagedBuffer {
        match scope {
            TranscriptScope::Vca => &mut self.vca,
            TranscriptScope::M1M2 => &mut self.m1m2,
            TranscriptScope::L1L2 => &mut self.l1l2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ring_impl::RingCryptoProvider;

    #[test]
    fn test_snapshot_determinism() {
        let crypto = RingCryptoProvider::default();
        let mut a = TranscriptManager::default();
        let mut b = TranscriptManager::default();
        a.append(TranscriptScope::Vca, b"hello").unwrap();
        b.append(TranscriptScope::Vca, b"hello").unwrap();
        let sa = a
            .snapshot(TranscriptScope::Vca, &crypto, SpdmBaseHashAlgo::TPM_ALG_SHA_384)
            .unwrap();
        let sb = b
            .snapshot(TranscriptScope::Vca, &crypto, SpdmBaseHashAlgo::TPM_ALG_SHA_384)
            .unwrap();
        assert_eq!(sa.as_ref(), sb.as_ref());
    }

    #[test]
    fn test_mutation_changes_snapshot() {
        let crypto = RingCryptoProvider::default();
        let mut a = TranscriptManager::default();
        a.append(TranscriptScope::M1M2, b"original").unwrap();
        let before = a
            .snapshot(TranscriptScope::M1M2, &crypto, SpdmBaseHashAlgo::TPM_ALG_SHA_256)
            .unwrap();

        let mut b = TranscriptManager::default();
        b.append(TranscriptScope::M1M2, b"0riginal").unwrap();
        let after = b
            .snapshot(TranscriptScope::M1M2, &crypto, SpdmBaseHashAlgo::TPM_ALG_SHA_256)
            .unwrap();
        assert_ne!(before.as_ref(), after.as_ref());
    }
}
