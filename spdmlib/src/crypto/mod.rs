// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The crypto provider capability set (spec §6, component C1). Rather than
//! the teacher's process-wide function-pointer registration
//! (`crypto::asym_sign::register(...)`), this core takes the capability set
//! as a trait object handed to the context at construction time — per the
//! spec's own design note: "No process-wide mutable pointers."

pub mod ring_impl;

use crate::common::algo::{
    SpdmAeadAlgo, SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmDheExchangeStruct,
    SpdmDigestStruct, SpdmSignatureStruct,
};
use crate::error::SpdmResult;

/// An in-progress Diffie-Hellman/ECDH exchange: the local ephemeral secret
/// paired with the public value already sent to the peer, consumed exactly
/// once by `compute_shared_secret`.
pub trait DheExchange {
    fn public_key(&self) -> SpdmDheExchangeStruct;
    fn compute_shared_secret(self: Box<Self>, peer_public: &[u8]) -> SpdmResult<Vec<u8>>;
}

/// Capabilities the core requires from the host (spec §6): digest, HMAC,
/// HKDF, AEAD, sign/verify, DH/ECDH key exchange, X.509 validation, RNG.
pub trait CryptoProvider {
    fn hash_all(&self, algo: SpdmBaseHashAlgo, data: &[u8]) -> SpdmResult<SpdmDigestStruct>;

    fn hmac_all(
        &self,
        algo: SpdmBaseHashAlgo,
        key: &[u8],
        data: &[u8],
    ) -> SpdmResult<SpdmDigestStruct>;

    fn hmac_verify(
        &self,
        algo: SpdmBaseHashAlgo,
        key: &[u8],
        data: &[u8],
        tag: &[u8],
    ) -> SpdmResult<()>;

    /// `HKDF-Extract(salt, ikm)`.
    fn hkdf_extract(
        &self,
        algo: SpdmBaseHashAlgo,
        salt: &[u8],
        ikm: &[u8],
    ) -> SpdmResult<SpdmDigestStruct>;

    /// `HKDF-Expand(prk, info, out_len)`.
    fn hkdf_expand(
        &self,
        algo: SpdmBaseHashAlgo,
        prk: &[u8],
        info: &[u8],
        out_len: usize,
    ) -> SpdmResult<Vec<u8>>;

    fn aead_encrypt(
        &self,
        algo: SpdmAeadAlgo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        plain_text: &[u8],
    ) -> SpdmResult<Vec<u8>>;

    /// Returns plaintext on success; a tag mismatch must map to
    /// `SpdmStatus::DecryptError`, never `InvalidRequest`.
    fn aead_decrypt(
        &self,
        algo: SpdmAeadAlgo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        cipher_text: &[u8],
    ) -> SpdmResult<Vec<u8>>;

    fn asym_verify(
        &self,
        asym_algo: SpdmBaseAsymAlgo,
        hash_algo: SpdmBaseHashAlgo,
        public_cert_der: &[u8],
        message: &[u8],
        signature: &SpdmSignatureStruct,
    ) -> SpdmResult<()>;

    fn asym_sign(
        &self,
        asym_algo: SpdmBaseAsymAlgo,
        hash_algo: SpdmBaseHashAlgo,
        private_key_der: &[u8],
        message: &[u8],
    ) -> SpdmResult<SpdmSignatureStruct>;

    fn dhe_generate(&self, algo: SpdmDheAlgo) -> SpdmResult<Box<dyn DheExchange>>;

    fn cert_from_cert_chain(&self, cert_chain: &[u8], index: isize) -> SpdmResult<(usize, usize)>;

    fn verify_cert_chain(&self, cert_chain: &[u8]) -> SpdmResult<()>;

    fn random_bytes(&self, out: &mut [u8]) -> SpdmResult<()>;
}
