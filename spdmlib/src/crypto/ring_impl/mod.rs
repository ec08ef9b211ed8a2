// Copyright (c) 2021 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The bundled `ring`/`webpki` crypto provider, generalized from the
//! teacher's `crypto::spdm_ring` module to the full algorithm matrix the
//! negotiated-suite enums in `common::algo` can select (see SPEC_FULL.md §6
//! for exactly which registry ids this provider implements).

mod cert_operation;

use ring::{aead, agreement, digest, hmac, rand, signature};

use crate::common::algo::{
    SpdmAeadAlgo, SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmDheExchangeStruct,
    SpdmDigestStruct, SpdmSignatureStruct,
};
use crate::crypto::{CryptoProvider, DheExchange};
use crate::error::SpdmResult;
use crate::spdm_result_err;

fn digest_algorithm(algo: SpdmBaseHashAlgo) -> SpdmResult<&'static digest::Algorithm> {
    match algo {
        SpdmBaseHashAlgo::TPM_ALG_SHA_256 => Ok(&digest::SHA256),
        SpdmBaseHashAlgo::TPM_ALG_SHA_384 => Ok(&digest::SHA384),
        SpdmBaseHashAlgo::TPM_ALG_SHA_512 => Ok(&digest::SHA512),
        _ => spdm_result_err!(UnsupportedRequest),
    }
}

fn hmac_algorithm(algo: SpdmBaseHashAlgo) -> SpdmResult<hmac::Algorithm> {
    match algo {
        SpdmBaseHashAlgo::TPM_ALG_SHA_256 => Ok(hmac::HMAC_SHA256),
        SpdmBaseHashAlgo::TPM_ALG_SHA_384 => Ok(hmac::HMAC_SHA384),
        SpdmBaseHashAlgo::TPM_ALG_SHA_512 => Ok(hmac::HMAC_SHA512),
        _ => spdm_result_err!(UnsupportedRequest),
    }
}

fn aead_algorithm(algo: SpdmAeadAlgo) -> SpdmResult<&'static aead::Algorithm> {
    match algo {
        SpdmAeadAlgo::AES_128_GCM => Ok(&aead::AES_128_GCM),
        SpdmAeadAlgo::AES_256_GCM => Ok(&aead::AES_256_GCM),
        SpdmAeadAlgo::CHACHA20_POLY1305 => Ok(&aead::CHACHA20_POLY1305),
        _ => spdm_result_err!(UnsupportedRequest),
    }
}

/// The production crypto provider: SHA-2 digests, HMAC, HKDF (built from
/// HMAC per RFC 5869), AES-GCM/ChaCha20-Poly1305 AEAD, ECDSA P-256/P-384
/// sign+verify, RSA PKCS#1/PSS verify, ECDHE over P-256/P-384, and
/// `webpki`-backed X.509 chain validation.
#[derive(Default)]
pub struct RingCryptoProvider;

impl CryptoProvider for RingCryptoProvider {
    fn hash_all(&self, algo: SpdmBaseHashAlgo, data: &[u8]) -> SpdmResult<SpdmDigestStruct> {
        let alg = digest_algorithm(algo)?;
        let out = digest::digest(alg, data);
        Ok(SpdmDigestStruct::from_slice(out.as_ref()))
    }

    fn hmac_all(
        &self,
        algo: SpdmBaseHashAlgo,
        key: &[u8],
        data: &[u8],
    ) -> SpdmResult<SpdmDigestStruct> {
        let alg = hmac_algorithm(algo)?;
        let key = hmac::Key::new(alg, key);
        let tag = hmac::sign(&key, data);
        Ok(SpdmDigestStruct::from_slice(tag.as_ref()))
    }

    fn hmac_verify(
        &self,
        algo: SpdmBaseHashAlgo,
        key: &[u8],
        data: &[u8],
        tag: &[u8],
    ) -> SpdmResult<()> {
        let alg = hmac_algorithm(algo)?;
        let key = hmac::Key::new(alg, key);
        hmac::verify(&key, data, tag).map_err(|_| crate::spdm_err!(SecurityViolation))
    }

    fn hkdf_extract(
        &self,
        algo: SpdmBaseHashAlgo,
        salt: &[u8],
        ikm: &[u8],
    ) -> SpdmResult<SpdmDigestStruct> {
        // HKDF-Extract(salt, IKM) = HMAC-Hash(salt, IKM), RFC 5869 §2.2.
        self.hmac_all(algo, salt, ikm)
    }

    fn hkdf_expand(
        &self,
        algo: SpdmBaseHashAlgo,
        prk: &[u8],
        info: &[u8],
        out_len: usize,
    ) -> SpdmResult<Vec<u8>> {
        let alg = hmac_algorithm(algo)?;
        let key = hmac::Key::new(alg, prk);
        let hash_len = algo.get_size() as usize;
        let n = (out_len + hash_len - 1) / hash_len;
        if n > 255 {
            return spdm_result_err!(InvalidRequest);
        }
        let mut okm = Vec::with_capacity(n * hash_len);
        let mut t_prev: Vec<u8> = Vec::new();
        for i in 1..=n {
            let mut ctx_data = Vec::with_capacity(t_prev.len() + info.len() + 1);
            ctx_data.extend_from_slice(&t_prev);
            ctx_data.extend_from_slice(info);
            ctx_data.push(i as u8);
            let t = hmac::sign(&key, &ctx_data);
            t_prev = t.as_ref().to_vec();
            okm.extend_from_slice(t.as_ref());
        }
        okm.truncate(out_len);
        Ok(okm)
    }

    fn aead_encrypt(
        &self,
        algo: SpdmAeadAlgo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        plain_text: &[u8],
    ) -> SpdmResult<Vec<u8>> {
        let alg = aead_algorithm(algo)?;
        let unbound = aead::UnboundKey::new(alg, key).map_err(|_| crate::spdm_err!(InvalidRequest))?;
        let key = aead::LessSafeKey::new(unbound);
        let nonce =
            aead::Nonce::try_assume_unique_for_key(iv).map_err(|_| crate::spdm_err!(InvalidRequest))?;
        let mut in_out = plain_text.to_vec();
        key.seal_in_place_append_tag(nonce, aead::Aad::from(aad), &mut in_out)
            .map_err(|_| crate::spdm_err!(InternalError))?;
        Ok(in_out)
    }

    fn aead_decrypt(
        &self,
        algo: SpdmAeadAlgo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        cipher_text: &[u8],
    ) -> SpdmResult<Vec<u8>> {
        let alg = aead_algorithm(algo)?;
        let unbound = aead::UnboundKey::new(alg, key).map_err(|_| crate::spdm_err!(InvalidRequest))?;
        let key = aead::LessSafeKey::new(unbound);
        let nonce =
            aead::Nonce::try_assume_unique_for_key(iv).map_err(|_| crate::spdm_err!(InvalidRequest))?;
        let mut in_out = cipher_text.to_vec();
        let plain = key
            .open_in_place(nonce, aead::Aad::from(aad), &mut in_out)
            .map_err(|_| crate::spdm_err!(DecryptError))?;
        Ok(plain.to_vec())
    }

    fn asym_verify(
        &self,
        asym_algo: SpdmBaseAsymAlgo,
        _hash_algo: SpdmBaseHashAlgo,
        public_cert_der: &[u8],
        message: &[u8],
        signature: &SpdmSignatureStruct,
    ) -> SpdmResult<()> {
        let alg: &dyn signature::VerificationAlgorithm = match asym_algo {
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256 => &signature::ECDSA_P256_SHA256_FIXED,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384 => &signature::ECDSA_P384_SHA384_FIXED,
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_2048
            | SpdmBaseAsymAlgo::TPM_ALG_RSASSA_3072
            | SpdmBaseAsymAlgo::TPM_ALG_RSASSA_4096 => &signature::RSA_PKCS1_2048_8192_SHA384,
            SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_2048
            | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_3072
            | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_4096 => &signature::RSA_PSS_2048_8192_SHA384,
            _ => return spdm_result_err!(UnsupportedRequest),
        };
        // Callers hold the peer's certificate chain, not a bare public key;
        // pull the leaf certificate's subjectPublicKeyInfo out of it.
        let (start, end) = cert_operation::get_cert_from_cert_chain(public_cert_der, -1)?;
        let public_key = cert_operation::leaf_public_key(&public_cert_der[start..end])?;
        let key = signature::UnparsedPublicKey::new(alg, &public_key);
        key.verify(message, signature.as_ref())
            .map_err(|_| crate::spdm_err!(SecurityViolation))
    }

    fn asym_sign(
        &self,
        asym_algo: SpdmBaseAsymAlgo,
        _hash_algo: SpdmBaseHashAlgo,
        private_key_pkcs8: &[u8],
        message: &[u8],
    ) -> SpdmResult<SpdmSignatureStruct> {
        let rng = rand::SystemRandom::new();
        let alg = match asym_algo {
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256 => {
                &signature::ECDSA_P256_SHA256_FIXED_SIGNING
            }
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384 => {
                &signature::ECDSA_P384_SHA384_FIXED_SIGNING
            }
            _ => return spdm_result_err!(UnsupportedRequest),
        };
        let key_pair = signature::EcdsaKeyPair::from_pkcs8(alg, private_key_pkcs8)
            .map_err(|_| crate::spdm_err!(InvalidRequest))?;
        let sig = key_pair
            .sign(&rng, message)
            .map_err(|_| crate::spdm_err!(InternalError))?;
        Ok(SpdmSignatureStruct::from_slice(sig.as_ref()))
    }

    fn dhe_generate(&self, algo: SpdmDheAlgo) -> SpdmResult<Box<dyn DheExchange>> {
        let alg = match algo {
            SpdmDheAlgo::SECP_256_R1 => &agreement::ECDH_P256,
            SpdmDheAlgo::SECP_384_R1 => &agreement::ECDH_P384,
            _ => return spdm_result_err!(UnsupportedRequest),
        };
        let rng = rand::SystemRandom::new();
        let private = agreement::EphemeralPrivateKey::generate(alg, &rng)
            .map_err(|_| crate::spdm_err!(InternalError))?;
        let public = private
            .compute_public_key()
            .map_err(|_| crate::spdm_err!(InternalError))?;
        Ok(Box::new(RingDheExchange {
            private: Some(private),
            public: SpdmDheExchangeStruct::from_slice(public.as_ref()),
        }))
    }

    fn cert_from_cert_chain(&self, cert_chain: &[u8], index: isize) -> SpdmResult<(usize, usize)> {
        cert_operation::get_cert_from_cert_chain(cert_chain, index)
    }

    fn verify_cert_chain(&self, cert_chain: &[u8]) -> SpdmResult<()> {
        cert_operation::verify_cert_chain(cert_chain)
    }

    fn random_bytes(&self, out: &mut [u8]) -> SpdmResult<()> {
        use ring::rand::SecureRandom;
        let rng = rand::SystemRandom::new();
        rng.fill(out).map_err(|_| crate::spdm_err!(InternalError))
    }
}

struct RingDheExchange {
    private: Option<agreement::EphemeralPrivateKey>,
    public: SpdmDheExchangeStruct,
}

impl DheExchange for RingDheExchange {
    fn public_key(&self) -> SpdmDheExchangeStruct {
        self.public
    }

    fn compute_shared_secret(mut self: Box<Self>, peer_public: &[u8]) -> SpdmResult<Vec<u8>> {
        let private = self.private.take().ok_or_else(|| crate::spdm_err!(InternalError))?;
        let alg = private.algorithm();
        let peer = agreement::UnparsedPublicKey::new(alg, peer_public);
        agreement::agree_ephemeral(private, &peer, crate::spdm_err!(SecurityViolation), |shared| {
            Ok(shared.to_vec())
        })
    }
}
